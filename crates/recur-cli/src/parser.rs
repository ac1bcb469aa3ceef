use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use recur_core::rule::parse_weekday_code;

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parses a user-supplied date/time. Inputs without an offset are read in
/// `tz`; anything that is not a recognized fixed format goes through
/// natural-language parsing relative to `now`.
pub fn parse_datetime(input: &str, tz: Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });
    if let Some(naive) = naive {
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("'{}' does not exist in timezone {}", input, tz));
    }

    parse_date_string(input, now.with_timezone(&tz), Dialect::Us)
        .map(|local| local.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a calendar date; natural language is accepted as for
/// [`parse_datetime`].
pub fn parse_date(input: &str, tz: Tz, now: DateTime<Utc>) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    Ok(parse_datetime(input, tz, now)?.with_timezone(&tz).date_naive())
}

/// Parses a comma-separated weekday list. Accepts RRULE codes (`MO`) and
/// English names (`mon`, `Monday`).
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            parse_weekday_code(part)
                .ok()
                .or_else(|| part.parse::<Weekday>().ok())
                .ok_or_else(|| anyhow!("Unknown weekday '{}'", part))
        })
        .collect()
}
