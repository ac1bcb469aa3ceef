use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validates that a timezone string is a valid IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, String> {
    Tz::from_str(timezone).map_err(|_| {
        format!(
            "Invalid timezone: '{}'. Use IANA timezone names like 'America/New_York'",
            timezone
        )
    })
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}

/// Renders a UTC instant in `tz` with a chrono format string.
pub fn format_in_timezone(datetime: DateTime<Utc>, tz: Tz, format: &str) -> String {
    datetime.with_timezone(&tz).format(format).to_string()
}

/// UTC bounds `[start, end)` of the calendar day `date` in `tz`. A day
/// whose midnight falls in a DST gap starts at its first valid hour.
pub fn local_day_bounds(date: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let day_start = |date: NaiveDate| {
        (0..24).find_map(|hour| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            tz.from_local_datetime(&date.and_time(time)).earliest()
        })
    };
    let start = day_start(date)?;
    let end = day_start(date.succ_opt()?)?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
