//! Recurrence rule model, parser and builder.
//!
//! Rules use the RFC 5545 `KEY=VALUE;KEY=VALUE` shape restricted to the
//! components the engine understands: `FREQ`, `INTERVAL`, `COUNT`, `UNTIL`
//! and `BYDAY`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use serde::{Serialize, Serializer};

use crate::error::RecurrenceError;

/// Compact UTC form used by `UNTIL`, e.g. `20251231T235959Z`.
pub const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(RecurrenceError::InvalidFrequency(s.to_string())),
        }
    }
}

/// Two-letter RFC 5545 code for a weekday (`MO`, `TU`, ...).
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses a two-letter weekday code, case-insensitively.
pub fn parse_weekday_code(code: &str) -> Result<Weekday, RecurrenceError> {
    let code = code.trim();
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| weekday_code(*day).eq_ignore_ascii_case(code))
        .ok_or_else(|| RecurrenceError::rule(format!("unknown weekday code '{}'", code)))
}

/// A parsed recurrence rule.
///
/// `by_day` keeps the order it was written in; expansion and description
/// work from [`RecurrenceRule::weekly_days`], which is sorted Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_weekday_codes"
    )]
    pub by_day: Option<Vec<Weekday>>,
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            count: None,
            until: None,
            by_day: None,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_by_day(mut self, days: impl Into<Vec<Weekday>>) -> Self {
        self.by_day = Some(days.into());
        self
    }

    /// Checks invariants that the parser enforces but direct construction
    /// does not.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        if self.interval == 0 {
            return Err(RecurrenceError::rule("INTERVAL must be at least 1"));
        }
        if self.count == Some(0) {
            return Err(RecurrenceError::rule("COUNT must be at least 1"));
        }
        if matches!(&self.by_day, Some(days) if days.is_empty()) {
            return Err(RecurrenceError::rule("BYDAY must list at least one weekday"));
        }
        Ok(())
    }

    /// Whether the rule carries its own termination (`COUNT` or `UNTIL`).
    pub fn is_bounded(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Selected weekdays for a weekly rule, sorted Monday first and
    /// deduplicated. `None` for other frequencies or when `BYDAY` is absent.
    pub fn weekly_days(&self) -> Option<Vec<Weekday>> {
        if self.freq != Frequency::Weekly {
            return None;
        }
        let mut days = self.by_day.clone()?;
        days.sort_by_key(|day| day.num_days_from_monday());
        days.dedup();
        if days.is_empty() {
            None
        } else {
            Some(days)
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_rule(
            self.freq,
            Some(self.interval),
            self.count,
            self.until,
            self.by_day.as_deref(),
        ))
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s)
    }
}

fn serialize_weekday_codes<S>(days: &Option<Vec<Weekday>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match days {
        Some(days) => serializer.collect_seq(days.iter().map(|day| weekday_code(*day))),
        None => serializer.serialize_none(),
    }
}

/// Parses a rule string such as `FREQ=WEEKLY;INTERVAL=2;COUNT=10;BYDAY=MO,WE,FR`.
///
/// Key order does not matter and keys are case-insensitive. A leading
/// `RRULE:` is accepted. Keys outside the supported set are ignored.
pub fn parse_rule(rule: &str) -> Result<RecurrenceRule, RecurrenceError> {
    let body = rule.trim();
    let body = match body.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &body[6..],
        _ => body,
    };

    let mut freq = None;
    let mut interval = None;
    let mut count = None;
    let mut until = None;
    let mut by_day = None;

    for part in body.split(';').map(str::trim).filter(|part| !part.is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            RecurrenceError::rule(format!("expected KEY=VALUE, found '{}'", part))
        })?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "FREQ" => {
                let parsed = value.parse::<Frequency>().map_err(|_| {
                    RecurrenceError::rule(format!("unsupported FREQ '{}'", value))
                })?;
                set_once(&mut freq, "FREQ", parsed)?;
            }
            "INTERVAL" => set_once(&mut interval, "INTERVAL", parse_positive("INTERVAL", value)?)?,
            "COUNT" => set_once(&mut count, "COUNT", parse_positive("COUNT", value)?)?,
            "UNTIL" => set_once(&mut until, "UNTIL", parse_until(value)?)?,
            "BYDAY" => set_once(&mut by_day, "BYDAY", parse_by_day(value)?)?,
            other => {
                tracing::debug!(key = other, value, "ignoring unsupported rule component");
            }
        }
    }

    let freq = freq.ok_or_else(|| RecurrenceError::rule("missing FREQ"))?;

    Ok(RecurrenceRule {
        freq,
        interval: interval.unwrap_or(1),
        count,
        until,
        by_day,
    })
}

/// Serializes rule components in fixed order: `FREQ`, `INTERVAL` (omitted
/// when 1), `COUNT`, `UNTIL`, `BYDAY`. Weekdays are written in the order
/// given.
pub fn build_rule(
    freq: Frequency,
    interval: Option<u32>,
    count: Option<u32>,
    until: Option<DateTime<Utc>>,
    by_day: Option<&[Weekday]>,
) -> String {
    let mut parts = vec![format!("FREQ={}", freq)];

    if let Some(interval) = interval.filter(|interval| *interval != 1) {
        parts.push(format!("INTERVAL={}", interval));
    }
    if let Some(count) = count {
        parts.push(format!("COUNT={}", count));
    }
    if let Some(until) = until {
        parts.push(format!("UNTIL={}", until.format(UNTIL_FORMAT)));
    }
    if let Some(days) = by_day.filter(|days| !days.is_empty()) {
        let codes: Vec<&str> = days.iter().map(|day| weekday_code(*day)).collect();
        parts.push(format!("BYDAY={}", codes.join(",")));
    }

    parts.join(";")
}

fn set_once<T>(slot: &mut Option<T>, key: &str, value: T) -> Result<(), RecurrenceError> {
    if slot.is_some() {
        return Err(RecurrenceError::rule(format!("{} specified more than once", key)));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_positive(key: &str, value: &str) -> Result<u32, RecurrenceError> {
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(RecurrenceError::rule(format!(
            "{} must be a positive integer, found '{}'",
            key, value
        ))),
    }
}

/// `YYYYMMDDTHHMMSSZ`, or a bare `YYYYMMDD` meaning the last second of that day.
fn parse_until(value: &str) -> Result<DateTime<Utc>, RecurrenceError> {
    let invalid = || RecurrenceError::rule(format!("invalid UNTIL '{}'", value));

    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc())
            .ok_or_else(invalid);
    }

    if value.len() != 16 {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(value, UNTIL_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|_| invalid())
}

fn parse_by_day(value: &str) -> Result<Vec<Weekday>, RecurrenceError> {
    let mut days = Vec::new();
    for code in value.split(',') {
        let day = parse_weekday_code(code)?;
        if days.contains(&day) {
            return Err(RecurrenceError::rule(format!(
                "weekday '{}' listed twice in BYDAY",
                weekday_code(day)
            )));
        }
        days.push(day);
    }
    if days.is_empty() {
        return Err(RecurrenceError::rule("BYDAY must list at least one weekday"));
    }
    Ok(days)
}
