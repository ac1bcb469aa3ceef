//! English rendering of recurrence rules.

use std::fmt::Write;

use crate::error::RecurrenceError;
use crate::rule::{parse_rule, weekday_name, Frequency, RecurrenceRule};

/// chrono format used for `UNTIL` dates, e.g. `March 5, 2025`.
pub const UNTIL_DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Describes a rule string, e.g. `"Weekly on Monday and Friday, 10 times"`.
pub fn describe_rule(rule: &str) -> Result<String, RecurrenceError> {
    Ok(describe(&parse_rule(rule)?))
}

pub fn describe(rule: &RecurrenceRule) -> String {
    let mut text = frequency_phrase(rule.freq, rule.interval);

    if let Some(days) = rule.weekly_days() {
        let names: Vec<&str> = days.into_iter().map(weekday_name).collect();
        text.push_str(" on ");
        text.push_str(&join_list(&names));
    }

    if let Some(count) = rule.count {
        let _ = write!(text, ", {} times", count);
    } else if let Some(until) = rule.until {
        let _ = write!(text, " until {}", until.format(UNTIL_DISPLAY_FORMAT));
    }

    text
}

impl RecurrenceRule {
    pub fn description(&self) -> String {
        describe(self)
    }
}

fn frequency_phrase(freq: Frequency, interval: u32) -> String {
    let (single, unit) = match freq {
        Frequency::Daily => ("Daily", "days"),
        Frequency::Weekly => ("Weekly", "weeks"),
        Frequency::Monthly => ("Monthly", "months"),
        Frequency::Yearly => ("Yearly", "years"),
    };
    if interval <= 1 {
        single.to_string()
    } else {
        format!("Every {} {}", interval, unit)
    }
}

/// `A`, `A and B`, `A, B, and C`.
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}
