use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use recur_core::RecurrenceRule;

use crate::config::Config;
use crate::parser;
use crate::views::table::ViewOptions;

pub mod build;
pub mod check;
pub mod describe;
pub mod expand;
pub mod ics;
pub mod next;
pub mod parse;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub timezone: Tz,
    pub now: DateTime<Utc>,
}

impl Context {
    pub fn new(config: Config, timezone: Tz, now: DateTime<Utc>) -> Self {
        Self {
            config,
            timezone,
            now,
        }
    }

    pub fn datetime(&self, input: &str) -> Result<DateTime<Utc>> {
        parser::parse_datetime(input, self.timezone, self.now)
    }

    pub fn date(&self, input: &str) -> Result<NaiveDate> {
        parser::parse_date(input, self.timezone, self.now)
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            timezone: self.timezone,
            datetime_format: self.config.datetime_format.clone(),
            now: self.now,
        }
    }
}

pub(crate) fn parse_rule_arg(rule: &str) -> Result<RecurrenceRule> {
    rule.parse::<RecurrenceRule>()
        .with_context(|| format!("Could not read rule '{}'", rule))
}
