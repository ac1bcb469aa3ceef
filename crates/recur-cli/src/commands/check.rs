use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use recur_core::recurrence::rule_occurs_between;
use recur_core::RecurrenceRule;

use crate::cli::CheckCommand;
use crate::commands::{parse_rule_arg, Context};
use crate::timezone::local_day_bounds;

/// Returns whether the date is an occurrence; the caller maps it to the
/// exit status.
pub fn check_date(ctx: &Context, command: CheckCommand) -> Result<bool> {
    let rule = parse_rule_arg(&command.rule)?;
    let start = ctx.datetime(&command.start)?;
    let date = ctx.date(&command.on)?;

    let occurs = occurs_on(&rule, start, date, ctx.timezone)?;
    if occurs {
        println!("{} {} is an occurrence", "✓".green(), date);
    } else {
        println!("{} {} is not an occurrence", "✗".red(), date);
    }

    Ok(occurs)
}

/// `date` is a calendar day in `tz`, the zone `expand` displays in.
fn occurs_on(rule: &RecurrenceRule, start: DateTime<Utc>, date: NaiveDate, tz: Tz) -> Result<bool> {
    let (from, to) = local_day_bounds(date, tz)
        .ok_or_else(|| anyhow!("{} is out of range in timezone {}", date, tz))?;
    Ok(rule_occurs_between(rule, start, from, to)?)
}
