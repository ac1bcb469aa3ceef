use anyhow::Result;
use recur_core::RecurrenceRule;

use crate::cli::BuildCommand;
use crate::commands::Context;
use crate::parser::parse_weekdays;

pub fn build_rule(ctx: &Context, command: BuildCommand) -> Result<()> {
    println!("{}", rule_from_command(ctx, command)?);
    Ok(())
}

fn rule_from_command(ctx: &Context, command: BuildCommand) -> Result<RecurrenceRule> {
    let mut rule = RecurrenceRule::new(command.freq);

    if let Some(interval) = command.interval {
        rule = rule.with_interval(interval);
    }
    if let Some(count) = command.count {
        rule = rule.with_count(count);
    }
    if let Some(until) = command.until.as_deref() {
        rule = rule.with_until(ctx.datetime(until)?);
    }
    if let Some(by_day) = command.by_day.as_deref() {
        rule = rule.with_by_day(parse_weekdays(by_day)?);
    }

    rule.validate()?;
    Ok(rule)
}
