use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_humanize::{Accuracy, HumanTime, Humanize, Tense};
use owo_colors::OwoColorize;
use recur_core::recurrence::next_rule_occurrence;

use crate::cli::NextCommand;
use crate::commands::{parse_rule_arg, Context};
use crate::timezone::format_in_timezone;

pub fn next_occurrence(ctx: &Context, command: NextCommand) -> Result<()> {
    let rule = parse_rule_arg(&command.rule)?;
    let start = ctx.datetime(&command.start)?;
    let end = command.end.as_deref().map(|end| ctx.datetime(end)).transpose()?;
    let reference = match command.after.as_deref() {
        Some(after) => Some(ctx.datetime(after)?),
        None => None,
    };
    let after = reference.unwrap_or(ctx.now);
    let format = &ctx.config.datetime_format;

    match next_rule_occurrence(&rule, start, end, after)? {
        Some(occurrence) => {
            let mut line = format!(
                "Next occurrence: {}",
                format_in_timezone(occurrence.start, ctx.timezone, format).bold()
            );
            if let Some(end) = occurrence.end {
                line.push_str(&format!(" until {}", format_in_timezone(end, ctx.timezone, format)));
            }
            println!("{} ({})", line, relative_label(occurrence.start, reference, ctx));
        }
        None => println!(
            "No occurrences after {}.",
            format_in_timezone(after, ctx.timezone, format)
        ),
    }

    Ok(())
}

/// Distance to the occurrence, measured from `--after` when it was given
/// and from now otherwise.
fn relative_label(start: DateTime<Utc>, reference: Option<DateTime<Utc>>, ctx: &Context) -> String {
    match reference {
        Some(reference) => format!(
            "{} after {}",
            HumanTime::from(start - reference).to_text_en(Accuracy::Rough, Tense::Present),
            format_in_timezone(reference, ctx.timezone, &ctx.config.datetime_format)
        ),
        None => (start - ctx.now).humanize(),
    }
}
