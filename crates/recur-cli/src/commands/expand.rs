use anyhow::Result;
use recur_core::recurrence::generate_rule_occurrences;

use crate::cli::ExpandCommand;
use crate::commands::{parse_rule_arg, Context};
use crate::views::table::display_occurrences;

pub fn expand_rule(ctx: &Context, command: ExpandCommand) -> Result<()> {
    let rule = parse_rule_arg(&command.rule)?;
    let start = ctx.datetime(&command.start)?;
    let end = command.end.as_deref().map(|end| ctx.datetime(end)).transpose()?;
    let cap = command.limit.unwrap_or(ctx.config.max_occurrences);

    let occurrences = generate_rule_occurrences(&rule, start, end, Some(cap))?;

    if !rule.is_bounded() && occurrences.len() == cap {
        tracing::warn!(cap, "rule has no COUNT or UNTIL; output stopped at the occurrence cap");
    }

    if command.json {
        println!("{}", serde_json::to_string_pretty(&occurrences)?);
    } else {
        display_occurrences(&occurrences, &ctx.view_options());
    }

    Ok(())
}
