use anyhow::Result;

use crate::cli::ParseCommand;
use crate::commands::parse_rule_arg;
use crate::views::table::display_rule;

pub fn parse_rule(command: ParseCommand) -> Result<()> {
    let rule = parse_rule_arg(&command.rule)?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&rule)?);
    } else {
        display_rule(&rule);
    }

    Ok(())
}
