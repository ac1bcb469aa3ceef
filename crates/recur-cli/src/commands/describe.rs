use anyhow::Result;

use crate::cli::DescribeCommand;
use crate::commands::parse_rule_arg;

pub fn describe_rule(command: DescribeCommand) -> Result<()> {
    println!("{}", parse_rule_arg(&command.rule)?.description());
    Ok(())
}
