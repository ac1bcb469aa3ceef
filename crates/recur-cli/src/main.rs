use std::process::ExitCode;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use recur_core::RecurrenceError;

mod cli;
mod commands;
mod config;
mod logging;
mod parser;
mod timezone;
mod views;

use cli::{Cli, Commands};
use commands::Context;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            handle_error(e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::Config::load(cli.config.as_deref())?;
    logging::init(&logging::verbosity_filter(cli.verbose, &config.log_level));
    tracing::debug!(?config, "loaded configuration");

    let tz = timezone::validate_timezone(&config.display_timezone).map_err(|e| anyhow!(e))?;
    let ctx = Context::new(config, tz, Utc::now());

    match cli.command {
        Commands::Parse(command) => commands::parse::parse_rule(command)?,
        Commands::Build(command) => commands::build::build_rule(&ctx, command)?,
        Commands::Expand(command) => commands::expand::expand_rule(&ctx, command)?,
        Commands::Next(command) => commands::next::next_occurrence(&ctx, command)?,
        Commands::Check(command) => {
            if !commands::check::check_date(&ctx, command)? {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Describe(command) => commands::describe::describe_rule(command)?,
        Commands::Ics(command) => commands::ics::export_ics(&ctx, command)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.chain().find_map(|e| e.downcast_ref::<RecurrenceError>()) {
        Some(RecurrenceError::InvalidRule(msg)) if err.chain().count() > 1 => {
            eprintln!("{} {}: {}", "Error:".style(error_style), err, msg.yellow());
        }
        Some(RecurrenceError::InvalidRule(msg)) => {
            eprintln!("{} Invalid rule: {}", "Error:".style(error_style), msg.yellow());
        }
        Some(RecurrenceError::InvalidFrequency(freq)) => {
            eprintln!(
                "{} Unsupported frequency '{}'. Use DAILY, WEEKLY, MONTHLY or YEARLY.",
                "Error:".style(error_style),
                freq.yellow()
            );
        }
        Some(RecurrenceError::InvalidEvent(msg)) => {
            eprintln!("{} Invalid event: {}", "Error:".style(error_style), msg);
        }
        None => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
