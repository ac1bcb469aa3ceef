use std::fs;

use anyhow::{Context as _, Result};
use recur_core::ics::generate_calendar;
use recur_core::Event;
use serde::Deserialize;

use crate::cli::IcsCommand;
use crate::commands::Context;

#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    Many(Vec<Event>),
    One(Event),
}

impl EventFile {
    fn into_events(self) -> Vec<Event> {
        match self {
            EventFile::Many(events) => events,
            EventFile::One(event) => vec![event],
        }
    }
}

pub fn export_ics(ctx: &Context, command: IcsCommand) -> Result<()> {
    let contents = fs::read_to_string(&command.file)
        .with_context(|| format!("Failed to read {}", command.file.display()))?;
    let events = read_events(&contents)
        .with_context(|| format!("Failed to parse events in {}", command.file.display()))?;

    print!("{}", generate_calendar(&events, ctx.now)?);
    Ok(())
}

fn read_events(contents: &str) -> Result<Vec<Event>> {
    Ok(serde_json::from_str::<EventFile>(contents)?.into_events())
}
