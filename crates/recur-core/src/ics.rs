//! iCalendar export.
//!
//! Recurring events are exported as a single master `VEVENT` whose `RRULE`
//! is the stored rule string, unchanged. One-off events carry no `RRULE`.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike};

use crate::error::RecurrenceError;
use crate::models::Event;

const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const PRODID: &str = "-//recur//recurrence engine//EN";

/// Renders one event as a complete `VCALENDAR` document.
pub fn generate_ics(event: &Event, stamp: DateTime<Utc>) -> Result<String, RecurrenceError> {
    generate_calendar(std::slice::from_ref(event), stamp)
}

/// Renders several events into one `VCALENDAR`. `stamp` becomes every
/// event's `DTSTAMP`.
pub fn generate_calendar(events: &[Event], stamp: DateTime<Utc>) -> Result<String, RecurrenceError> {
    let mut cal = Calendar::new();
    for event in events {
        event.validate()?;
        cal.push(to_vevent(event, stamp));
    }
    let cal = cal.done();

    Ok(replace_prodid(&cal.to_string()))
}

fn to_vevent(event: &Event, stamp: DateTime<Utc>) -> icalendar::Event {
    let mut vevent = icalendar::Event::new();
    vevent.uid(&event.id.to_string());
    vevent.add_property("DTSTAMP", &stamp.format(ICS_DATETIME_FORMAT).to_string());
    vevent.summary(&event.title);
    vevent.add_property(
        "DTSTART",
        &event.start_date.format(ICS_DATETIME_FORMAT).to_string(),
    );
    if let Some(end) = event.end_date {
        vevent.add_property("DTEND", &end.format(ICS_DATETIME_FORMAT).to_string());
    }
    if let Some(ref description) = event.description {
        vevent.description(description);
    }
    if let Some(ref location) = event.location {
        vevent.location(location);
    }
    if event.is_recurring {
        if let Some(ref rule) = event.recurrence_rule {
            vevent.add_property("RRULE", rule.trim());
        }
    }
    vevent.done()
}

fn replace_prodid(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }
    result
}
