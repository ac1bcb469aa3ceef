use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use recur_core::recurrence::Occurrence;
use recur_core::rule::{weekday_name, UNTIL_FORMAT};
use recur_core::RecurrenceRule;

use crate::timezone::format_in_timezone;

/// Display settings shared by every occurrence table.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub timezone: Tz,
    pub datetime_format: String,
    pub now: DateTime<Utc>,
}

pub fn rule_table(rule: &RecurrenceRule) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec![
        Cell::new("Frequency"),
        Cell::new(rule.freq.as_str()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec!["Interval".to_string(), rule.interval.to_string()]);
    table.add_row(vec![
        "Count".to_string(),
        rule.count.map_or_else(|| "None".to_string(), |c| c.to_string()),
    ]);
    table.add_row(vec![
        "Until".to_string(),
        rule.until.map_or_else(
            || "None".to_string(),
            |until| until.format(UNTIL_FORMAT).to_string(),
        ),
    ]);
    table.add_row(vec![
        "Weekdays".to_string(),
        rule.by_day.as_ref().map_or_else(
            || "None".to_string(),
            |days| days.iter().map(|d| weekday_name(*d)).collect::<Vec<_>>().join(", "),
        ),
    ]);
    table.add_row(vec!["Description".to_string(), rule.description()]);

    table
}

pub fn display_rule(rule: &RecurrenceRule) {
    println!("{}", rule_table(rule));
}

pub fn occurrence_table(occurrences: &[Occurrence], options: &ViewOptions) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Start", "End", "When"]);

    for (index, occurrence) in occurrences.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(index + 1));

        let start = format_in_timezone(occurrence.start, options.timezone, &options.datetime_format);
        let start_cell = if occurrence.start < options.now {
            Cell::new(start).fg(Color::DarkGrey)
        } else if is_local_today(occurrence, options) {
            Cell::new(start).fg(Color::Yellow)
        } else {
            Cell::new(start)
        };
        row.add_cell(start_cell);

        row.add_cell(Cell::new(occurrence.end.map_or_else(
            || "None".to_string(),
            |end| format_in_timezone(end, options.timezone, &options.datetime_format),
        )));
        row.add_cell(Cell::new((occurrence.start - options.now).humanize()));

        table.add_row(row);
    }

    table
}

/// Compares calendar days in the display timezone, the zone the cells use.
fn is_local_today(occurrence: &Occurrence, options: &ViewOptions) -> bool {
    occurrence.start.with_timezone(&options.timezone).date_naive()
        == options.now.with_timezone(&options.timezone).date_naive()
}

pub fn display_occurrences(occurrences: &[Occurrence], options: &ViewOptions) {
    if occurrences.is_empty() {
        println!("No occurrences.");
        return;
    }
    println!("{}", occurrence_table(occurrences, options));
}
