use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecurrenceError;
use crate::recurrence::{
    generate_rule_occurrences, next_rule_occurrence, rule_contains_date, Occurrence,
};
use crate::rule::{parse_rule, RecurrenceRule};

/// A calendar event that may repeat.
///
/// Only the string form of the recurrence rule is stored; it is parsed again
/// on every call. When `is_recurring` is false the rule is never consulted
/// and the event behaves as a single occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default = "Uuid::now_v7")]
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
}

impl Event {
    pub fn new(title: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            location: None,
            start_date,
            end_date: None,
            is_recurring: false,
            recurrence_rule: None,
        }
    }

    pub fn with_end(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.is_recurring = true;
        self.recurrence_rule = Some(rule.into());
        self
    }

    /// Checks that the end does not precede the start and that a recurring
    /// event has a parsable rule.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        self.check_span()?;
        self.rule().map(|_| ())
    }

    fn check_span(&self) -> Result<(), RecurrenceError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(RecurrenceError::InvalidEvent(format!(
                "end {} is before start {}",
                end, self.start_date
            ))),
            _ => Ok(()),
        }
    }

    /// Base duration copied onto every occurrence.
    pub fn duration(&self) -> Option<Duration> {
        self.end_date.map(|end| end - self.start_date)
    }

    /// The parsed rule, or `None` for one-off events.
    pub fn rule(&self) -> Result<Option<RecurrenceRule>, RecurrenceError> {
        if !self.is_recurring {
            return Ok(None);
        }
        match self.recurrence_rule.as_deref().map(str::trim) {
            Some(rule) if !rule.is_empty() => parse_rule(rule).map(Some),
            _ => Err(RecurrenceError::InvalidEvent(format!(
                "recurring event '{}' has no recurrence rule",
                self.title
            ))),
        }
    }

    /// All occurrences, bounded by the rule or by `cap` for unbounded rules.
    pub fn occurrences(&self, cap: Option<usize>) -> Result<Vec<Occurrence>, RecurrenceError> {
        self.check_span()?;
        match self.rule()? {
            Some(rule) => generate_rule_occurrences(&rule, self.start_date, self.end_date, cap),
            None => Ok(vec![self.single_occurrence()]),
        }
    }

    /// First occurrence starting strictly after `reference`.
    pub fn next_occurrence(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<Option<Occurrence>, RecurrenceError> {
        self.check_span()?;
        match self.rule()? {
            Some(rule) => next_rule_occurrence(&rule, self.start_date, self.end_date, reference),
            None => Ok(Some(self.single_occurrence()).filter(|o| o.start > reference)),
        }
    }

    pub fn is_occurrence_on(&self, date: NaiveDate) -> Result<bool, RecurrenceError> {
        match self.rule()? {
            Some(rule) => rule_contains_date(&rule, self.start_date, date),
            None => Ok(self.start_date.date_naive() == date),
        }
    }

    pub fn recurrence_description(&self) -> Result<Option<String>, RecurrenceError> {
        Ok(self.rule()?.map(|rule| rule.description()))
    }

    fn single_occurrence(&self) -> Occurrence {
        Occurrence {
            start: self.start_date,
            end: self.end_date,
        }
    }
}
