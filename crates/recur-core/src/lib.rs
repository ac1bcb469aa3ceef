//! # Recur Core Library
//!
//! A small recurrence engine for calendar events: it parses RRULE-style
//! strings, expands them into bounded occurrence sequences, answers
//! "does this date occur?" and describes rules in plain English.
//!
//! ## Features
//!
//! - **Rule parsing and building**: `FREQ`, `INTERVAL`, `COUNT`, `UNTIL` and
//!   `BYDAY`, round-tripping through the same string form
//! - **Bounded expansion**: every expansion stops at `COUNT`, `UNTIL` or an
//!   explicit hard cap
//! - **Calendar arithmetic**: month and year steps clamp to the last day of
//!   shorter months, always computed from the series start
//! - **Events**: a thin event model with next-occurrence lookup and
//!   iCalendar export
//!
//! ## Core Modules
//!
//! - [`rule`]: Rule model, parser and builder
//! - [`recurrence`]: Occurrence expansion and membership tests
//! - [`description`]: English rule descriptions
//! - [`models`]: The event entity that owns a rule
//! - [`ics`]: iCalendar rendering
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use recur_core::recurrence::generate_occurrences;
//! use recur_core::description::describe_rule;
//!
//! let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
//! let rule = "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6";
//!
//! let occurrences = generate_occurrences(start, None, rule, None).unwrap();
//! assert_eq!(occurrences.len(), 6);
//! assert_eq!(
//!     describe_rule(rule).unwrap(),
//!     "Weekly on Monday, Wednesday, and Friday, 6 times"
//! );
//! ```

pub mod description;
pub mod error;
pub mod ics;
pub mod models;
pub mod recurrence;
pub mod rule;

pub use error::RecurrenceError;
pub use models::Event;
pub use recurrence::{Occurrence, DEFAULT_OCCURRENCE_CAP};
pub use rule::{Frequency, RecurrenceRule};
