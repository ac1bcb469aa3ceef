#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Runs the `recur` binary inside a scratch directory so a stray
/// `recur.toml` in the checkout never leaks into a test.
pub struct CliTestHarness {
    temp_dir: TempDir,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// A command with a pinned display timezone and a quiet log filter.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("recur").expect("Failed to find recur binary");
        cmd.current_dir(self.temp_dir.path())
            .env("RECUR_DISPLAY_TIMEZONE", "UTC")
            .env_remove("RECUR_MAX_OCCURRENCES")
            .env_remove("RECUR_LOG_LEVEL")
            .env_remove("RECUR_DATETIME_FORMAT")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into the scratch directory and returns its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Asserts the process exited with `code`.
    pub fn run_with_code(&self, args: &[&str], code: i32) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().code(code)
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub fn office_hours_event() -> &'static str {
        r#"{
            "title": "Office hours",
            "description": "Drop-in questions",
            "location": "Room 4",
            "start_date": "2025-09-01T13:00:00Z",
            "end_date": "2025-09-01T14:00:00Z",
            "is_recurring": true,
            "recurrence_rule": "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,TH;UNTIL=20251031T235959Z"
        }"#
    }

    pub fn one_off_events() -> &'static str {
        r#"[
            {"title": "Launch", "start_date": "2025-03-01T09:00:00Z"},
            {"title": "Retro", "start_date": "2025-03-08T15:00:00Z"}
        ]"#
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn has_occurrence_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Start")
            .and(predicate::str::contains("End"))
            .and(predicate::str::contains("When"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
