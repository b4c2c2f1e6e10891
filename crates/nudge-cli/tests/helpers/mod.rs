#![allow(dead_code)]

use assert_cmd::Command;
use chrono::{Duration, NaiveDate, Utc};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary task file
pub struct CliTestHarness {
    temp_dir: TempDir,
    data_file: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty working directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let data_file = temp_dir.path().join("tasks.json");

        Self {
            temp_dir,
            data_file,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("nudge").expect("Failed to find nudge binary");

        cmd.current_dir(self.temp_dir.path());
        cmd.env("NUDGE_DATA_FILE", &self.data_file);
        cmd.env("NUDGE_TIMEZONE", "UTC");
        cmd.env_remove("NUDGE_SHOW_COMPLETED");
        cmd.env_remove("NUDGE_PREVIEW_COUNT");

        cmd
    }

    pub fn data_file(&self) -> &std::path::Path {
        &self.data_file
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Adds a task and returns its full ID as printed by `add`
    pub fn add_task(&self, args: &[&str]) -> String {
        let mut full_args = vec!["add"];
        full_args.extend_from_slice(args);
        let output = self.run_success(&full_args).get_output().stdout.clone();
        let stdout = String::from_utf8(output).expect("stdout should be UTF-8");

        stdout
            .lines()
            .find_map(|line| line.split("Task ID: ").nth(1))
            .map(|id| id.trim().to_string())
            .expect("add should print the task ID")
    }

    /// Replaces the task file with `data`
    pub fn write_data(&self, data: &serde_json::Value) {
        std::fs::write(&self.data_file, data.to_string()).expect("task file should be writable");
    }

    /// Raw JSON of the task file
    pub fn read_data(&self) -> serde_json::Value {
        let contents = std::fs::read_to_string(&self.data_file).expect("task file should exist");
        serde_json::from_str(&contents).expect("task file should be JSON")
    }
}

/// Dates relative to the real current day in UTC
pub struct TestDates;

impl TestDates {
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn offset(days: i64) -> String {
        (Self::today() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Assertion helpers for common patterns
pub mod assertions {
    use super::*;

    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task")
    }

    pub fn recurring_task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created recurring task")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
