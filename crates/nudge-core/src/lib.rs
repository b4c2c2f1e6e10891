//! # Nudge Core Library
//!
//! The scheduling engine behind the Nudge task tracker: it decides whether a
//! task belongs on a given calendar day and turns free-text phrases into
//! structured recurrence rules.
//!
//! ## Features
//!
//! - **Template Recurrence**: a recurring task is one record with a rule;
//!   occurrences are computed on demand, never materialized
//! - **Per-Occurrence Exceptions**: individual dates are marked completed or
//!   skipped without touching the rule
//! - **Today View**: a fixed precedence over recurrence, deadlines, scheduled
//!   dates and rollover of stale tasks
//! - **Phrase Parsing**: "Call mom every Sunday" becomes a weekly rule and the
//!   text "Call mom"
//! - **Fail Closed**: an invalid rule never matches instead of erroring in a
//!   rendering path
//!
//! ## Core Modules
//!
//! - [`rule`]: the recurrence rule model and its flat JSON shape
//! - [`recurrence`]: occurrence matching and previews
//! - [`exceptions`]: completed/skipped exception dates
//! - [`today`]: the today-view filter and rollover helpers
//! - [`parser`]: natural-language recurrence phrases
//! - [`format`]: labels and summaries
//! - [`dates`]: calendar and timezone utilities
//! - [`models`]: the task record
//! - [`error`]: error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nudge_core::{
//!     format::format_recurrence_label, parser::parse_recurrence_from_text_on,
//!     recurrence::date_matches_recurrence,
//! };
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
//! let parsed = parse_recurrence_from_text_on("Call mom every Sunday", today).unwrap();
//!
//! assert_eq!(parsed.cleaned_text, "Call mom");
//! assert_eq!(format_recurrence_label(&parsed.rule), "Weekly on Sun");
//! assert!(date_matches_recurrence(&parsed.rule, "2025-03-16"));
//! assert!(!date_matches_recurrence(&parsed.rule, "2025-03-17"));
//! ```

pub mod dates;
pub mod error;
pub mod exceptions;
pub mod format;
pub mod models;
pub mod parser;
pub mod recurrence;
pub mod rule;
pub mod today;
