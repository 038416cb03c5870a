//! # Tasknote Core Library
//!
//! Recurrence expansion and calendar materialization for tasks stored as
//! notes: a recurring task is one record carrying a rule and a per-date
//! ledger, never a set of materialized child tasks.
//!
//! ## Features
//!
//! - **Calendar-Date Recurrence**: Rules expand to timezone-free calendar
//!   dates, so a series never gains or loses a day at a zone boundary
//! - **Instance Ledger**: Completed and skipped occurrences are tracked per
//!   date on the task itself
//! - **Overdue Resolution**: Completing an overdue series resolves the oldest
//!   missed occurrence first and advances one step at a time
//! - **Calendar Materialization**: Recurring instances, scheduled and due
//!   dates and time entries as one sorted event list, with independent toggles
//!
//! ## Core Modules
//!
//! - [`date`]: The `CalendarDate` value type
//! - [`timezone`]: Where zoned timestamps become calendar dates
//! - [`recurrence`]: Rule parsing and expansion
//! - [`ledger`]: Per-occurrence completion and skip tracking
//! - [`resolver`]: Which occurrence an action applies to
//! - [`materialization`]: Calendar event generation
//! - [`cache`]: Change-invalidated expansion cache
//! - [`models`]: Task records and calendar events
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tasknote_core::{
//!     date::CalendarDate,
//!     materialization::{CalendarMaterializer, MaterializeOptions},
//!     models::{DateRange, TaskRecord},
//! };
//!
//! let task = TaskRecord {
//!     title: "Water plants".to_string(),
//!     recurrence_rule: Some("FREQ=WEEKLY;BYDAY=SU".to_string()),
//!     scheduled: Some("2025-01-05".to_string()),
//!     ..Default::default()
//! };
//!
//! let start = CalendarDate::from_ymd(2025, 1, 1).unwrap();
//! let end = CalendarDate::from_ymd(2025, 1, 31).unwrap();
//! let range = DateRange::new(start, end).unwrap();
//!
//! let materializer = CalendarMaterializer::new();
//! let events = materializer.materialize(&[task], range, &MaterializeOptions::default(), start);
//! assert_eq!(events.len(), 4);
//! ```

pub mod cache;
pub mod date;
pub mod error;
pub mod ledger;
pub mod materialization;
pub mod models;
pub mod recurrence;
pub mod resolver;
pub mod timezone;
