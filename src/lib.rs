#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms, missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! Alarms ordered by priority, checked against the clock and kept on disk as an
//! iCalendar file.
//!
//! The [`AlarmManager`] owns everything and is meant for a single thread, put it
//! behind a `Mutex` to share it.

pub mod alarm;
pub mod clock;
/// headless versions of the add, delete and edit actions
pub mod commands;
pub mod config;
pub mod ical;
pub mod manager;
pub mod queue;

pub use alarm::Alarm;
pub use manager::{AlarmError, AlarmManager};
pub use queue::{EmptyQueueError, PriorityQueue};
