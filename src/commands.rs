//! The actions a front end can take on the alarm list.
//!
//! Input is checked here, at the boundary, so the manager only ever sees a real
//! time, a non blank label and an integer priority.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use thiserror::Error;

use crate::{
    alarm::Alarm,
    manager::{AlarmError, AlarmManager},
};

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y%m%dT%H%M%S"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("please enter a label for the alarm")]
    EmptyLabel,
    #[error("please enter a valid numeric priority for the alarm, got {0:?}")]
    InvalidPriority(String),
    #[error("couldn't understand alarm time {0:?}")]
    InvalidTime(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Alarm(#[from] AlarmError),
}

/// a checked `(time, label, priority)` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmInput {
    pub time: NaiveDateTime,
    pub label: String,
    pub priority: i64,
}

impl AlarmInput {
    /// `today` fills in the date when `time` is just a time of day.
    /// an empty `priority` means 0.
    ///
    /// # Errors
    /// if the label is blank or the time or priority can't be parsed
    pub fn parse(
        time: &str,
        label: &str,
        priority: &str,
        today: NaiveDate,
    ) -> Result<Self, InputError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(InputError::EmptyLabel);
        }
        let priority = priority.trim();
        let priority = if priority.is_empty() {
            0
        } else {
            priority
                .parse()
                .map_err(|_| InputError::InvalidPriority(priority.to_string()))?
        };
        Ok(Self {
            time: parse_time(time, today)?,
            label: label.to_string(),
            priority,
        })
    }
}

impl From<AlarmInput> for Alarm {
    fn from(input: AlarmInput) -> Self {
        Self::new(input.time, input.label, input.priority)
    }
}

/// accepts `YYYY-MM-DD HH:MM[:SS]`, `YYYYMMDDTHHMMSS` or `HH:MM[:SS]` on `today`
///
/// # Errors
/// if none of those formats match
pub fn parse_time(time: &str, today: NaiveDate) -> Result<NaiveDateTime, InputError> {
    let time = time.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(time, format).ok())
        .or_else(|| {
            TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
                .map(|time| today.and_time(time))
        })
        .ok_or_else(|| InputError::InvalidTime(time.to_string()))
}

pub fn add(manager: &mut AlarmManager, input: AlarmInput) {
    let priority = input.priority;
    let alarm = Alarm::from(input);
    info!("adding alarm {alarm} with priority {priority}");
    manager.add_alarm(alarm, priority);
}

/// # Errors
/// if there are no alarms
pub fn delete_next(manager: &mut AlarmManager) -> Result<Alarm, CommandError> {
    let alarm = manager.remove_next_alarm()?;
    info!("deleted alarm {alarm}");
    Ok(alarm)
}

/// replaces the next alarm with `input`, returning the alarm that was replaced
///
/// # Errors
/// if there are no alarms
pub fn edit_next(manager: &mut AlarmManager, input: AlarmInput) -> Result<Alarm, CommandError> {
    let old = manager.edit_next_alarm(input.time, input.label, input.priority)?;
    info!("edited alarm {old}");
    Ok(old)
}
