use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, info};
use thiserror::Error;

use crate::{
    alarm::Alarm,
    queue::{EmptyQueueError, PriorityQueue, DEFAULT_CAPACITY},
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlarmError {
    #[error("cannot remove from an empty alarm list")]
    EmptyAlarmList,
    #[error("there is no next alarm, the alarm list is empty")]
    NoNextAlarm,
}

impl From<EmptyQueueError> for AlarmError {
    fn from(_: EmptyQueueError) -> Self {
        Self::EmptyAlarmList
    }
}

/// owns the alarm queue and is the only thing that touches it.
///
/// there is no locking inside, if more than one thread needs the manager
/// wrap it in a `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct AlarmManager {
    alarms: PriorityQueue<Alarm>,
}

impl AlarmManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alarms: PriorityQueue::with_capacity(capacity),
        }
    }

    /// `priority` decides where the alarm goes in line and is also what the
    /// stored alarm reports as its priority from then on
    pub fn add_alarm(&mut self, mut alarm: Alarm, priority: i64) {
        debug!("adding alarm {alarm} with priority {priority}");
        alarm.priority = priority;
        self.alarms.add(alarm, priority);
    }

    /// # Errors
    /// [`AlarmError::NoNextAlarm`] if there are no alarms,
    /// peeking an empty list is a caller bug
    pub fn get_next_alarm(&self) -> Result<&Alarm, AlarmError> {
        self.alarms.head().map_err(|_| AlarmError::NoNextAlarm)
    }

    /// # Errors
    /// [`AlarmError::EmptyAlarmList`] if there are no alarms
    pub fn remove_next_alarm(&mut self) -> Result<Alarm, AlarmError> {
        let alarm = self.alarms.remove()?;
        debug!("removed alarm {alarm}");
        Ok(alarm)
    }

    #[must_use]
    pub fn is_queue_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    /// every alarm in the order they would ring, the queue is left as it was
    #[must_use]
    pub fn get_all_alarms(&self) -> Vec<Alarm> {
        self.alarms.iter().map(|(alarm, _)| alarm.clone()).collect()
    }

    /// replaces the next alarm with a new one, it goes to the back of its priority tier
    ///
    /// # Errors
    /// [`AlarmError::EmptyAlarmList`] if there is nothing to edit
    pub fn edit_next_alarm(
        &mut self,
        time: NaiveDateTime,
        label: impl Into<String>,
        priority: i64,
    ) -> Result<Alarm, AlarmError> {
        let old = self.remove_next_alarm()?;
        self.add_alarm(Alarm::new(time, label, priority), priority);
        Ok(old)
    }

    /// one tick of the alarm check: if the next alarm is due at `now` it is
    /// removed and returned
    pub fn poll(&mut self, now: NaiveTime) -> Option<Alarm> {
        let due = self.alarms.head().is_ok_and(|alarm| alarm.is_due(now));
        if !due {
            return None;
        }
        let alarm = self.alarms.remove().ok()?;
        info!("alarm {alarm} is going off");
        Some(alarm)
    }
}

impl fmt::Display for AlarmManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_queue_empty() {
            return writeln!(f, "no alarms");
        }
        write!(f, "{}", self.alarms)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn time(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 25)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn empty_manager() {
        let mut manager = AlarmManager::new();
        assert!(manager.is_queue_empty());
        assert_eq!(manager.get_next_alarm(), Err(AlarmError::NoNextAlarm));
        assert_eq!(manager.remove_next_alarm(), Err(AlarmError::EmptyAlarmList));
        assert_eq!(
            AlarmError::EmptyAlarmList.to_string(),
            "cannot remove from an empty alarm list"
        );
    }

    #[test]
    fn add_stamps_queue_priority_on_alarm() {
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0), "Morning Alarm"), 3);
        assert_eq!(manager.get_next_alarm().unwrap().priority, 3);
    }

    #[test]
    fn enumeration_keeps_priorities_and_order() {
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0), "a"), 1);
        manager.add_alarm(Alarm::at(time(9, 0), "b"), 5);
        manager.add_alarm(Alarm::at(time(10, 0), "c"), 1);
        let first = manager.get_all_alarms();
        let second = manager.get_all_alarms();
        assert_eq!(first, second);
        let summary = first
            .iter()
            .map(|alarm| (alarm.label.as_str(), alarm.priority))
            .collect::<Vec<_>>();
        assert_eq!(summary, [("b", 5), ("a", 1), ("c", 1)]);
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.remove_next_alarm().unwrap().label, "b");
    }

    #[test]
    fn edit_moves_alarm_behind_its_tier() {
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0), "a"), 1);
        manager.add_alarm(Alarm::at(time(9, 0), "b"), 1);
        let old = manager.edit_next_alarm(time(7, 0), "a2", 1).unwrap();
        assert_eq!(old.label, "a");
        let labels = manager
            .get_all_alarms()
            .into_iter()
            .map(|alarm| alarm.label)
            .collect::<Vec<_>>();
        assert_eq!(labels, ["b", "a2"]);
    }

    #[test]
    fn edit_on_empty_fails() {
        let mut manager = AlarmManager::new();
        assert_eq!(
            manager.edit_next_alarm(time(7, 0), "x", 0),
            Err(AlarmError::EmptyAlarmList)
        );
        assert!(manager.is_queue_empty());
    }

    #[test]
    fn poll_only_fires_the_head_when_due() {
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0), "low"), 0);
        manager.add_alarm(Alarm::at(time(9, 0), "high"), 2);
        // the low alarm's time does not fire it while the high one is ahead
        assert_eq!(manager.poll(NaiveTime::from_hms_opt(8, 0, 0).unwrap()), None);
        let fired = manager.poll(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(fired.map(|alarm| alarm.label), Some("high".to_string()));
        assert_eq!(manager.len(), 1);
        assert_eq!(AlarmManager::new().poll(NaiveTime::MIN), None);
    }

    #[test]
    fn display() {
        let mut manager = AlarmManager::new();
        assert_eq!(manager.to_string(), "no alarms\n");
        manager.add_alarm(Alarm::at(time(8, 0), "Morning Alarm"), 1);
        assert_eq!(manager.to_string(), "Morning Alarm - 08:00:00 (priority 1)\n");
    }
}
