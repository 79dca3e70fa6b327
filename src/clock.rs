use std::{cell::Cell, thread, time::Duration};

use chrono::NaiveDateTime;
use log::debug;

use crate::{alarm::Alarm, manager::AlarmManager};

/// where the current time comes from
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// the local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// a clock that only moves when told to
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// checks for due alarms at a fixed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    pub interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl Poller {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// a single check, the fired alarm (if any) has already been removed
    pub fn tick(&self, manager: &mut AlarmManager, clock: &impl Clock) -> Option<Alarm> {
        manager.poll(clock.now().time())
    }

    /// ticks until `keep_going` says to stop, handing every fired alarm to `on_fire`.
    /// `keep_going` is asked before each tick so stopping never interrupts one.
    pub fn run(
        &self,
        manager: &mut AlarmManager,
        clock: &impl Clock,
        mut on_fire: impl FnMut(&mut AlarmManager, Alarm),
        mut keep_going: impl FnMut() -> bool,
    ) {
        while keep_going() {
            if let Some(alarm) = self.tick(manager, clock) {
                on_fire(manager, alarm);
            }
            thread::sleep(self.interval);
        }
        debug!("stopped polling with {} alarms left", manager.len());
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 25)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn tick_fires_on_exact_second() {
        let clock = FixedClock::new(time(7, 59, 59));
        let poller = Poller::default();
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0, 0), "Morning Alarm"), 1);

        assert_eq!(poller.tick(&mut manager, &clock), None);
        clock.advance(chrono::Duration::seconds(1));
        let fired = poller.tick(&mut manager, &clock).unwrap();
        assert_eq!(fired.label, "Morning Alarm");
        assert!(manager.is_queue_empty());
        assert_eq!(poller.tick(&mut manager, &clock), None);
    }

    #[test]
    fn fires_on_another_day() {
        let clock = FixedClock::new(time(8, 0, 0) + chrono::Duration::days(3));
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(8, 0, 0), "daily"), 0);
        assert!(Poller::default().tick(&mut manager, &clock).is_some());
    }

    #[test]
    fn run_stops_when_asked() {
        let clock = FixedClock::new(time(9, 0, 0));
        let poller = Poller::new(Duration::ZERO);
        let mut manager = AlarmManager::new();
        manager.add_alarm(Alarm::at(time(9, 0, 0), "a"), 2);
        manager.add_alarm(Alarm::at(time(9, 0, 0), "b"), 1);
        manager.add_alarm(Alarm::at(time(10, 0, 0), "c"), 0);

        let mut fired = Vec::new();
        let mut ticks = 0;
        poller.run(
            &mut manager,
            &clock,
            |_, alarm| fired.push(alarm.label),
            || {
                ticks += 1;
                ticks <= 5
            },
        );
        assert_eq!(fired, ["a", "b"]);
        assert_eq!(manager.len(), 1);
    }
}
