//! Timers for the stage, polled from the UI thread.
//!
//! Nothing here sleeps or spawns. The presenter calls [`Scheduler::due`] once
//! per frame with the current instant and asks for a repaint at
//! [`Scheduler::next_deadline`].

use std::time::{Duration, Instant};

/// Work a timer asks the stage to do. Ordered so that a registry refresh
/// always runs before a recompute fired in the same poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageTask {
    RefreshRegistry,
    RecomputeRoutes,
}

#[derive(Debug, Clone)]
struct Timer {
    task: StageTask,
    due: Instant,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    torn_down: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false once torn down.
    fn push(&mut self, task: StageTask, due: Instant, period: Option<Duration>) -> bool {
        if self.torn_down {
            return false;
        }
        self.timers.push(Timer { task, due, period });
        true
    }

    /// Fire `task` every `period`, first at `now + period`.
    /// A zero period disables the timer and returns false.
    pub fn set_interval(&mut self, now: Instant, period: Duration, task: StageTask) -> bool {
        if period.is_zero() {
            return false;
        }
        self.push(task, now + period, Some(period))
    }

    /// Fire `task` once at `now + delay`.
    pub fn set_timeout(&mut self, now: Instant, delay: Duration, task: StageTask) -> bool {
        self.push(task, now + delay, None)
    }

    /// Cancel everything and refuse new timers.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            log::debug!("scheduler teardown, cancelling {} timer(s)", self.timers.len());
        }
        self.timers.clear();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Collect the tasks due at `now`, each at most once.
    ///
    /// One-shot timers are removed. An interval that fell behind is moved to
    /// `now + period` rather than firing once per missed tick.
    pub fn due(&mut self, now: Instant) -> Vec<StageTask> {
        let mut fired = Vec::new();
        self.timers.retain_mut(|t| {
            if t.due > now {
                return true;
            }
            fired.push(t.task);
            match t.period {
                Some(period) => {
                    t.due += period;
                    if t.due <= now {
                        t.due = now + period;
                    }
                    true
                }
                None => false,
            }
        });
        fired.sort();
        fired.dedup();
        fired
    }

    /// Time until the earliest timer fires, zero if one is already due.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.timers
            .iter()
            .map(|t| t.due.saturating_duration_since(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timeout_fires_once() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_timeout(t0, ms(100), StageTask::RecomputeRoutes);
        assert!(s.due(t0 + ms(50)).is_empty());
        assert_eq!(s.due(t0 + ms(100)), vec![StageTask::RecomputeRoutes]);
        assert!(s.due(t0 + ms(500)).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn interval_repeats_without_catch_up() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(t0, ms(200), StageTask::RefreshRegistry);
        assert_eq!(s.due(t0 + ms(200)), vec![StageTask::RefreshRegistry]);
        // A long stall fires once, then resumes the cadence from there.
        assert_eq!(s.due(t0 + ms(2000)), vec![StageTask::RefreshRegistry]);
        assert!(s.due(t0 + ms(2100)).is_empty());
        assert_eq!(s.next_deadline(t0 + ms(2100)), Some(ms(100)));
    }

    #[test]
    fn zero_interval_is_disabled() {
        let mut s = Scheduler::new();
        assert!(!s.set_interval(Instant::now(), Duration::ZERO, StageTask::RefreshRegistry));
        assert!(s.is_empty());
    }

    #[test]
    fn tasks_are_deduplicated_and_ordered() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_timeout(t0, ms(100), StageTask::RecomputeRoutes);
        s.set_timeout(t0, ms(100), StageTask::RecomputeRoutes);
        s.set_interval(t0, ms(100), StageTask::RefreshRegistry);
        assert_eq!(
            s.due(t0 + ms(100)),
            vec![StageTask::RefreshRegistry, StageTask::RecomputeRoutes]
        );
    }

    #[test]
    fn teardown_cancels_and_rejects_new_timers() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(t0, ms(200), StageTask::RefreshRegistry);
        s.set_timeout(t0, ms(300), StageTask::RecomputeRoutes);
        s.teardown();
        assert!(s.is_empty());
        assert_eq!(s.next_deadline(t0), None);
        assert!(!s.set_timeout(t0, ms(10), StageTask::RecomputeRoutes));
        assert!(s.due(t0 + ms(1000)).is_empty());
    }
}
