//! Cancellable scheduled tasks.
//!
//! A [`TimerSlot`] holds at most one outstanding task. Scheduling into an occupied
//! slot cancels the previous task first, so "one pending reset" or "consumption XOR
//! recharge" is a property of the type rather than of call-site discipline.
//!
//! Slots do not run callbacks. The owner ticks them with an elapsed-time delta and
//! reacts to the returned [`Fired`] record, which keeps every mutation on the
//! simulation's single execution context.

use std::time::Duration;

use bevy::time::{Timer, TimerMode};

/// Identifies one scheduled task. A token outlives its task; cancelling with a
/// stale token is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed delay, fires once and frees the slot.
    Once(Duration),
    /// Fixed interval, fires until cancelled.
    Every(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    pub token: TaskToken,
    pub kind: K,
    /// Interval periods elapsed during this tick (always 1 for `Once`).
    pub times: u32,
}

#[derive(Debug, Clone)]
struct Scheduled<K> {
    token: TaskToken,
    kind: K,
    timer: Timer,
}

#[derive(Debug, Clone)]
pub struct TimerSlot<K> {
    task: Option<Scheduled<K>>,
    issued: u64,
}

impl<K> Default for TimerSlot<K> {
    fn default() -> Self {
        Self { task: None, issued: 0 }
    }
}

impl<K: Copy> TimerSlot<K> {
    /// Replace whatever is pending with a new task.
    pub fn schedule(&mut self, kind: K, cadence: Cadence) -> TaskToken {
        self.issued += 1;
        let token = TaskToken(self.issued);
        let timer = match cadence {
            Cadence::Once(delay) => Timer::new(delay, TimerMode::Once),
            Cadence::Every(interval) => Timer::new(interval, TimerMode::Repeating),
        };
        self.task = Some(Scheduled { token, kind, timer });
        token
    }

    pub fn cancel(&mut self) -> Option<TaskToken> {
        self.task.take().map(|t| t.token)
    }

    #[inline]
    pub fn token(&self) -> Option<TaskToken> {
        self.task.as_ref().map(|t| t.token)
    }

    #[inline]
    pub fn kind(&self) -> Option<K> {
        self.task.as_ref().map(|t| t.kind)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    #[inline]
    pub fn remaining(&self) -> Option<Duration> {
        self.task.as_ref().map(|t| t.timer.remaining())
    }

    /// Advance the pending task. `Once` tasks free the slot when they fire.
    pub fn tick(&mut self, delta: Duration) -> Option<Fired<K>> {
        let task = self.task.as_mut()?;
        task.timer.tick(delta);

        let times = task.timer.times_finished_this_tick();
        if times == 0 {
            return None;
        }

        let fired = Fired { token: task.token, kind: task.kind, times };
        if task.timer.mode() == TimerMode::Once {
            self.task = None;
        }
        Some(fired)
    }
}

/// Explicit teardown capability for session state that owns timers.
///
/// `dispose` cancels every outstanding task and returns the value to its
/// fresh-session state. It must be safe to call repeatedly.
pub trait Disposable {
    fn dispose(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn once_fires_a_single_time_and_frees_the_slot() {
        let mut slot = TimerSlot::default();
        slot.schedule((), Cadence::Once(MS(200)));

        assert!(slot.tick(MS(150)).is_none());
        let fired = slot.tick(MS(60)).expect("due");
        assert_eq!(fired.times, 1);
        assert!(!slot.is_pending());
        assert!(slot.tick(MS(500)).is_none());
    }

    #[test]
    fn every_reports_elapsed_periods() {
        let mut slot = TimerSlot::default();
        slot.schedule('c', Cadence::Every(MS(100)));

        let fired = slot.tick(MS(350)).expect("due");
        assert_eq!(fired.kind, 'c');
        assert_eq!(fired.times, 3);
        assert!(slot.is_pending());

        // The leftover 50ms carries over.
        assert_eq!(slot.tick(MS(50)).map(|f| f.times), Some(1));
    }

    #[test]
    fn scheduling_replaces_the_pending_task() {
        let mut slot = TimerSlot::default();
        let first = slot.schedule('a', Cadence::Every(MS(100)));
        let second = slot.schedule('b', Cadence::Every(MS(100)));

        assert_ne!(first, second);
        assert_eq!(slot.kind(), Some('b'));

        assert_eq!(slot.token(), Some(second));
        // Only the replacement fires.
        let fired = slot.tick(MS(100)).expect("due");
        assert_eq!((fired.kind, fired.token), ('b', second));
    }

    #[test]
    fn remaining_tracks_progress() {
        let mut slot = TimerSlot::default();
        slot.schedule((), Cadence::Once(MS(1000)));
        slot.tick(MS(400));
        assert_eq!(slot.remaining(), Some(MS(600)));
        slot.cancel();
        assert_eq!(slot.remaining(), None);
    }
}
