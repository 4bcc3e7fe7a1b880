//! Timers

use std::{collections::BTreeMap, time::Duration};

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Cancellation token for a scheduled timer.
    pub struct TimerKey;
}

#[derive(Debug)]
struct Scheduled<E> {
    deadline: Duration,
    seq: u64,
    event: E,
}

/// Deadline-ordered set of pending events.
///
/// Events with the same deadline fire in the order they were scheduled. Cancelling a timer
/// removes it outright, so a cancelled event can never be popped.
#[derive(Debug)]
pub struct Timers<E> {
    scheduled: SlotMap<TimerKey, Scheduled<E>>,
    order: BTreeMap<(Duration, u64), TimerKey>,
    next_seq: u64,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self {
            scheduled: SlotMap::with_key(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> Timers<E> {
    /// Create an empty timer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire once the clock reaches `deadline`.
    pub fn schedule(&mut self, deadline: Duration, event: E) -> TimerKey {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        let key = self.scheduled.insert(Scheduled {
            deadline,
            seq,
            event,
        });

        self.order.insert((deadline, seq), key);

        key
    }

    /// Cancel a pending timer, returning its event if it had not fired yet.
    pub fn cancel(&mut self, key: TimerKey) -> Option<E> {
        let scheduled = self.scheduled.remove(key)?;

        self.order.remove(&(scheduled.deadline, scheduled.seq));

        Some(scheduled.event)
    }

    /// Pop the earliest timer if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let (&(deadline, _), _) = self.order.first_key_value()?;

        if deadline > now {
            return None;
        }

        let (_, key) = self.order.pop_first()?;

        self.scheduled
            .remove(key)
            .map(|scheduled| (scheduled.deadline, scheduled.event))
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.order
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline)
    }

    /// Whether the timer is still pending.
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.scheduled.contains_key(key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut timers = Timers::new();

        timers.schedule(ms(300), "late");
        timers.schedule(ms(100), "early");

        assert_eq!(timers.pop_due(ms(1_000)), Some((ms(100), "early")));
        assert_eq!(timers.pop_due(ms(1_000)), Some((ms(300), "late")));
        assert_eq!(timers.pop_due(ms(1_000)), None);
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut timers = Timers::new();

        timers.schedule(ms(100), 1);
        timers.schedule(ms(100), 2);
        timers.schedule(ms(100), 3);

        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(100)))
            .map(|(_, event)| event)
            .collect();

        assert_eq!(fired, [1, 2, 3]);
    }

    #[test]
    fn nothing_pops_before_deadline() {
        let mut timers = Timers::new();

        timers.schedule(ms(500), ());

        assert_eq!(timers.pop_due(ms(499)), None);
        assert_eq!(timers.next_deadline(), Some(ms(500)));
        assert_eq!(timers.pop_due(ms(500)), Some((ms(500), ())));
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = Timers::new();

        let key = timers.schedule(ms(100), "cancelled");
        timers.schedule(ms(200), "kept");

        assert_eq!(timers.cancel(key), Some("cancelled"));
        assert_eq!(timers.cancel(key), None);
        assert!(!timers.is_pending(key));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(ms(1_000)), Some((ms(200), "kept")));
        assert!(timers.is_empty());
    }
}
