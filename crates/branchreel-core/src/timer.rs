//! Cooperative timer queue driven by a logical clock.

use std::time::Duration;

use crate::ticket::Ticket;

/// A timer whose deadline has passed, returned by [`TimerQueue::take_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTimer<A> {
    /// The ticket that was current when the timer was scheduled.
    pub ticket: Ticket,
    /// The deadline, on the scheduling clock.
    pub due: Duration,
    /// What to do when the timer fires.
    pub action: A,
}

#[derive(Debug)]
struct Entry<A> {
    due: Duration,
    seq: u64,
    ticket: Ticket,
    action: A,
}

/// Pending timers, fired in deadline order when polled.
///
/// The queue never consults a clock itself: callers pass `now` in, so it can
/// be driven by a real timer in production and a hand-advanced clock in
/// tests.
#[derive(Debug)]
pub struct TimerQueue<A> {
    entries: Vec<Entry<A>>,
    next_seq: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedules `action` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, ticket: Ticket, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due: now.saturating_add(delay),
            seq,
            ticket,
            action,
        });
    }

    /// Removes and returns every timer due at or before `now`, earliest
    /// first. Timers with equal deadlines fire in scheduling order.
    pub fn take_due(&mut self, now: Duration) -> Vec<DueTimer<A>> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|entry| entry.due <= now);
        self.entries = pending;
        due.sort_by_key(|entry| (entry.due, entry.seq));
        due.into_iter()
            .map(|entry| DueTimer {
                ticket: entry.ticket,
                due: entry.due,
                action: entry.action,
            })
            .collect()
    }

    /// Drops every pending timer.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Returns the earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
