//! Time-ordered turn queue.
//!
//! Every live entity owns exactly one pending [`Ticket`]; the queue pops the
//! earliest one, hands the entity its turn, and the acting layer re-inserts
//! a new ticket when the turn resolves. Ties on scheduled time break by
//! insertion sequence so simultaneous entities act in a deterministic FIFO
//! order, which replay depends on.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::GameConfig;
use crate::state::{EntityId, Tick};

/// A scheduled future activation for one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticket {
    pub time: Tick,
    pub seq: u64,
    pub entity: EntityId,
}

impl Ord for Ticket {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the std max-heap pops the earliest ticket
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Errors surfaced by queue operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    /// Popping an empty queue. Every live entity must keep a pending
    /// ticket, so this is a bookkeeping bug, not a gameplay outcome.
    #[error("turn queue exhausted: no pending tickets")]
    Exhausted,
}

/// Min-heap of tickets plus the timeline clock.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnQueue {
    heap: BinaryHeap<Ticket>,
    current_time: Tick,
    last_time: Tick,
    next_seq: u64,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timeline clock: the time of the most recently invoked ticket.
    pub fn current_time(&self) -> Tick {
        self.current_time
    }

    /// Global turn counter derived from the clock. One turn elapses per
    /// [`GameConfig::TURN_UNITS`] time units, independent of how many
    /// tickets fired inside the window.
    pub fn turn_count(&self) -> u64 {
        self.current_time.0 / GameConfig::TURN_UNITS
    }

    /// Number of pending tickets.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Inserts a ticket `interval` time units from now.
    pub fn schedule(&mut self, interval: u64, entity: EntityId) {
        let ticket = Ticket {
            time: self.current_time + interval,
            seq: self.next_seq,
            entity,
        };
        self.heap.push(ticket);
        self.next_seq += 1;
    }

    /// Inserts a fresh ticket for an entity whose turn just resolved.
    ///
    /// This never mutates an existing ticket in place; duplicate protection
    /// is the caller's job via [`TurnQueue::unschedule`].
    pub fn reschedule(&mut self, interval: u64, entity: EntityId) {
        self.schedule(interval, entity);
    }

    /// Removes any pending ticket for `entity`.
    ///
    /// Must be called whenever an entity dies or leaves the simulation. The
    /// one exception is the entity currently being processed: its ticket
    /// was already consumed by [`TurnQueue::invoke_next`], so removal is a
    /// no-op (self-destructing hazards hit this path).
    pub fn unschedule(&mut self, entity: EntityId, active_entity: EntityId) {
        if entity == active_entity {
            return;
        }
        self.heap.retain(|ticket| ticket.entity != entity);
    }

    /// Pops the earliest ticket, advances the clock to it, and returns the
    /// entity due to act.
    pub fn invoke_next(&mut self) -> Result<EntityId, TurnError> {
        let ticket = self.heap.pop().ok_or(TurnError::Exhausted)?;
        self.current_time = ticket.time;
        Ok(ticket.entity)
    }

    /// Number of whole global turns crossed since this was last called.
    /// Advances the bookkeeping mark, so each boundary is reported once.
    pub fn take_elapsed_turns(&mut self) -> u64 {
        let crossed =
            self.current_time.0 / GameConfig::TURN_UNITS - self.last_time.0 / GameConfig::TURN_UNITS;
        self.last_time = self.current_time;
        crossed
    }

    /// True if the entity holds a pending ticket. Intended for invariant
    /// checks and tests.
    pub fn is_scheduled(&self, entity: EntityId) -> bool {
        self.heap.iter().any(|ticket| ticket.entity == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: EntityId = EntityId(1);
    const B: EntityId = EntityId(2);
    const C: EntityId = EntityId(3);

    #[test]
    fn pops_in_time_order() {
        let mut queue = TurnQueue::new();
        queue.schedule(30, A);
        queue.schedule(10, B);
        queue.schedule(20, C);
        assert_eq!(queue.invoke_next(), Ok(B));
        assert_eq!(queue.current_time(), Tick(10));
        assert_eq!(queue.invoke_next(), Ok(C));
        assert_eq!(queue.invoke_next(), Ok(A));
        assert_eq!(queue.current_time(), Tick(30));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut queue = TurnQueue::new();
        queue.schedule(0, A);
        queue.schedule(0, B);
        queue.schedule(0, C);
        assert_eq!(queue.invoke_next(), Ok(A));
        assert_eq!(queue.invoke_next(), Ok(B));
        assert_eq!(queue.invoke_next(), Ok(C));
    }

    #[test]
    fn intervals_are_relative_to_the_moving_clock() {
        let mut queue = TurnQueue::new();
        queue.schedule(10, A);
        queue.schedule(25, B);
        assert_eq!(queue.invoke_next(), Ok(A));
        // A acts again 10 after its own turn at t=10, beating B at t=25
        queue.reschedule(10, A);
        assert_eq!(queue.invoke_next(), Ok(A));
        assert_eq!(queue.current_time(), Tick(20));
        assert_eq!(queue.invoke_next(), Ok(B));
    }

    #[test]
    fn unschedule_removes_pending_but_spares_the_active_entity() {
        let mut queue = TurnQueue::new();
        queue.schedule(5, A);
        queue.schedule(10, B);
        let active = queue.invoke_next().unwrap();
        assert_eq!(active, A);

        // active entity: nothing pending, removal must be a no-op
        queue.unschedule(A, active);
        assert!(queue.is_scheduled(B));

        queue.unschedule(B, active);
        assert!(!queue.is_scheduled(B));
        assert_eq!(queue.invoke_next(), Err(TurnError::Exhausted));
    }

    #[test]
    fn single_pending_ticket_per_entity() {
        let mut queue = TurnQueue::new();
        queue.schedule(5, A);
        let active = queue.invoke_next().unwrap();
        queue.reschedule(7, active);
        assert_eq!(
            queue
                .heap
                .iter()
                .filter(|ticket| ticket.entity == A)
                .count(),
            1
        );
    }

    #[test]
    fn empty_queue_pop_is_an_error() {
        let mut queue = TurnQueue::new();
        assert_eq!(queue.invoke_next(), Err(TurnError::Exhausted));
    }

    #[test]
    fn turn_count_derives_from_the_clock() {
        let mut queue = TurnQueue::new();
        queue.schedule(59, A);
        queue.invoke_next().unwrap();
        assert_eq!(queue.turn_count(), 0);
        assert_eq!(queue.take_elapsed_turns(), 0);

        queue.schedule(121, A);
        queue.invoke_next().unwrap();
        assert_eq!(queue.turn_count(), 3);
        assert_eq!(queue.take_elapsed_turns(), 3);
        // second call reports nothing new
        assert_eq!(queue.take_elapsed_turns(), 0);
    }
}
