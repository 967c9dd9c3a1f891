//! Virtual-clock timer queue.
//!
//! Animations and pauses are modeled as timers on a clock the host advances
//! explicitly. Timers fire in (due time, insertion order). Each timer is
//! stamped with the turn serial it was scheduled under so the match loop can
//! drop timers belonging to a superseded turn.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::core::DieChoice;
use crate::pieces::PieceId;
use crate::board::Position;

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// One tumble frame; the dice settle when `remaining` reaches zero.
    Tumble { remaining: u8 },
    /// One cell of stepwise advancement.
    Step {
        piece: PieceId,
        choice: DieChoice,
        steps: u8,
        from: Position,
        remaining: u8,
    },
    /// Pass a turn that had no legal move.
    NoMove,
    /// Hand over to the next turn.
    Rotate,
    /// AI rolls.
    AiThink,
    /// AI picks and plays a move.
    AiMove,
}

/// A scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub due: u64,
    pub seq: u64,
    /// Turn serial at scheduling time.
    pub serial: u32,
    pub kind: TimerKind,
}

impl Ord for Timer {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Timer queue over a virtual millisecond clock.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_seq: u64,
    queue: BinaryHeap<Timer>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending timer.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|t| t.due)
    }

    /// Schedule `kind` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, serial: u32, kind: TimerKind) {
        let timer = Timer {
            due: self.now.saturating_add(delay_ms),
            seq: self.next_seq,
            serial,
            kind,
        };
        self.next_seq += 1;
        self.queue.push(timer);
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<Timer> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let timer = self.queue.pop()?;
        self.now = self.now.max(timer.due);
        Some(timer)
    }

    /// Move the clock forward to `time` (never backwards).
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, 1, TimerKind::Rotate);
        scheduler.schedule(50, 1, TimerKind::AiThink);
        scheduler.schedule(100, 1, TimerKind::NoMove);

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(1000))
            .map(|t| t.kind)
            .collect();
        assert_eq!(order, vec![TimerKind::AiThink, TimerKind::Rotate, TimerKind::NoMove]);
        assert_eq!(scheduler.now(), 100);
    }

    #[test]
    fn test_not_due_yet() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(500, 1, TimerKind::AiMove);
        assert!(scheduler.pop_due(499).is_none());
        assert_eq!(scheduler.next_due(), Some(500));

        scheduler.advance_to(499);
        assert_eq!(scheduler.now(), 499);
        assert!(scheduler.pop_due(500).is_some());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(1000);
        scheduler.schedule(0, 2, TimerKind::Rotate);
        let timer = scheduler.pop_due(1000).unwrap();
        assert_eq!(timer.due, 1000);
        assert_eq!(timer.serial, 2);
    }
}
