//! Deferred message queue.
//!
//! Replaces ad-hoc `setTimeout` callbacks: a caller schedules a message for
//! later and the owner pops due messages each frame and routes them to its
//! own handlers. Nothing is ever cancelled; handlers must treat a message
//! whose context has moved on as a no-op.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Pending<M> {
    due_ms: u64,
    order: u64,
    message: M,
}

impl<M> PartialEq for Pending<M> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.order == other.order
    }
}

impl<M> Eq for Pending<M> {}

impl<M> PartialOrd for Pending<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for Pending<M> {
    // Reversed so the max-heap yields the earliest deadline first,
    // and among equal deadlines the earliest scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Min-heap of messages keyed by due time in milliseconds.
pub struct TimerQueue<M> {
    heap: BinaryHeap<Pending<M>>,
    next_order: u64,
}

impl<M> TimerQueue<M> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_order: 0,
        }
    }

    /// Schedule `message` to become due `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, message: M) {
        let order = self.next_order;
        self.next_order += 1;
        self.heap.push(Pending {
            due_ms: now_ms.saturating_add(delay_ms),
            order,
            message,
        });
    }

    /// Pop the earliest message whose deadline has passed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<M> {
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|p| p.message)
    }

    /// Deadline of the earliest pending message.
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|p| p.due_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}
