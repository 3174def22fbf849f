//! Threads waiting for a real-time instant, earliest first.

use foundation::utils::RemovablePriorityQueue;
use foundation::Micros;

use crate::thread::Tid;

/// Field order makes the derived ordering wake time first, id second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SleepEntry {
    pub wake_at: Micros,
    pub tid: Tid,
}

pub struct SleepQueue {
    heap: RemovablePriorityQueue<SleepEntry>,
}

impl SleepQueue {
    /// Room for `capacity` sleepers without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: RemovablePriorityQueue::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tid: Tid, wake_at: Micros) {
        self.heap.push(SleepEntry { wake_at, tid });
    }

    /// Takes out a sleeper before it is due, e.g. one being terminated.
    pub fn remove(&mut self, tid: Tid, wake_at: Micros) -> bool {
        self.heap.remove(&SleepEntry { wake_at, tid })
    }

    /// Pops the earliest sleeper if its wake time is not after `now`.
    pub fn pop_due(&mut self, now: Micros) -> Option<SleepEntry> {
        match self.heap.peek() {
            Some(entry) if entry.wake_at <= now => self.heap.pop(),
            _ => None,
        }
    }
}
