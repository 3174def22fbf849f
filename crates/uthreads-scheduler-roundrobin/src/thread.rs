use foundation::{ExecutionContext, Micros};

use crate::context::Context;

pub type Tid = usize;

/// The thread `init` adopts. It runs on the process stack and can neither
/// block nor sleep; terminating it ends the process.
pub const MAIN_TID: Tid = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Ready,
    Running,
    Blocked,
}

/// Scheduling state together with the structure that physically holds the
/// thread.
///
/// Sleeping is orthogonal to ready/blocked: a sleeper stays in the sleep
/// queue whatever its state, and only on waking moves to the ready queue or
/// the blocked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    /// Occupies the running slot.
    Running,
    /// In the ready queue.
    Ready,
    /// In the blocked set.
    Blocked,
    /// In the sleep queue until `wake_at`.
    Sleeping { wake_at: Micros, blocked: bool },
}

impl ThreadStatus {
    pub fn state(self) -> ThreadState {
        match self {
            ThreadStatus::Running => ThreadState::Running,
            ThreadStatus::Ready | ThreadStatus::Sleeping { blocked: false, .. } => ThreadState::Ready,
            ThreadStatus::Blocked | ThreadStatus::Sleeping { blocked: true, .. } => {
                ThreadState::Blocked
            }
        }
    }

    pub fn is_sleeping(self) -> bool {
        matches!(self, ThreadStatus::Sleeping { .. })
    }

    pub fn wake_at(self) -> Option<Micros> {
        match self {
            ThreadStatus::Sleeping { wake_at, .. } => Some(wake_at),
            _ => None,
        }
    }
}

/// Code a spawned thread runs. Returning from it terminates the thread.
pub type Entry = Box<dyn FnOnce() + 'static>;

pub struct ThreadControlBlock {
    pub tid: Tid,
    pub status: ThreadStatus,
    /// Quanta this thread has started in the running slot, the current one
    /// included.
    pub run_count: u64,
    pub context: Box<Context>,
    pub entry: Option<Entry>,
}

impl ThreadControlBlock {
    /// The main thread, already running in its first quantum. Its context is
    /// captured the first time it is switched away from.
    pub fn main() -> Self {
        Self {
            tid: MAIN_TID,
            status: ThreadStatus::Running,
            run_count: 1,
            context: Context::current(),
            entry: None,
        }
    }

    pub fn spawned(tid: Tid, context: Box<Context>, entry: Entry) -> Self {
        Self {
            tid,
            status: ThreadStatus::Ready,
            run_count: 0,
            context,
            entry: Some(entry),
        }
    }
}
