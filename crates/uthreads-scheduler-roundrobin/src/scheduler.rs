use std::collections::VecDeque;
use std::ptr::NonNull;

use foundation::utils::RemovablePriorityQueue;
use foundation::{ExecutionContext, Micros};

use crate::config::SchedulerConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::sleep::SleepQueue;
use crate::stack::{StackArena, ThreadStack};
use crate::thread::{Entry, ThreadControlBlock, ThreadStatus, Tid, MAIN_TID};

/// Why the running thread is giving up the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReason {
    QuantumExpired,
    Block,
    Terminate,
    Sleep,
}

/// Result of a scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The running thread keeps going in a fresh quantum.
    Continue,
    /// Control moves to `to`. `from` is `None` when the previous thread no
    /// longer exists and has nothing to save.
    Switch { from: Option<Tid>, to: Tid },
}

/// What the caller of an operation has to do once the scheduler lock is
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Return,
    Switch(SwitchReason),
    ExitProcess,
}

/// Round-robin scheduler state.
///
/// This type only does bookkeeping and makes decisions; it never touches
/// signals or performs a context switch itself. Every thread is reachable from
/// exactly one of: the running slot, the ready queue, the blocked set, the
/// sleep queue. Its [`ThreadStatus`] says which.
///
/// [`Scheduler::switch`] runs from the signal handler and must not touch the
/// allocator, so every structure is sized for `max_threads` up front.
pub struct Scheduler {
    threads: Vec<Option<ThreadControlBlock>>,
    stacks: StackArena,
    ready: VecDeque<Tid>,
    /// Indexed by tid.
    blocked: Vec<bool>,
    sleeping: SleepQueue,
    free_tids: RemovablePriorityQueue<Tid>,
    next_tid: Tid,
    running: Tid,
    live: usize,
    total_quanta: u64,
    max_threads: usize,
    entry_point: extern "C" fn(),
}

impl Scheduler {
    /// Adopts the caller as the main thread, running in quantum 1.
    /// Spawned threads start executing at `entry_point`.
    pub fn new(config: &SchedulerConfig, entry_point: extern "C" fn()) -> Self {
        let mut threads: Vec<Option<ThreadControlBlock>> =
            (0..config.max_threads).map(|_| None).collect();
        threads[MAIN_TID] = Some(ThreadControlBlock::main());

        Self {
            threads,
            stacks: StackArena::new(config.max_threads, config.stack_size),
            ready: VecDeque::with_capacity(config.max_threads),
            blocked: vec![false; config.max_threads],
            sleeping: SleepQueue::with_capacity(config.max_threads),
            free_tids: RemovablePriorityQueue::with_capacity(config.max_threads),
            next_tid: MAIN_TID + 1,
            running: MAIN_TID,
            live: 1,
            total_quanta: 1,
            max_threads: config.max_threads,
            entry_point,
        }
    }

    pub fn current_tid(&self) -> Tid {
        self.running
    }

    pub fn total_quanta(&self) -> u64 {
        self.total_quanta
    }

    pub fn live_threads(&self) -> usize {
        self.live
    }

    pub fn quanta_of(&self, tid: Tid) -> Result<u64> {
        self.lookup(tid).map(|tcb| tcb.run_count)
    }

    pub fn status_of(&self, tid: Tid) -> Result<ThreadStatus> {
        self.lookup(tid).map(|tcb| tcb.status)
    }

    pub fn spawn(&mut self, entry: Entry) -> Result<Tid> {
        if self.live >= self.max_threads {
            return Err(Error::TooManyThreads {
                max: self.max_threads,
            });
        }
        self.stacks.reap();
        let tid = self.allocate_tid();
        let stack = self.stacks.allocate(tid);
        // SAFETY: the arena keeps this stack until the thread is terminated,
        // and the context dies with the TCB at the same moment.
        let context = unsafe { Context::with_entry(stack.as_mut_slice(), self.entry_point) };
        self.threads[tid] = Some(ThreadControlBlock::spawned(tid, context, entry));
        self.ready.push_back(tid);
        self.live += 1;
        log::debug!("spawned thread {tid} ({} live)", self.live);
        Ok(tid)
    }

    /// Hands the entry function of the running thread to its first run.
    pub fn take_entry(&mut self) -> Option<Entry> {
        self.threads[self.running]
            .as_mut()
            .and_then(|tcb| tcb.entry.take())
    }

    /// Removes `tid` from every structure and frees its id.
    ///
    /// The main thread is left alone: terminating it means ending the
    /// process, which the caller carries out. When the running thread
    /// terminates itself the caller must switch away with
    /// [`SwitchReason::Terminate`]; its stack stays retired until the next
    /// spawn or termination.
    pub fn terminate(&mut self, tid: Tid) -> Result<Next> {
        self.lookup(tid)?;
        if tid == MAIN_TID {
            return Ok(Next::ExitProcess);
        }
        self.stacks.reap();
        let Some(tcb) = self.threads[tid].take() else {
            return Err(Error::NoSuchThread(tid));
        };

        let next = match tcb.status {
            ThreadStatus::Running => {
                self.stacks.retire(tid);
                Next::Switch(SwitchReason::Terminate)
            }
            ThreadStatus::Ready => {
                self.ready.retain(|&queued| queued != tid);
                self.stacks.release(tid);
                Next::Return
            }
            ThreadStatus::Blocked => {
                self.blocked[tid] = false;
                self.stacks.release(tid);
                Next::Return
            }
            ThreadStatus::Sleeping { wake_at, .. } => {
                self.sleeping.remove(tid, wake_at);
                self.stacks.release(tid);
                Next::Return
            }
        };

        self.free_tids.push(tid);
        self.live -= 1;
        log::debug!("terminated thread {tid} ({} live)", self.live);
        Ok(next)
    }

    pub fn block(&mut self, tid: Tid) -> Result<Next> {
        let status = self.status_of(tid)?;
        if tid == MAIN_TID {
            return Err(Error::BlockMainThread);
        }
        match status {
            ThreadStatus::Running => return Ok(Next::Switch(SwitchReason::Block)),
            ThreadStatus::Ready => {
                self.tcb_mut(tid)?.status = ThreadStatus::Blocked;
                self.ready.retain(|&queued| queued != tid);
                self.blocked[tid] = true;
            }
            ThreadStatus::Sleeping { wake_at, .. } => {
                self.tcb_mut(tid)?.status = ThreadStatus::Sleeping {
                    wake_at,
                    blocked: true,
                };
            }
            ThreadStatus::Blocked => {}
        }
        Ok(Next::Return)
    }

    pub fn resume(&mut self, tid: Tid) -> Result<Next> {
        match self.status_of(tid)? {
            ThreadStatus::Blocked => {
                self.tcb_mut(tid)?.status = ThreadStatus::Ready;
                self.blocked[tid] = false;
                self.ready.push_back(tid);
            }
            ThreadStatus::Sleeping { wake_at, .. } => {
                self.tcb_mut(tid)?.status = ThreadStatus::Sleeping {
                    wake_at,
                    blocked: false,
                };
            }
            ThreadStatus::Running | ThreadStatus::Ready => {}
        }
        Ok(Next::Return)
    }

    /// Puts the running thread to sleep until `now + usecs`.
    pub fn sleep(&mut self, usecs: u32, now: Micros) -> Result<Next> {
        let tid = self.running;
        if tid == MAIN_TID {
            return Err(Error::MainThreadSleep);
        }
        let wake_at = now + Micros::from(usecs);
        self.tcb_mut(tid)?.status = ThreadStatus::Sleeping {
            wake_at,
            blocked: false,
        };
        self.sleeping.push(tid, wake_at);
        Ok(Next::Switch(SwitchReason::Sleep))
    }

    /// Starts a new quantum.
    ///
    /// Counts the boundary, wakes every sleeper due at `now`, then either
    /// keeps the running thread (quantum expired and nobody else is ready) or
    /// picks the front of the ready queue. The running thread is filed
    /// according to `reason`; for [`SwitchReason::Sleep`] and
    /// [`SwitchReason::Terminate`] the caller has already done so.
    ///
    /// Fails with [`Error::NoRunnableThread`], leaving the running thread in
    /// place, when it must leave but the ready queue is empty.
    pub fn switch(&mut self, reason: SwitchReason, now: Micros) -> Result<SwitchOutcome> {
        self.total_quanta += 1;
        self.wake_sleepers(now);

        if self.ready.is_empty() {
            if reason == SwitchReason::QuantumExpired {
                self.tcb_mut(self.running)?.run_count += 1;
                return Ok(SwitchOutcome::Continue);
            }
            return Err(Error::NoRunnableThread);
        }

        let from = self.running;
        let from = match reason {
            SwitchReason::QuantumExpired => {
                self.tcb_mut(from)?.status = ThreadStatus::Ready;
                self.ready.push_back(from);
                Some(from)
            }
            SwitchReason::Block => {
                self.tcb_mut(from)?.status = ThreadStatus::Blocked;
                self.blocked[from] = true;
                Some(from)
            }
            SwitchReason::Sleep => Some(from),
            SwitchReason::Terminate => None,
        };

        let Some(to) = self.ready.pop_front() else {
            return Err(Error::NoRunnableThread);
        };
        let next = self.tcb_mut(to)?;
        next.status = ThreadStatus::Running;
        next.run_count += 1;
        self.running = to;

        if from == Some(to) {
            // A sleeper that was already due got straight back to the front.
            return Ok(SwitchOutcome::Continue);
        }
        Ok(SwitchOutcome::Switch { from, to })
    }

    /// Where `tid` saves and restores its execution. Stable for as long as
    /// `tid` lives, whatever happens to the scheduler in the meantime.
    pub fn context_ptr(&mut self, tid: Tid) -> Option<NonNull<Context>> {
        self.threads
            .get_mut(tid)?
            .as_mut()
            .map(|tcb| NonNull::from(&mut *tcb.context))
    }

    /// Drops every thread. Returns the stack of the running thread instead of
    /// freeing it when that thread is not the main one, since execution is
    /// still on it.
    pub fn teardown(mut self) -> Option<ThreadStack> {
        let running = self.running;
        self.ready.clear();
        self.threads.clear();
        if running == MAIN_TID {
            None
        } else {
            self.stacks.release(running)
        }
    }

    fn wake_sleepers(&mut self, now: Micros) {
        while let Some(entry) = self.sleeping.pop_due(now) {
            let Some(tcb) = self.threads[entry.tid].as_mut() else {
                continue;
            };
            match tcb.status {
                ThreadStatus::Sleeping { blocked: true, .. } => {
                    tcb.status = ThreadStatus::Blocked;
                    self.blocked[entry.tid] = true;
                }
                ThreadStatus::Sleeping { blocked: false, .. } => {
                    tcb.status = ThreadStatus::Ready;
                    self.ready.push_back(entry.tid);
                }
                // Terminating a sleeper takes it out of the queue as well.
                _ => {}
            }
        }
    }

    fn allocate_tid(&mut self) -> Tid {
        self.free_tids.pop().unwrap_or_else(|| {
            let tid = self.next_tid;
            self.next_tid += 1;
            tid
        })
    }

    fn lookup(&self, tid: Tid) -> Result<&ThreadControlBlock> {
        if tid >= self.max_threads {
            return Err(Error::TidOutOfRange {
                tid,
                max: self.max_threads,
            });
        }
        self.threads[tid].as_ref().ok_or(Error::NoSuchThread(tid))
    }

    fn tcb_mut(&mut self, tid: Tid) -> Result<&mut ThreadControlBlock> {
        if tid >= self.max_threads {
            return Err(Error::TidOutOfRange {
                tid,
                max: self.max_threads,
            });
        }
        self.threads[tid].as_mut().ok_or(Error::NoSuchThread(tid))
    }
}
