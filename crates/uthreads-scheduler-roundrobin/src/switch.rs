//! Turns scheduling decisions into actual context transfers.
//!
//! Everything here runs with the quantum signal masked. The global scheduler
//! slot is never held across a transfer: pointers to the two contexts are
//! taken under the lock, the lock is released, and only then does control
//! move.
//!
//! A quantum switch runs in the signal handler, possibly on top of a thread
//! that was interrupted inside the allocator or a stream lock. That path
//! neither allocates, frees nor logs.

use core::ptr::NonNull;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use arch_ucontext::{now_micros, InterruptGuard};
use foundation::{fatal, ExecutionContext};

use crate::context::Context;
use crate::ops::{self, RUNTIME};
use crate::scheduler::{SwitchOutcome, SwitchReason};
use crate::thread::Entry;

enum Transfer {
    Stay,
    /// Save into `from`, run `to`.
    Swap {
        from: NonNull<Context>,
        to: NonNull<Context>,
    },
    /// Run `to`; the previous thread is gone.
    Jump { to: NonNull<Context> },
}

pub(crate) fn switch_threads(reason: SwitchReason) {
    let now = now_micros();
    let transfer = RUNTIME
        .with_some_mut(|rt| {
            let outcome = match rt.scheduler.switch(reason, now) {
                Ok(outcome) => outcome,
                Err(err) => fatal(&format!("cannot switch threads ({reason:?}): {err}")),
            };
            let SwitchOutcome::Switch { from, to } = outcome else {
                return Transfer::Stay;
            };
            if reason != SwitchReason::QuantumExpired {
                log::trace!(
                    "quantum {}: {from:?} -> {to} ({reason:?})",
                    rt.scheduler.total_quanta()
                );
            }
            let Some(to) = rt.scheduler.context_ptr(to) else {
                fatal("switch target has no context");
            };
            match from {
                None => Transfer::Jump { to },
                Some(from) => match rt.scheduler.context_ptr(from) {
                    Some(from) => Transfer::Swap { from, to },
                    None => fatal("switching thread has no context"),
                },
            }
        })
        .unwrap_or(Transfer::Stay);

    match transfer {
        Transfer::Stay => {}
        Transfer::Swap { from, to } => {
            // SAFETY: both threads are alive; the TCBs own the boxed contexts.
            unsafe { Context::switch(from.as_ptr(), to.as_ptr()) };
            // Back in this thread after another one switched to it.
            switched_in();
        }
        // SAFETY: as above; the abandoned stack is only retired, not freed.
        Transfer::Jump { to } => unsafe { Context::resume(to.as_ptr()) },
    }
}

/// First code a thread runs after it regains the processor.
fn switched_in() {
    RUNTIME.with_some_mut(|rt| rt.timer.arm());
}

/// Where every spawned thread starts.
pub(crate) extern "C" fn thread_entry() {
    let entry = {
        let _guard = InterruptGuard::mask();
        switched_in();
        RUNTIME
            .with_some_mut(|rt| rt.scheduler.take_entry())
            .flatten()
    };
    if let Some(entry) = entry {
        if let Err(message) = run_entry(entry) {
            fatal(&format!(
                "thread {} panicked: {message}",
                ops::current_tid()
            ));
        }
    }

    // Returning from the entry function ends the thread.
    let tid = ops::current_tid();
    if let Err(err) = ops::terminate(tid) {
        fatal(&format!("thread {tid} could not terminate: {err}"));
    }
    fatal("terminated thread kept running");
}

/// Runs a thread body, turning a panic into its message. Unwinding must not
/// cross the `extern "C"` frame at the bottom of the thread's stack.
fn run_entry(entry: Entry) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(entry)).map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
