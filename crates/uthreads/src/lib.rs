//! User-level threads, preemptively scheduled round-robin on the calling OS
//! thread.
//!
//! ```no_run
//! fn worker() {
//!     loop {
//!         // ...
//!     }
//! }
//!
//! uthreads::init(10_000).unwrap();
//! let tid = uthreads::spawn(worker).unwrap();
//! while uthreads::quanta_of(tid).unwrap() < 5 {}
//! uthreads::terminate(0).unwrap(); // ends the process
//! ```
//!
//! A virtual interval timer interrupts the running thread every quantum and
//! hands the processor to the next ready one. Only one thread ever executes at
//! a time. Code that must not be preempted halfway, for instance writing to a
//! standard stream that other threads also use, belongs inside [`critical`].

pub use scheduler_roundrobin::config::{
    DEFAULT_MAX_THREADS, DEFAULT_QUANTUM_USECS, DEFAULT_STACK_SIZE, MIN_STACK_SIZE,
};
pub use scheduler_roundrobin::ops::{
    block, critical, current_tid, init, init_with, live_threads, quanta_of, resume, sleep,
    spawn, status_of, terminate, total_quanta,
};
pub use scheduler_roundrobin::{
    Error, Result, SchedulerConfig, SchedulerConfigBuilder, ThreadState, ThreadStatus, Tid,
    MAIN_TID,
};
