use thiserror::Error;

use crate::thread::Tid;

/// Usage errors reported by the thread library.
///
/// None of these change scheduler state; the caller may carry on. Failures of
/// the environment itself (signals, timer, clock) are not represented here:
/// they terminate the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("quantum length must be positive, got {0} microseconds")]
    InvalidQuantum(i32),

    #[error("thread limit must be at least one")]
    ZeroThreadLimit,

    #[error("stack size of {size} bytes is below the minimum of {min} bytes")]
    StackTooSmall { size: usize, min: usize },

    #[error("thread library is already initialized")]
    AlreadyInitialized,

    #[error("thread library is not initialized")]
    NotInitialized,

    #[error("cannot exceed the limit of {max} concurrent threads")]
    TooManyThreads { max: usize },

    #[error("thread id {tid} is outside [0, {max})")]
    TidOutOfRange { tid: Tid, max: usize },

    #[error("no thread with id {0}")]
    NoSuchThread(Tid),

    #[error("the main thread cannot be blocked")]
    BlockMainThread,

    #[error("the main thread cannot sleep")]
    MainThreadSleep,

    /// The running thread asked to leave while nothing else can run.
    #[error("no thread is ready to run")]
    NoRunnableThread,
}

pub type Result<T> = core::result::Result<T, Error>;
