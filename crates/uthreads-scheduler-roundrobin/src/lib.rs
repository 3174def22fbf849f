pub mod config;
pub mod context;
pub mod error;
pub mod ops;
pub mod scheduler;
pub mod sleep;
pub mod stack;
mod switch;
pub mod thread;

pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use context::Context;
pub use error::{Error, Result};
pub use scheduler::{Next, Scheduler, SwitchOutcome, SwitchReason};
pub use thread::{ThreadControlBlock, ThreadState, ThreadStatus, Tid, MAIN_TID};
