//! Platform-neutral pieces shared by the uthreads crates.

mod arch;
mod fatal;
pub mod utils;

pub use arch::ExecutionContext;
pub use fatal::fatal;

/// Microseconds, used both for real-time instants and for durations.
pub type Micros = u64;
