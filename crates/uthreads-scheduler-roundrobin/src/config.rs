use derive_builder::Builder;

use crate::error::{Error, Result};

pub const DEFAULT_QUANTUM_USECS: i32 = 10_000;
pub const DEFAULT_MAX_THREADS: usize = 100;
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Process-wide scheduler settings, fixed at init.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct SchedulerConfig {
    /// Length of a quantum in microseconds of consumed CPU time.
    pub quantum_usecs: i32,
    /// Maximum number of concurrently live threads, the main thread included.
    pub max_threads: usize,
    /// Bytes of stack given to every spawned thread.
    pub stack_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum_usecs: DEFAULT_QUANTUM_USECS,
            max_threads: DEFAULT_MAX_THREADS,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl SchedulerConfig {
    pub fn with_quantum(quantum_usecs: i32) -> Self {
        Self {
            quantum_usecs,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quantum_usecs <= 0 {
            return Err(Error::InvalidQuantum(self.quantum_usecs));
        }
        if self.max_threads == 0 {
            return Err(Error::ZeroThreadLimit);
        }
        if self.stack_size < MIN_STACK_SIZE {
            return Err(Error::StackTooSmall {
                size: self.stack_size,
                min: MIN_STACK_SIZE,
            });
        }
        Ok(())
    }
}
