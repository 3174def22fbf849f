use spin::{Mutex, MutexGuard};

/// A process-wide optional value.
///
/// Every access goes through a non-blocking lock. Finding it already taken
/// means the slot was entered twice on the same execution stream (for example
/// from a signal handler that interrupted a holder), which is reported as a
/// fatal error instead of spinning forever.
pub struct GlobalOption<T> {
    slot: Mutex<Option<T>>,
}

// SAFETY: the value is only reached from the OS thread that owns the
// scheduler, and always with the quantum interrupt masked.
unsafe impl<T> Sync for GlobalOption<T> {}

impl<T> GlobalOption<T> {
    pub const fn none() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stores `value`, returning the previous one.
    pub fn set(&self, value: T) -> Option<T> {
        self.lock().replace(value)
    }

    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    pub fn is_some(&self) -> bool {
        self.lock().is_some()
    }

    #[inline(always)]
    pub fn with_some_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        match self.slot.try_lock() {
            Some(guard) => guard,
            None => crate::fatal("global slot re-entered while in use"),
        }
    }
}
