/// A suspended computation that can later be resumed exactly where it left off.
///
/// Implementations hold whatever the platform needs (registers, stack pointer,
/// signal mask). Contexts are always boxed: some backends keep pointers into
/// their own storage, so a context must not move once it has been captured.
pub trait ExecutionContext {
    /// Slot for the execution that is already running on its own stack.
    ///
    /// Nothing is captured yet; the first `switch` away from it fills it in.
    fn current() -> Box<Self>;

    /// A context that starts running `entry` on `stack` with an empty signal mask.
    ///
    /// # Safety
    /// `stack` must stay allocated and untouched for as long as the returned
    /// context can be resumed. `entry` must never return.
    unsafe fn with_entry(stack: &mut [u8], entry: extern "C" fn()) -> Box<Self>;

    /// Captures the running execution into `from` and resumes `to`.
    ///
    /// Returns only when something later resumes `from`.
    ///
    /// # Safety
    /// Both pointers must refer to live contexts; `to` must have been captured
    /// or created with `with_entry`.
    unsafe fn switch(from: *mut Self, to: *const Self);

    /// Resumes `to`, abandoning the running execution.
    ///
    /// # Safety
    /// Same requirements on `to` as [`ExecutionContext::switch`].
    unsafe fn resume(to: *const Self) -> !;
}
