use core::mem;

use foundation::{fatal, ExecutionContext};

/// Execution context backed by glibc's `ucontext_t`.
///
/// glibc stores a pointer to the floating-point save area inside the struct
/// itself, which is why contexts only ever exist behind a `Box`.
#[repr(transparent)]
pub struct UContext(libc::ucontext_t);

impl ExecutionContext for UContext {
    fn current() -> Box<Self> {
        // SAFETY: all-zero is a valid bit pattern for `ucontext_t`.
        Box::new(Self(unsafe { mem::zeroed() }))
    }

    unsafe fn with_entry(stack: &mut [u8], entry: extern "C" fn()) -> Box<Self> {
        let mut ctx = Self::current();
        if libc::getcontext(&mut ctx.0) != 0 {
            fatal("getcontext failed");
        }
        ctx.0.uc_stack.ss_sp = stack.as_mut_ptr().cast();
        ctx.0.uc_stack.ss_size = stack.len();
        ctx.0.uc_stack.ss_flags = 0;
        ctx.0.uc_link = core::ptr::null_mut();
        if libc::sigemptyset(&mut ctx.0.uc_sigmask) != 0 {
            fatal("sigemptyset failed");
        }
        libc::makecontext(&mut ctx.0, entry, 0);
        ctx
    }

    unsafe fn switch(from: *mut Self, to: *const Self) {
        if libc::swapcontext(from.cast(), to.cast()) != 0 {
            fatal("swapcontext failed");
        }
    }

    unsafe fn resume(to: *const Self) -> ! {
        libc::setcontext(to.cast());
        fatal("setcontext failed")
    }
}
