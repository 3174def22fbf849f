//! The quantum signal and the critical sections built on masking it.

use core::mem::{self, MaybeUninit};
use core::ptr;

use foundation::fatal;
use libc::c_int;

/// Delivered by the virtual interval timer at each quantum boundary.
pub const QUANTUM_SIGNAL: c_int = libc::SIGVTALRM;

fn quantum_sigset() -> libc::sigset_t {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        if libc::sigemptyset(set.as_mut_ptr()) != 0
            || libc::sigaddset(set.as_mut_ptr(), QUANTUM_SIGNAL) != 0
        {
            fatal("failed to build the quantum signal set");
        }
        set.assume_init()
    }
}

/// Installs `handler` for [`QUANTUM_SIGNAL`]. The signal stays masked while
/// the handler runs.
pub fn install_handler(handler: extern "C" fn(c_int)) {
    unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_mask = quantum_sigset();
        action.sa_flags = libc::SA_RESTART;
        if libc::sigaction(QUANTUM_SIGNAL, &action, ptr::null_mut()) != 0 {
            fatal("failed to install the quantum signal handler");
        }
    }
}

/// Critical section: the quantum signal is masked until the guard drops, at
/// which point the mask in effect before the guard is restored.
///
/// Guards nest. A guard may be held across a context switch; the execution
/// that created it drops it once it is resumed.
#[must_use = "the signal is unmasked again as soon as the guard is dropped"]
pub struct InterruptGuard {
    previous: libc::sigset_t,
}

impl InterruptGuard {
    pub fn mask() -> Self {
        let set = quantum_sigset();
        let mut previous = MaybeUninit::<libc::sigset_t>::uninit();
        let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &set, previous.as_mut_ptr()) };
        if rc != 0 {
            fatal("failed to mask the quantum signal");
        }
        Self {
            previous: unsafe { previous.assume_init() },
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, &self.previous, ptr::null_mut()) };
        if rc != 0 {
            fatal("failed to unmask the quantum signal");
        }
    }
}

/// Saves `errno` and puts it back on drop, so a signal handler does not leak
/// its own failures into the code it interrupted.
pub struct ErrnoGuard(c_int);

impl ErrnoGuard {
    pub fn save() -> Self {
        Self(unsafe { *libc::__errno_location() })
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        unsafe { *libc::__errno_location() = self.0 };
    }
}
