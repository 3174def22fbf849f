use core::ptr;

use foundation::fatal;

/// Periodic `ITIMER_VIRTUAL` timer firing [`crate::QUANTUM_SIGNAL`] once per quantum
/// of consumed CPU time.
#[derive(Clone, Copy)]
pub struct QuantumTimer {
    period: libc::itimerval,
}

impl QuantumTimer {
    pub fn new(quantum_usecs: u32) -> Self {
        let interval = libc::timeval {
            tv_sec: (quantum_usecs / 1_000_000) as libc::time_t,
            tv_usec: (quantum_usecs % 1_000_000) as libc::suseconds_t,
        };
        Self {
            period: libc::itimerval {
                it_interval: interval,
                it_value: interval,
            },
        }
    }

    /// Starts a fresh quantum now; later ones follow periodically.
    pub fn arm(&self) {
        set_timer(&self.period);
    }

    pub fn disarm(&self) {
        let zero = libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        set_timer(&libc::itimerval {
            it_interval: zero,
            it_value: zero,
        });
    }
}

fn set_timer(value: &libc::itimerval) {
    if unsafe { libc::setitimer(libc::ITIMER_VIRTUAL, value, ptr::null_mut()) } != 0 {
        fatal("failed to set the quantum timer");
    }
}
