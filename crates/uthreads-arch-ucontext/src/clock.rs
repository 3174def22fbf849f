use core::ptr;

use foundation::{fatal, Micros};

/// Wall-clock time in microseconds since the Unix epoch.
pub fn now_micros() -> Micros {
    let mut now = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    if unsafe { libc::gettimeofday(&mut now, ptr::null_mut()) } != 0 {
        fatal("failed to read the real-time clock");
    }
    now.tv_sec as Micros * 1_000_000 + now.tv_usec as Micros
}
