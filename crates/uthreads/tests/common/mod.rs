#![allow(dead_code)]

use std::hint::spin_loop;
use std::time::{Duration, Instant};

/// Busy-waits until `done` holds. Burning CPU is what drives the virtual
/// timer, so blocking waits would stall the scheduler.
pub fn wait_until(what: &str, timeout: Duration, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + timeout;
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        spin_loop();
    }
}

pub fn spin_for(duration: Duration) {
    let end = Instant::now() + duration;
    while Instant::now() < end {
        spin_loop();
    }
}

pub fn park() -> ! {
    loop {
        spin_loop();
    }
}
