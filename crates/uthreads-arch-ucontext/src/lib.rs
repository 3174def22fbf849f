//! Everything platform-specific lives here: register snapshots, the quantum
//! signal, the interval timer and the real-time clock.

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", target_env = "gnu"))] {
        pub mod clock;
        pub mod context;
        pub mod signal;
        pub mod timer;

        pub use clock::now_micros;
        pub use context::UContext;
        pub use signal::{ErrnoGuard, InterruptGuard, QUANTUM_SIGNAL};
        pub use timer::QuantumTimer;
    } else {
        compile_error!("uthreads-arch-ucontext supports linux-gnu targets only");
    }
}
