//! Process-wide entry points. Each one runs with the quantum signal masked.

use core::mem;

use arch_ucontext::{now_micros, signal, ErrnoGuard, InterruptGuard, QuantumTimer};
use foundation::utils::GlobalOption;
use libc::c_int;

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::scheduler::{Next, Scheduler, SwitchReason};
use crate::switch::{switch_threads, thread_entry};
use crate::thread::{ThreadStatus, Tid, MAIN_TID};

pub(crate) static RUNTIME: GlobalOption<Runtime> = GlobalOption::none();

pub(crate) struct Runtime {
    pub(crate) scheduler: Scheduler,
    pub(crate) timer: QuantumTimer,
}

/// Initializes the library with a quantum of `quantum_usecs` microseconds and
/// default limits. The caller becomes thread 0.
pub fn init(quantum_usecs: i32) -> Result<()> {
    init_with(SchedulerConfig::with_quantum(quantum_usecs))
}

pub fn init_with(config: SchedulerConfig) -> Result<()> {
    let _guard = InterruptGuard::mask();
    reported(start(config))
}

fn start(config: SchedulerConfig) -> Result<()> {
    config.validate()?;
    if RUNTIME.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let timer = QuantumTimer::new(config.quantum_usecs.unsigned_abs());
    signal::install_handler(on_quantum_expired);
    RUNTIME.set(Runtime {
        scheduler: Scheduler::new(&config, thread_entry),
        timer,
    });
    timer.arm();
    log::debug!(
        "initialized: quantum {}us, up to {} threads, {} byte stacks",
        config.quantum_usecs,
        config.max_threads,
        config.stack_size
    );
    Ok(())
}

/// Creates a thread running `entry` and appends it to the ready queue.
///
/// Returning from `entry` terminates the thread. A panic in `entry` is a
/// fatal error: it is reported and the process exits with status 1.
pub fn spawn<F>(entry: F) -> Result<Tid>
where
    F: FnOnce() + 'static,
{
    let _guard = InterruptGuard::mask();
    reported(with_runtime(|rt| rt.scheduler.spawn(Box::new(entry))))
}

/// Terminates `tid`.
///
/// Does not return when `tid` is the caller. Terminating the main thread
/// releases everything and exits the process with status 0.
pub fn terminate(tid: Tid) -> Result<()> {
    let _guard = InterruptGuard::mask();
    let next = reported(with_runtime(|rt| rt.scheduler.terminate(tid)))?;
    proceed(next);
    Ok(())
}

/// Blocks `tid` until it is resumed. Blocking the caller switches away
/// immediately; blocking a blocked thread does nothing.
pub fn block(tid: Tid) -> Result<()> {
    let _guard = InterruptGuard::mask();
    let next = reported(with_runtime(|rt| rt.scheduler.block(tid)))?;
    proceed(next);
    Ok(())
}

/// Makes a blocked `tid` ready again. Anything else is left as it is.
pub fn resume(tid: Tid) -> Result<()> {
    let _guard = InterruptGuard::mask();
    let next = reported(with_runtime(|rt| rt.scheduler.resume(tid)))?;
    proceed(next);
    Ok(())
}

/// Suspends the calling thread for at least `usecs` microseconds of real
/// time. Not allowed on the main thread.
pub fn sleep(usecs: u32) -> Result<()> {
    let _guard = InterruptGuard::mask();
    let now = now_micros();
    let next = reported(with_runtime(|rt| rt.scheduler.sleep(usecs, now)))?;
    proceed(next);
    Ok(())
}

/// Id of the calling thread; 0 before init.
pub fn current_tid() -> Tid {
    let _guard = InterruptGuard::mask();
    RUNTIME
        .with_some_mut(|rt| rt.scheduler.current_tid())
        .unwrap_or(MAIN_TID)
}

/// Quanta started since init, the current one included; 0 before init.
pub fn total_quanta() -> u64 {
    let _guard = InterruptGuard::mask();
    RUNTIME
        .with_some_mut(|rt| rt.scheduler.total_quanta())
        .unwrap_or(0)
}

/// Quanta `tid` has spent running, the current one included.
pub fn quanta_of(tid: Tid) -> Result<u64> {
    let _guard = InterruptGuard::mask();
    reported(with_runtime(|rt| rt.scheduler.quanta_of(tid)))
}

pub fn status_of(tid: Tid) -> Result<ThreadStatus> {
    let _guard = InterruptGuard::mask();
    reported(with_runtime(|rt| rt.scheduler.status_of(tid)))
}

pub fn live_threads() -> usize {
    let _guard = InterruptGuard::mask();
    RUNTIME
        .with_some_mut(|rt| rt.scheduler.live_threads())
        .unwrap_or(0)
}

/// Runs `f` without being preempted.
pub fn critical<R>(f: impl FnOnce() -> R) -> R {
    let _guard = InterruptGuard::mask();
    f()
}

extern "C" fn on_quantum_expired(_signum: c_int) {
    let _errno = ErrnoGuard::save();
    let _guard = InterruptGuard::mask();
    if RUNTIME.is_some() {
        switch_threads(SwitchReason::QuantumExpired);
    }
}

fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> Result<R>) -> Result<R> {
    RUNTIME
        .with_some_mut(f)
        .unwrap_or(Err(Error::NotInitialized))
}

fn reported<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        log::warn!("thread library error: {err}");
    }
    result
}

fn proceed(next: Next) {
    match next {
        Next::Return => {}
        Next::Switch(reason) => switch_threads(reason),
        Next::ExitProcess => shutdown(),
    }
}

fn shutdown() -> ! {
    if let Some(runtime) = RUNTIME.take() {
        runtime.timer.disarm();
        if let Some(stack) = runtime.scheduler.teardown() {
            // Still executing on it.
            mem::forget(stack);
        }
    }
    log::debug!("main thread terminated, exiting");
    std::process::exit(0)
}
