mod common;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use common::{park, spin_for, wait_until};
use uthreads::{Error, ThreadState, ThreadStatus, MAIN_TID};

const NAP_USECS: u32 = 100_000;
const SHORT_NAP_USECS: u32 = 30_000;

static SLEPT_MICROS: AtomicU64 = AtomicU64::new(0);
static WOKE: AtomicBool = AtomicBool::new(false);
static SHORT_NAP_OVER: AtomicBool = AtomicBool::new(false);

fn sleeper() {
    let started = Instant::now();
    uthreads::sleep(NAP_USECS).expect("sleep from a spawned thread");
    SLEPT_MICROS.store(started.elapsed().as_micros() as u64, Ordering::SeqCst);
    WOKE.store(true, Ordering::SeqCst);
    park();
}

fn short_sleeper() {
    uthreads::sleep(SHORT_NAP_USECS).expect("sleep from a spawned thread");
    SHORT_NAP_OVER.store(true, Ordering::SeqCst);
    park();
}

fn is_sleeping(tid: uthreads::Tid) -> bool {
    uthreads::status_of(tid).is_ok_and(ThreadStatus::is_sleeping)
}

fn main() {
    uthreads::init(1_000).expect("init");

    let quanta = uthreads::total_quanta();
    assert_eq!(uthreads::sleep(10), Err(Error::MainThreadSleep));
    assert_eq!(uthreads::status_of(MAIN_TID), Ok(ThreadStatus::Running));
    assert_eq!(uthreads::live_threads(), 1);
    assert!(uthreads::total_quanta() - quanta <= 1);

    let tid = uthreads::spawn(sleeper).expect("spawn sleeper");
    wait_until("the sleeper to fall asleep", Duration::from_secs(5), || {
        is_sleeping(tid)
    });
    let asleep_quanta = uthreads::quanta_of(tid).expect("sleeper is alive");
    assert_eq!(
        uthreads::status_of(tid).map(ThreadStatus::state),
        Ok(ThreadState::Ready)
    );

    spin_for(Duration::from_millis(50));
    assert!(!WOKE.load(Ordering::SeqCst), "woke up before its wake time");
    assert!(is_sleeping(tid));
    assert_eq!(uthreads::quanta_of(tid), Ok(asleep_quanta), "ran while asleep");

    wait_until("the sleeper to wake", Duration::from_secs(5), || {
        WOKE.load(Ordering::SeqCst)
    });
    assert!(SLEPT_MICROS.load(Ordering::SeqCst) >= u64::from(NAP_USECS));
    assert!(uthreads::quanta_of(tid).expect("sleeper is alive") > asleep_quanta);
    uthreads::terminate(tid).expect("terminate sleeper");

    // A sleeper blocked in the meantime wakes into the blocked set.
    let tid = uthreads::spawn(short_sleeper).expect("spawn short sleeper");
    wait_until("the short sleeper to fall asleep", Duration::from_secs(5), || {
        is_sleeping(tid)
    });
    uthreads::block(tid).expect("block a sleeper");
    let status = uthreads::status_of(tid).expect("short sleeper is alive");
    assert!(status.is_sleeping());
    assert_eq!(status.state(), ThreadState::Blocked);

    wait_until("the wake time to pass", Duration::from_secs(5), || {
        uthreads::status_of(tid) == Ok(ThreadStatus::Blocked)
    });
    spin_for(Duration::from_millis(10));
    assert!(!SHORT_NAP_OVER.load(Ordering::SeqCst), "ran while blocked");

    uthreads::resume(tid).expect("resume");
    wait_until("the resumed thread to run", Duration::from_secs(5), || {
        SHORT_NAP_OVER.load(Ordering::SeqCst)
    });

    uthreads::terminate(MAIN_TID).expect("terminate main");
    unreachable!("terminating the main thread returned");
}
