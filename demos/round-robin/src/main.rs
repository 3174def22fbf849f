use std::hint::spin_loop;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context, Result};
use clap::Parser;

/// Spins up counting threads and reports how the quanta were shared.
#[derive(Parser, Debug)]
#[command(name = "round-robin", version, about)]
struct Cli {
    /// Quantum length in microseconds of process CPU time
    #[arg(long, default_value_t = uthreads::DEFAULT_QUANTUM_USECS)]
    quantum_usecs: i32,

    /// Number of worker threads to spawn
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Stop once this many quanta have started
    #[arg(long, default_value_t = 100)]
    quanta: u64,

    /// Have odd-numbered workers sleep this long before counting
    #[arg(long, env = "ROUND_ROBIN_SLEEP_USECS", default_value_t = 0)]
    sleep_usecs: u32,
}

static WORK: AtomicU64 = AtomicU64::new(0);

fn worker(nap_usecs: u32) -> impl FnOnce() + 'static {
    move || {
        if nap_usecs > 0 {
            if let Err(err) = uthreads::sleep(nap_usecs) {
                let tid = uthreads::current_tid();
                uthreads::critical(|| log::error!("worker {tid} could not sleep: {err}"));
            }
        }
        loop {
            WORK.fetch_add(1, Ordering::Relaxed);
            spin_loop();
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.threads >= uthreads::DEFAULT_MAX_THREADS {
        bail!(
            "at most {} worker threads fit next to the main thread",
            uthreads::DEFAULT_MAX_THREADS - 1
        );
    }
    uthreads::init(cli.quantum_usecs).context("initializing the thread library")?;

    let mut tids = Vec::with_capacity(cli.threads);
    for n in 0..cli.threads {
        let nap = if n % 2 == 1 { cli.sleep_usecs } else { 0 };
        let tid = uthreads::spawn(worker(nap))
            .with_context(|| format!("spawning worker {n}"))?;
        tids.push(tid);
    }
    uthreads::critical(|| {
        log::info!("spawned {} workers, waiting for {} quanta", tids.len(), cli.quanta)
    });

    while uthreads::total_quanta() < cli.quanta {
        spin_loop();
    }

    let report = uthreads::critical(|| {
        let total = uthreads::total_quanta();
        let rows = std::iter::once(uthreads::MAIN_TID)
            .chain(tids.iter().copied())
            .map(|tid| uthreads::quanta_of(tid).map(|quanta| (tid, quanta)))
            .collect::<uthreads::Result<Vec<_>>>();
        rows.map(|rows| (total, rows))
    });
    let (total, rows) = report.context("reading per-thread quanta")?;

    let summary = rows
        .iter()
        .map(|(tid, quanta)| format!("thread {tid:>3}: {quanta:>6} quanta\n"))
        .collect::<String>();
    uthreads::critical(|| {
        print!("{summary}");
        println!("total      : {total:>6} quanta");
        println!("work units : {}", WORK.load(Ordering::Relaxed));
    });
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        // Workers may already be running.
        uthreads::critical(|| eprintln!("Error: {err:#}"));
        std::process::exit(1);
    }
    // Ends every thread and the process.
    if let Err(err) = uthreads::terminate(uthreads::MAIN_TID) {
        uthreads::critical(|| eprintln!("Error: {err}"));
        std::process::exit(1);
    }
}
