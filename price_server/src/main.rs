//! Asset price update server.
//!
//! This binary keeps a JSON document store of asset collections and moves their simulated
//! prices forward on demand or on a schedule. Internally, it wires together four parts:
//!
//! - `UpdateWorker` — owns the `BatchUpdater` (store + randomness source) and executes
//!   `Job`s sent over a `crossbeam_channel` queue, one at a time.
//! - `TriggerListener` — accepts TCP connections on a tokio runtime and serves the axum
//!   routes (update trigger or asset reads) over bounded HTTP/1 connections; handlers
//!   forward every request to the worker.
//! - Scheduler — a ticker thread queueing `Job::RunUpdate` every `--interval-secs`.
//! - Ctrl+C handler — stops the scheduler and the worker, then exits.
//!
//! With `--once` the server skips all of the above, runs a single update, prints the
//! report as JSON, and exits; this suits an external cron.
#![warn(missing_docs)]
use crate::args::Args;
use crate::listener::TriggerListener;
use crate::routes::{AppState, router};
use crate::scheduler::start_scheduler;
use crate::worker::{Job, UpdateWorker};
use asset_common::AssetError;
use asset_common::Result;
use asset_common::net::addr;
use asset_common::store::JsonFileStore;
use clap::Parser;
use crossbeam_channel::unbounded;
use log::{info, warn};
use price_engine::{BatchUpdater, SeededSource, ThreadRngSource, UniformSource};
use std::time::Duration;

mod args;
mod listener;
mod routes;
mod scheduler;
mod worker;

fn main() -> Result<(), AssetError> {
    init_logger();
    let args = Args::parse();

    let store = JsonFileStore::open(&args.store)?;
    info!("Using asset store {}", store.path().display());
    let source: Box<dyn UniformSource + Send> = match args.seed {
        Some(seed) => {
            info!("Seeded price paths (seed {})", seed);
            Box::new(SeededSource::new(seed))
        }
        None => Box::new(ThreadRngSource),
    };
    let mut updater = BatchUpdater::new(store, source);

    if args.once {
        let report = updater.run()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.cron_secret.is_none() {
        warn!("CRON_SECRET is not set; update triggers are accepted without authorization");
    }

    let (job_tx, worker_handle) = UpdateWorker::start(updater);
    let (stop_tx, stop_rx) = unbounded::<()>();

    let scheduler_handle = (args.interval_secs > 0).then(|| {
        start_scheduler(
            Duration::from_secs(args.interval_secs),
            job_tx.clone(),
            stop_rx.clone(),
        )
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let listener = runtime.block_on(TriggerListener::bind(
        &addr(&args.bind_ip, args.port),
        args.limits(),
    ))?;
    let app = router(AppState::new(args.cron_secret.clone(), job_tx.clone()));
    runtime.spawn(listener.serve(app));

    let (interrupt_tx, interrupt_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down server...");
        let _ = interrupt_tx.send(());
    })
    .map_err(|e| AssetError::Io(std::io::Error::other(e)))?;

    info!("Server is running. Press Ctrl+C to exit.");
    interrupt_rx
        .recv()
        .map_err(|e| AssetError::ChannelRecv(e.to_string()))?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    drop(stop_tx);
    if let Some(handle) = scheduler_handle {
        let _ = handle.join();
    }
    job_tx
        .send(Job::Shutdown)
        .map_err(|e| AssetError::ChannelSend(e.to_string()))?;
    let _ = worker_handle.join();
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
