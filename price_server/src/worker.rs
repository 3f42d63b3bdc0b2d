//! Update worker and its job queue.
//!
//! The `UpdateWorker` runs a background thread that owns the `BatchUpdater` (and through
//! it the document store). Every other thread talks to the store by sending a `Job` on
//! the channel returned by `UpdateWorker::start`, so update runs and reads never overlap.
//!
//! Job model:
//! - `Job::RunUpdate` — run one batch; the report goes back on `reply` when one is given
//!   (manual triggers) and is only logged otherwise (scheduled runs).
//! - `Job::ListAssets` / `Job::GetAsset` — read-only snapshots for the asset endpoints.
//! - `Job::Shutdown` — stop the worker thread.
//!
//! Replies are best-effort: if the requester has gone away the result is dropped.

use asset_common::report::UpdateReport;
use asset_common::{DocumentStore, Result, StoredAsset};
use crossbeam_channel::{Sender, unbounded};
use log::{error, info, warn};
use price_engine::{BatchUpdater, UniformSource};
use std::thread::{self, JoinHandle};

/// Message accepted by the worker thread.
pub enum Job {
    /// Run one full price update.
    RunUpdate {
        /// Where to send the report, if anyone is waiting.
        reply: Option<Sender<Result<UpdateReport>>>,
    },
    /// Snapshot of every stored record.
    ListAssets {
        /// Reply channel.
        reply: Sender<Result<Vec<StoredAsset>>>,
    },
    /// One stored record by collection name.
    GetAsset {
        /// Collection name.
        name: String,
        /// Reply channel.
        reply: Sender<Result<StoredAsset>>,
    },
    /// Stop the worker.
    Shutdown,
}

/// Background owner of the batch updater.
pub struct UpdateWorker;

impl UpdateWorker {
    /// Start the worker thread and return its job queue and handle.
    pub fn start<St, S>(mut updater: BatchUpdater<St, S>) -> (Sender<Job>, JoinHandle<()>)
    where
        St: DocumentStore + Send + 'static,
        S: UniformSource + Send + 'static,
    {
        let (job_tx, job_rx) = unbounded::<Job>();

        let handle = thread::spawn(move || {
            info!("Update worker started (Thread ID: {:?})", thread::current().id());

            for job in job_rx.iter() {
                match job {
                    Job::RunUpdate { reply } => {
                        let result = updater.run();
                        match reply {
                            Some(reply) => {
                                if reply.send(result).is_err() {
                                    warn!("Update finished but the requester is gone");
                                }
                            }
                            None => {
                                if let Err(e) = result {
                                    error!("Scheduled price update failed: {}", e);
                                }
                            }
                        }
                    }
                    Job::ListAssets { reply } => {
                        let _ = reply.send(updater.store().list_all());
                    }
                    Job::GetAsset { name, reply } => {
                        let _ = reply.send(updater.store().find_by_name(&name));
                    }
                    Job::Shutdown => break,
                }
            }
            info!("Update worker stopping...");
        });
        (job_tx, handle)
    }
}
