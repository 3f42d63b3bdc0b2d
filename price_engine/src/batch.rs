//! Batch price update over every stored document.
//!
//! Each document is classified, walked, and written back on its own: a failed write is
//! recorded in that document's outcome and the run carries on with the next one. Only a
//! failure to list the store aborts the run.

use asset_common::report::{UpdateOutcome, UpdateReport};
use asset_common::{AssetType, DocumentStore, Result};
use log::{debug, error, info};

use crate::noise::UniformSource;
use crate::walker::TreeWalker;

/// Owns a store and a randomness source and runs full update passes over the store.
pub struct BatchUpdater<St, S> {
    store: St,
    source: S,
}

impl<St: DocumentStore, S: UniformSource> BatchUpdater<St, S> {
    pub fn new(store: St, source: S) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn into_store(self) -> St {
        self.store
    }

    /// Update every stored document once and report per-document outcomes.
    pub fn run(&mut self) -> Result<UpdateReport> {
        let assets = self.store.list_all()?;
        info!("Price update started for {} documents", assets.len());

        let mut updates = Vec::with_capacity(assets.len());
        for asset in assets {
            let kind = AssetType::resolve(&asset.name, &asset.data);
            let (data, stats) = {
                let mut walker = TreeWalker::new(&mut self.source, kind);
                let data = walker.update(&asset.data);
                (data, walker.stats())
            };
            debug!(
                "{} ({}) as {}: {} leaves updated, {} containers cleaned, {} trends flipped",
                asset.name, asset.id, kind, stats.leaves_updated, stats.containers_cleaned, stats.trends_flipped
            );

            match self.store.update(&asset.id, data) {
                Ok(()) => {
                    info!("Updated asset {} ({})", asset.name, asset.id);
                    updates.push(UpdateOutcome::success(&asset.name, &asset.id));
                }
                Err(e) => {
                    error!("Error updating asset {}: {}", asset.id, e);
                    updates.push(UpdateOutcome::error(&asset.name, &asset.id, e.to_string()));
                }
            }
        }

        let report = UpdateReport::new(updates);
        info!(
            "Price update completed: {} documents, {} failed",
            report.total,
            report.failures()
        );
        Ok(report)
    }
}
