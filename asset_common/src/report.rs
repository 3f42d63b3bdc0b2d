//! Per-document outcomes and the aggregate report returned by a price update run.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::store::AssetId;

/// Message attached to every successfully persisted document.
pub const SUCCESS_MESSAGE: &str = "Collection or Asset updated successfully";
/// Top-level message of a finished run.
pub const COMPLETED_MESSAGE: &str = "Price update completed";

/// Whether a document was persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpdateStatus {
    /// The updated document was written back.
    Success,
    /// The store rejected the write; see the outcome message.
    Error,
}

/// Result of processing one stored document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateOutcome {
    /// Collection name of the document.
    pub name: String,
    /// Store identifier of the document.
    pub id: AssetId,
    /// Whether the write succeeded.
    pub status: UpdateStatus,
    /// Fixed success text, or the store's error message.
    pub message: String,
}

impl UpdateOutcome {
    /// Outcome of a document that was written back.
    pub fn success(name: &str, id: &AssetId) -> Self {
        Self {
            name: name.to_string(),
            id: id.clone(),
            status: UpdateStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Outcome of a document whose write failed with `message`.
    pub fn error(name: &str, id: &AssetId, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            id: id.clone(),
            status: UpdateStatus::Error,
            message: message.into(),
        }
    }
}

/// Aggregate result of one run over every stored document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateReport {
    /// Always `COMPLETED_MESSAGE`.
    pub message: String,
    /// Number of documents processed.
    pub total: usize,
    /// One outcome per document, in store order.
    pub updates: Vec<UpdateOutcome>,
}

impl UpdateReport {
    /// Wrap the outcomes of a finished run.
    pub fn new(updates: Vec<UpdateOutcome>) -> Self {
        Self {
            message: COMPLETED_MESSAGE.to_string(),
            total: updates.len(),
            updates,
        }
    }

    /// Number of documents that failed to persist.
    pub fn failures(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| u.status == UpdateStatus::Error)
            .count()
    }
}

/// JSON body of an error response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorBody {
    /// Body carrying `error`.
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
