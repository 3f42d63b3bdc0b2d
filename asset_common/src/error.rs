//! Error types shared between the engine, server and client.
//!
//! The `AssetError` enum unifies common failure cases for I/O, JSON handling,
//! document persistence, HTTP transport, and channel communication, allowing crates to
//! propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum AssetError {
    /// I/O error originating from the standard library, sockets or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// The document store rejected a read or write; contains the store's message.
    #[error("{0}")]
    Store(String),

    /// A stored record with the given identifier or name does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP transport failure between client and server.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for AssetError {
    fn from(err: PoisonError<T>) -> Self {
        AssetError::MutexLock(err.to_string())
    }
}
