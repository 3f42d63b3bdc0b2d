//!
//! Common types and utilities shared by the price engine, server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `AssetError` used across the workspace.
//! - `result` — handy `Result<T, AssetError>` alias.
//! - `profile` — asset types, volatility profiles and collection name classification.
//! - `store` — the document store collaborator and its file/memory implementations.
//! - `report` — per-document outcomes and the aggregate update report.
//! - `net` — networking constants and small helpers.
#![deny(missing_docs)]
pub mod error;
pub mod result;
pub mod profile;
pub mod store;
pub mod report;
pub mod net;

pub use error::AssetError;
pub use result::Result;
pub use profile::{AssetType, VolatilityProfile};
pub use store::{AssetId, DocumentStore, StoredAsset};
