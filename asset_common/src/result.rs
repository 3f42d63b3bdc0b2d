//! Result type alias shared across the workspace.
//!
//! Defaults the error type to the common `AssetError`, so functions can simply
//! return `Result<T>`.
use crate::error::AssetError;

/// Workspace-wide `Result` alias with `AssetError` as the default error.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;
