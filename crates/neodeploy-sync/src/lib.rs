//! neodeploy sync - Local tree adapters and the deploy engine
//!
//! Provides:
//! - A walker that flattens the publish directory into a listing
//! - Streaming SHA-1 hashing of local files
//! - Preview and deploy orchestration over the site provider port
//!
//! ## Modules
//!
//! - [`engine`] - Deploy engine: diff, batched uploads, cleanup
//! - [`filesystem`] - Local filesystem adapter and SHA-1 hasher

pub mod engine;
pub mod filesystem;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the local tree
#[derive(Debug, Error)]
pub enum SyncError {
    /// The specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The publish root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A domain-level error propagated from neodeploy-core
    #[error("Domain error: {0}")]
    DomainError(#[from] neodeploy_core::domain::DomainError),
}
