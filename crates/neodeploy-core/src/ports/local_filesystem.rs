//! Local filesystem ports (driven/secondary ports)
//!
//! This module defines the interfaces for reading the local tree that is
//! about to be published: walking it into a flat listing, and hashing the
//! content of individual files.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - Hashing is a separate trait from walking so the diff use case can
//!   depend on hashing alone and tests can count hash calls.

use std::path::Path;

use crate::domain::{ContentHash, LocalFile};

/// Port trait for enumerating a local directory tree
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Walks `root` recursively and returns one record per entry
    ///
    /// # Arguments
    /// * `root` - Directory to walk
    /// * `extra_ignores` - Glob patterns matched against entry names, in
    ///   addition to the adapter's built-in ignore list. A matching
    ///   directory is skipped together with its contents.
    ///
    /// # Returns
    /// Files and directories below `root`, each with its path relative to
    /// `root`
    async fn list_files(&self, root: &Path, extra_ignores: &[String])
        -> anyhow::Result<Vec<LocalFile>>;
}

/// Port trait for computing content hashes of local files
#[async_trait::async_trait]
pub trait IContentHasher: Send + Sync {
    /// Streams the file at `path` and returns its SHA-1 digest
    ///
    /// # Errors
    /// Fails if the file cannot be opened or read
    async fn sha1(&self, path: &Path) -> anyhow::Result<ContentHash>;
}
