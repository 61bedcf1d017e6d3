//! Local filesystem adapters (secondary/driven adapters)
//!
//! Implements [`ILocalFileSystem`] and [`IContentHasher`] using `tokio::fs`.
//!
//! ## Design Decisions
//!
//! - **Ignore list**: OS litter and VCS metadata never reach the listing.
//!   A matching directory is pruned with everything below it.
//! - **Symlinks**: followed only when they point at a regular file.
//! - **SHA-1**: the digest the site API reports, streamed in 64 KiB reads so
//!   large files are never held in memory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use glob::Pattern;
use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, trace};

use neodeploy_core::domain::{ContentHash, DomainError, LocalFile};
use neodeploy_core::ports::{IContentHasher, ILocalFileSystem};

use crate::SyncError;

/// Entry names skipped by every walk
pub const ALWAYS_IGNORED: &[&str] = &[
    ".DS_Store",
    ".git",
    ".github",
    ".gitignore",
    ".gitkeep",
    "Thumbs.db",
    "desktop.ini",
    "node_modules",
];

/// Read size used while hashing
const HASH_BUFFER_SIZE: usize = 64 * 1024;

// ============================================================================
// LocalFileSystemAdapter
// ============================================================================

/// Adapter that walks the publish directory on the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn compile_ignores(patterns: &[String]) -> Result<Vec<Pattern>, SyncError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                SyncError::from(DomainError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.msg.to_string(),
                })
            })
        })
        .collect()
}

fn is_ignored(name: &str, extra: &[Pattern]) -> bool {
    ALWAYS_IGNORED.contains(&name) || extra.iter().any(|p| p.matches(name))
}

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self, extra_ignores), fields(root = %root.display()))]
    async fn list_files(
        &self,
        root: &Path,
        extra_ignores: &[String],
    ) -> anyhow::Result<Vec<LocalFile>> {
        let extra = compile_ignores(extra_ignores)?;

        let root_meta = match tokio::fs::metadata(root).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::PathNotFound(root.to_path_buf()).into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to stat {}", root.display())));
            }
        };
        if !root_meta.is_dir() {
            return Err(SyncError::NotADirectory(root.to_path_buf()).into());
        }

        let mut files = Vec::new();
        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("Failed to read directory {}", dir.display()))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .with_context(|| format!("Failed to read directory {}", dir.display()))?
            {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if is_ignored(&name, &extra) {
                    trace!(name = %name, "ignored");
                    continue;
                }

                let absolute_path = entry.path();
                let file_type = entry.file_type().await?;

                let (is_directory, size) = if file_type.is_dir() {
                    (true, 0)
                } else if file_type.is_file() {
                    (false, entry.metadata().await?.len())
                } else if file_type.is_symlink() {
                    match tokio::fs::metadata(&absolute_path).await {
                        Ok(target) if target.is_file() => (false, target.len()),
                        _ => {
                            debug!(path = %absolute_path.display(), "skipping symlink");
                            continue;
                        }
                    }
                } else {
                    continue;
                };

                let relative_path = absolute_path
                    .strip_prefix(root)
                    .with_context(|| {
                        format!("{} escaped the walk root", absolute_path.display())
                    })?
                    .to_path_buf();

                if is_directory {
                    pending.push(absolute_path.clone());
                }

                files.push(LocalFile {
                    relative_path,
                    absolute_path,
                    size,
                    is_directory,
                });
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(entries = files.len(), "walk complete");
        Ok(files)
    }
}

// ============================================================================
// Sha1Hasher
// ============================================================================

/// Streams files through SHA-1.
#[derive(Debug, Clone, Default)]
pub struct Sha1Hasher;

impl Sha1Hasher {
    /// Create a new `Sha1Hasher`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IContentHasher for Sha1Hasher {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn sha1(&self, path: &Path) -> anyhow::Result<ContentHash> {
        let mut file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        let hash = ContentHash::new(hex::encode(hasher.finalize()))?;
        trace!(hash = %hash, "hash computed");
        Ok(hash)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
