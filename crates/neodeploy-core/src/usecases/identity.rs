//! Content identity resolution
//!
//! Decides whether a local file is byte-identical to the remote file at the
//! same site path. Size is compared first; the file is only read when the
//! sizes agree.

use std::path::Path;
use std::sync::Arc;

use crate::domain::{ContentHash, DiffError};
use crate::ports::IContentHasher;

/// Compares a local file against a remote size and hash
pub struct ContentIdentityResolver {
    hasher: Arc<dyn IContentHasher + Send + Sync>,
}

impl ContentIdentityResolver {
    /// Creates a resolver backed by the given hasher
    pub fn new(hasher: Arc<dyn IContentHasher + Send + Sync>) -> Self {
        Self { hasher }
    }

    /// Returns true if the local file's content matches the remote record
    ///
    /// A size mismatch answers `false` without touching the file.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Read` if the local file cannot be hashed
    #[tracing::instrument(skip(self, local_path, remote_hash), fields(path = %local_path.display()))]
    pub async fn identical(
        &self,
        local_path: &Path,
        local_size: u64,
        remote_size: u64,
        remote_hash: &ContentHash,
    ) -> Result<bool, DiffError> {
        if local_size != remote_size {
            tracing::trace!(local_size, remote_size, "size mismatch");
            return Ok(false);
        }

        let local_hash = self
            .hasher
            .sha1(local_path)
            .await
            .map_err(|source| DiffError::Read {
                path: local_path.to_path_buf(),
                source,
            })?;

        Ok(&local_hash == remote_hash)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::ContentHash;
    use crate::ports::IContentHasher;

    /// Hasher double answering from a fixed table and counting calls
    #[derive(Default)]
    pub struct TableHasher {
        hashes: HashMap<PathBuf, ContentHash>,
        calls: AtomicUsize,
    }

    impl TableHasher {
        pub fn with(mut self, path: impl Into<PathBuf>, hash: &str) -> Self {
            self.hashes.insert(
                path.into(),
                ContentHash::new(hash.to_string()).unwrap(),
            );
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl IContentHasher for TableHasher {
        async fn sha1(&self, path: &Path) -> anyhow::Result<ContentHash> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.hashes
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("No such file or directory: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TableHasher;
    use super::*;

    const HASH_A: &str = "fd2ee41b1922a39a716cacb88c323d613b0955e4";
    const HASH_B: &str = "7f15617e87d83218223662340f4052d9bb9d096d";

    fn hash(s: &str) -> ContentHash {
        ContentHash::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_size_mismatch_skips_hashing() {
        let hasher = Arc::new(TableHasher::default().with("/site/a.png", HASH_A));
        let resolver = ContentIdentityResolver::new(hasher.clone());

        let same = resolver
            .identical(Path::new("/site/a.png"), 10, 11, &hash(HASH_A))
            .await
            .unwrap();

        assert!(!same);
        assert_eq!(hasher.calls(), 0);
    }

    #[tokio::test]
    async fn test_matching_hash_is_identical() {
        let hasher = Arc::new(TableHasher::default().with("/site/a.png", HASH_A));
        let resolver = ContentIdentityResolver::new(hasher.clone());

        let same = resolver
            .identical(Path::new("/site/a.png"), 10, 10, &hash(HASH_A))
            .await
            .unwrap();

        assert!(same);
        assert_eq!(hasher.calls(), 1);
    }

    #[tokio::test]
    async fn test_differing_hash_is_not_identical() {
        let hasher = Arc::new(TableHasher::default().with("/site/a.png", HASH_A));
        let resolver = ContentIdentityResolver::new(hasher);

        let same = resolver
            .identical(Path::new("/site/a.png"), 10, 10, &hash(HASH_B))
            .await
            .unwrap();

        assert!(!same);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_error() {
        let resolver = ContentIdentityResolver::new(Arc::new(TableHasher::default()));

        let err = resolver
            .identical(Path::new("/site/gone.png"), 10, 10, &hash(HASH_A))
            .await
            .unwrap_err();

        match err {
            DiffError::Read { path, .. } => assert_eq!(path, Path::new("/site/gone.png")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
