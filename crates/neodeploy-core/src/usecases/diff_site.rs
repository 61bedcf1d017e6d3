//! Site diff use case
//!
//! Classifies every file of a local tree and a remote site listing into
//! uploads, deletions, skips, protected files and unsupported files.
//!
//! ## Algorithm
//!
//! 1. Drop directories from both listings and index each by its
//!    forward-slash path (`R` remote, `L` local)
//! 2. `U`: local paths whose extension the host does not accept
//! 3. `P`: remote paths matched by the protection filter
//! 4. `L'`: `L` in supporter mode, `L - U` otherwise
//! 5. Upload `L' - R`, delete `(R - L') - P`
//! 6. For `L' ∩ R`, ask the identity resolver; differing files join the
//!    uploads, identical ones are skipped
//!
//! Steps 1-5 are plain set algebra. Step 6 hashes files concurrently with
//! a fixed upper bound and fails on the first read error.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use thiserror::Error;

use crate::domain::filetypes;
use crate::domain::{DiffError, DomainError, FileUpload, ListingSide, LocalFile, RemoteFile, SiteDiff};
use crate::ports::IContentHasher;

use super::identity::ContentIdentityResolver;

/// Default number of files hashed at the same time
pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 8;

// ============================================================================
// Options
// ============================================================================

/// Predicate deciding which remote paths must never be deleted
#[derive(Clone)]
pub struct ProtectedFilter(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl ProtectedFilter {
    /// A filter that protects nothing
    pub fn none() -> Self {
        Self(Arc::new(|_| false))
    }

    /// Wraps an arbitrary predicate over site paths
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Protects every path matched by at least one glob
    ///
    /// `*` and `?` never cross a `/`, and a leading dot must be matched
    /// literally.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPattern` for the first malformed glob
    pub fn from_globs(patterns: &[String]) -> Result<Self, DomainError> {
        if patterns.is_empty() {
            return Ok(Self::none());
        }

        let compiled = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| DomainError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        Ok(Self::from_fn(move |path| {
            compiled.iter().any(|p| p.matches_with(path, options))
        }))
    }

    /// Returns true if `path` is protected
    pub fn is_protected(&self, path: &str) -> bool {
        (self.0)(path)
    }
}

impl Default for ProtectedFilter {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for ProtectedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProtectedFilter(..)")
    }
}

/// Knobs for a single diff
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Remote paths that are reported as protected instead of deleted
    pub protected_filter: ProtectedFilter,
    /// Consider files of any type for upload (supporter accounts)
    pub include_unsupported: bool,
    /// Upper bound on concurrent hash computations
    pub max_concurrent_hashes: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            protected_filter: ProtectedFilter::none(),
            include_unsupported: false,
            max_concurrent_hashes: DEFAULT_MAX_CONCURRENT_HASHES,
        }
    }
}

// ============================================================================
// Failure reporting
// ============================================================================

/// What a diff had discovered by the time it failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffContext {
    pub remote_files: usize,
    pub local_files: usize,
    pub unsupported_files: Vec<String>,
    pub protected_files: Vec<String>,
    pub new_files: Vec<String>,
    pub orphaned_files: Vec<String>,
}

/// A failed diff together with its partial context
#[derive(Debug, Error)]
#[error("site diff failed: {error}")]
pub struct DiffFailure {
    #[source]
    pub error: DiffError,
    pub context: DiffContext,
}

// ============================================================================
// Use case
// ============================================================================

/// Use case computing the change set between a local tree and a site
pub struct DiffSiteUseCase {
    resolver: ContentIdentityResolver,
}

impl DiffSiteUseCase {
    /// Creates the use case with the hasher used for overlap comparisons
    pub fn new(hasher: Arc<dyn IContentHasher + Send + Sync>) -> Self {
        Self {
            resolver: ContentIdentityResolver::new(hasher),
        }
    }

    /// Computes the diff between `remote` and `local`
    ///
    /// Every list in the result is sorted by path.
    ///
    /// # Errors
    ///
    /// Returns a `DiffFailure` if a listing contains a duplicate path, a
    /// remote file lacks its size, or an overlapping local file cannot be
    /// read. No partial diff is returned.
    #[tracing::instrument(skip_all, fields(remote = remote.len(), local = local.len()))]
    pub async fn execute(
        &self,
        remote: &[RemoteFile],
        local: &[LocalFile],
        options: &DiffOptions,
    ) -> Result<SiteDiff, DiffFailure> {
        let mut context = DiffContext::default();
        match self.classify(remote, local, options, &mut context).await {
            Ok(diff) => {
                tracing::debug!(
                    upload = diff.files_to_upload.len(),
                    delete = diff.files_to_delete.len(),
                    skip = diff.files_skipped.len(),
                    protected = diff.protected_files.len(),
                    unsupported = diff.unsupported_files.len(),
                    "site diff complete"
                );
                Ok(diff)
            }
            Err(error) => {
                tracing::warn!(error = %error, "site diff failed");
                Err(DiffFailure { error, context })
            }
        }
    }

    async fn classify(
        &self,
        remote: &[RemoteFile],
        local: &[LocalFile],
        options: &DiffOptions,
        context: &mut DiffContext,
    ) -> Result<SiteDiff, DiffError> {
        let remote_index = index_remote(remote)?;
        let local_index = index_local(local)?;
        context.remote_files = remote_index.len();
        context.local_files = local_index.len();

        let remote_paths: BTreeSet<&str> = remote_index.keys().copied().collect();
        let local_paths: BTreeSet<&str> = local_index.keys().map(String::as_str).collect();

        let unsupported: BTreeSet<&str> = local_paths
            .iter()
            .copied()
            .filter(|p| !filetypes::is_supported(p))
            .collect();
        context.unsupported_files = to_owned_vec(&unsupported);

        let protected: BTreeSet<&str> = remote_paths
            .iter()
            .copied()
            .filter(|p| options.protected_filter.is_protected(p))
            .collect();
        context.protected_files = to_owned_vec(&protected);

        let working: BTreeSet<&str> = if options.include_unsupported {
            local_paths.clone()
        } else {
            local_paths.difference(&unsupported).copied().collect()
        };

        let mut to_upload: BTreeSet<&str> = working.difference(&remote_paths).copied().collect();
        context.new_files = to_owned_vec(&to_upload);

        let to_delete: BTreeSet<&str> = remote_paths
            .difference(&working)
            .copied()
            .filter(|p| !protected.contains(p))
            .collect();
        context.orphaned_files = to_owned_vec(&to_delete);

        let mut candidates = Vec::new();
        for path in working.intersection(&remote_paths).copied() {
            let local_file = lookup_local(&local_index, path)?;
            let remote_file = lookup_remote(&remote_index, path)?;
            let remote_size = remote_file.size.ok_or_else(|| DiffError::MissingMetadata {
                path: path.to_string(),
                field: "size",
            })?;
            let remote_hash = remote_file.sha1_hash.as_ref().ok_or_else(|| {
                DiffError::MissingMetadata {
                    path: path.to_string(),
                    field: "sha1_hash",
                }
            })?;
            candidates.push((path, local_file, remote_size, remote_hash));
        }

        let resolver = &self.resolver;
        let verdicts: Vec<(&str, bool)> = stream::iter(candidates)
            .map(|(path, local_file, remote_size, remote_hash)| async move {
                let same = resolver
                    .identical(
                        &local_file.absolute_path,
                        local_file.size,
                        remote_size,
                        remote_hash,
                    )
                    .await?;
                Ok::<_, DiffError>((path, same))
            })
            .buffer_unordered(options.max_concurrent_hashes.max(1))
            .try_collect()
            .await?;

        let mut skipped = BTreeSet::new();
        for (path, same) in verdicts {
            if same {
                skipped.insert(path);
            } else {
                to_upload.insert(path);
            }
        }

        let files_to_upload = to_upload
            .iter()
            .map(|p| {
                lookup_local(&local_index, p).map(|file| FileUpload {
                    name: file.site_key(),
                    path: file.absolute_path.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SiteDiff {
            files_to_upload,
            files_to_delete: remote_paths_of(&remote_index, &to_delete)?,
            files_skipped: remote_paths_of(&remote_index, &skipped)?,
            protected_files: remote_paths_of(&remote_index, &protected)?,
            unsupported_files: unsupported
                .iter()
                .map(|p| {
                    lookup_local(&local_index, p)
                        .map(|file| file.relative_path.to_string_lossy().into_owned())
                })
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

// ----------------------------------------------------------------------------
// Indexing helpers
// ----------------------------------------------------------------------------

fn index_remote(remote: &[RemoteFile]) -> Result<HashMap<&str, &RemoteFile>, DiffError> {
    let mut index = HashMap::with_capacity(remote.len());
    for file in remote.iter().filter(|f| !f.is_directory) {
        if index.insert(file.path.as_str(), file).is_some() {
            return Err(DiffError::DuplicatePath {
                side: ListingSide::Remote,
                path: file.path.to_string(),
            });
        }
    }
    Ok(index)
}

fn index_local(local: &[LocalFile]) -> Result<HashMap<String, &LocalFile>, DiffError> {
    let mut index = HashMap::with_capacity(local.len());
    for file in local.iter().filter(|f| !f.is_directory) {
        let key = file.site_key();
        if index.contains_key(&key) {
            return Err(DiffError::DuplicatePath {
                side: ListingSide::Local,
                path: key,
            });
        }
        index.insert(key, file);
    }
    Ok(index)
}

fn lookup_local<'a>(
    index: &HashMap<String, &'a LocalFile>,
    path: &str,
) -> Result<&'a LocalFile, DiffError> {
    index.get(path).copied().ok_or_else(|| DiffError::MissingRecord {
        side: ListingSide::Local,
        path: path.to_string(),
    })
}

fn lookup_remote<'a>(
    index: &HashMap<&str, &'a RemoteFile>,
    path: &str,
) -> Result<&'a RemoteFile, DiffError> {
    index.get(path).copied().ok_or_else(|| DiffError::MissingRecord {
        side: ListingSide::Remote,
        path: path.to_string(),
    })
}

fn remote_paths_of(
    index: &HashMap<&str, &RemoteFile>,
    paths: &BTreeSet<&str>,
) -> Result<Vec<String>, DiffError> {
    paths
        .iter()
        .map(|p| lookup_remote(index, p).map(|file| file.path.to_string()))
        .collect()
}

fn to_owned_vec(paths: &BTreeSet<&str>) -> Vec<String> {
    paths.iter().map(|p| (*p).to_string()).collect()
}
