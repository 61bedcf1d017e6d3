//! Deploy engine
//!
//! The [`DeployEngine`] publishes a local directory to a site through the
//! [`ISiteProvider`] port.
//!
//! ## Deploy Flow
//!
//! 1. **Preview**: walk the local tree and list the site concurrently, then
//!    run the site diff and apply the caller's upload order
//! 2. **Upload**: send `files_to_upload` in batches, one request per batch
//! 3. **Cleanup**: when enabled, delete `files_to_delete` in one request
//!
//! Failures in steps 2 and 3 are collected into the [`DeployReport`]; a
//! failed batch does not stop the following ones. Failures in step 1 abort
//! the call.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use neodeploy_core::config::DeployConfig;
use neodeploy_core::domain::{DomainError, FileUpload, SiteDiff};
use neodeploy_core::ports::{IContentHasher, ILocalFileSystem, ISiteProvider, MessageResult};
use neodeploy_core::usecases::{
    DiffOptions, DiffSiteUseCase, ProtectedFilter, DEFAULT_MAX_CONCURRENT_HASHES,
};

/// Default number of files sent per upload request
pub const DEFAULT_UPLOAD_BATCH_SIZE: usize = 20;

/// Comparator applied to `files_to_upload` before uploading
pub type UploadSort = Arc<dyn Fn(&FileUpload, &FileUpload) -> Ordering + Send + Sync>;

// ============================================================================
// DeployOptions
// ============================================================================

/// Options for a single preview or deploy
#[derive(Clone)]
pub struct DeployOptions {
    /// Local directory to publish
    pub directory: PathBuf,
    /// Delete remote files that no longer exist locally
    pub cleanup: bool,
    /// Upload files of any type (supporter accounts)
    pub include_unsupported: bool,
    /// Remote paths that must never be deleted
    pub protected_filter: ProtectedFilter,
    /// Optional upload order
    pub upload_sort: Option<UploadSort>,
    /// Files per upload request
    pub upload_batch_size: usize,
    /// Upper bound on concurrent hash computations
    pub max_concurrent_hashes: usize,
    /// Extra glob patterns skipped by the walk
    pub extra_ignores: Vec<String>,
}

impl DeployOptions {
    /// Options with defaults for publishing `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cleanup: false,
            include_unsupported: false,
            protected_filter: ProtectedFilter::none(),
            upload_sort: None,
            upload_batch_size: DEFAULT_UPLOAD_BATCH_SIZE,
            max_concurrent_hashes: DEFAULT_MAX_CONCURRENT_HASHES,
            extra_ignores: Vec::new(),
        }
    }

    /// Builds options from the `deploy` config section
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPattern` if a `protect` glob is malformed
    pub fn from_config(config: &DeployConfig) -> Result<Self, DomainError> {
        Ok(Self {
            directory: config.src.clone(),
            cleanup: config.cleanup,
            include_unsupported: config.supporter,
            protected_filter: ProtectedFilter::from_globs(&config.protect)?,
            upload_sort: None,
            upload_batch_size: config.upload_batch_size,
            max_concurrent_hashes: config.max_concurrent_hashes,
            extra_ignores: config.ignore.clone(),
        })
    }

    fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            protected_filter: self.protected_filter.clone(),
            include_unsupported: self.include_unsupported,
            max_concurrent_hashes: self.max_concurrent_hashes,
        }
    }
}

impl fmt::Debug for DeployOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployOptions")
            .field("directory", &self.directory)
            .field("cleanup", &self.cleanup)
            .field("include_unsupported", &self.include_unsupported)
            .field("protected_filter", &self.protected_filter)
            .field("upload_sort", &self.upload_sort.as_ref().map(|_| ".."))
            .field("upload_batch_size", &self.upload_batch_size)
            .field("max_concurrent_hashes", &self.max_concurrent_hashes)
            .field("extra_ignores", &self.extra_ignores)
            .finish()
    }
}

// ============================================================================
// DeployReport
// ============================================================================

/// One acknowledged request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeployResult {
    /// An upload batch
    Upload {
        files: Vec<String>,
        body: MessageResult,
    },
    /// The cleanup request
    Delete {
        files: Vec<String>,
        body: MessageResult,
    },
}

impl DeployResult {
    /// The API acknowledgement
    pub fn body(&self) -> &MessageResult {
        match self {
            DeployResult::Upload { body, .. } | DeployResult::Delete { body, .. } => body,
        }
    }
}

/// Summary of a completed deploy
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    /// Successful requests, in the order they were sent
    pub results: Vec<DeployResult>,
    /// Failed requests (non-fatal)
    pub errors: Vec<String>,
    /// The change set the deploy worked from
    pub diff: SiteDiff,
    /// Wall-clock duration of the deploy
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl DeployReport {
    /// Returns true if every request succeeded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// DeployEngine
// ============================================================================

/// Orchestrates preview and deploy over the ports
pub struct DeployEngine {
    provider: Arc<dyn ISiteProvider + Send + Sync>,
    local_fs: Arc<dyn ILocalFileSystem + Send + Sync>,
    diff: DiffSiteUseCase,
}

impl DeployEngine {
    /// Creates a new engine
    pub fn new(
        provider: Arc<dyn ISiteProvider + Send + Sync>,
        local_fs: Arc<dyn ILocalFileSystem + Send + Sync>,
        hasher: Arc<dyn IContentHasher + Send + Sync>,
    ) -> Self {
        Self {
            provider,
            local_fs,
            diff: DiffSiteUseCase::new(hasher),
        }
    }

    /// Computes the change set without modifying the site
    ///
    /// # Errors
    /// Fails if the walk, the remote listing or the diff fails. A diff
    /// failure is returned as a [`DiffFailure`](neodeploy_core::usecases::DiffFailure)
    /// inside the `anyhow::Error`.
    #[instrument(skip(self, options), fields(directory = %options.directory.display()))]
    pub async fn preview(&self, options: &DeployOptions) -> Result<SiteDiff> {
        let (local, remote) = tokio::try_join!(
            async {
                self.local_fs
                    .list_files(&options.directory, &options.extra_ignores)
                    .await
                    .with_context(|| {
                        format!("Failed to walk {}", options.directory.display())
                    })
            },
            async {
                self.provider
                    .list_files()
                    .await
                    .context("Failed to list remote files")
            },
        )?;
        debug!(local = local.len(), remote = remote.len(), "listings loaded");

        let mut diff = self
            .diff
            .execute(&remote, &local, &options.diff_options())
            .await?;

        if let Some(sort) = &options.upload_sort {
            diff.files_to_upload.sort_by(|a, b| sort(a, b));
        }

        Ok(diff)
    }

    /// Publishes the directory
    ///
    /// # Errors
    /// Only preview failures are returned as `Err`; request failures are
    /// reported in [`DeployReport::errors`].
    #[instrument(skip(self, options), fields(directory = %options.directory.display()))]
    pub async fn deploy(&self, options: &DeployOptions) -> Result<DeployReport> {
        let started = Instant::now();
        let diff = self.preview(options).await?;

        let cleanup_pending = options.cleanup && !diff.files_to_delete.is_empty();
        if diff.files_to_upload.is_empty() && !cleanup_pending {
            info!("Site is up to date");
            return Ok(DeployReport {
                results: Vec::new(),
                errors: Vec::new(),
                diff,
                duration: started.elapsed(),
            });
        }

        let mut results = Vec::new();
        let mut errors = Vec::new();

        let batch_size = options.upload_batch_size.max(1);
        let batches = diff.files_to_upload.chunks(batch_size);
        let batch_count = batches.len();
        for (index, batch) in batches.enumerate() {
            let files: Vec<String> = batch.iter().map(|f| f.name.clone()).collect();
            debug!(batch = index + 1, of = batch_count, files = files.len(), "uploading");

            match self.provider.upload_files(batch).await {
                Ok(body) if body.is_success() => {
                    results.push(DeployResult::Upload { files, body });
                }
                Ok(body) => {
                    warn!(batch = index + 1, message = %body.message, "upload rejected");
                    errors.push(format!(
                        "upload batch {}/{} rejected: {}",
                        index + 1,
                        batch_count,
                        body.message
                    ));
                }
                Err(e) => {
                    warn!(batch = index + 1, error = %e, "upload failed");
                    errors.push(format!(
                        "upload batch {}/{} failed: {:#}",
                        index + 1,
                        batch_count,
                        e
                    ));
                }
            }
        }

        if cleanup_pending {
            let files = diff.files_to_delete.clone();
            match self.provider.delete_files(&files).await {
                Ok(body) if body.is_success() => {
                    results.push(DeployResult::Delete { files, body });
                }
                Ok(body) => {
                    warn!(message = %body.message, "cleanup rejected");
                    errors.push(format!("cleanup rejected: {}", body.message));
                }
                Err(e) => {
                    warn!(error = %e, "cleanup failed");
                    errors.push(format!("cleanup failed: {e:#}"));
                }
            }
        }

        let duration = started.elapsed();
        info!(
            requests = results.len(),
            errors = errors.len(),
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "Deploy finished"
        );

        Ok(DeployReport {
            results,
            errors,
            diff,
            duration,
        })
    }
}

// ============================================================================
// Unit tests
// ============================================================================
