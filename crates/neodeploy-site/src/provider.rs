//! SiteProvider - ISiteProvider implementation for the hosting API
//!
//! Wraps the [`SiteClient`] to fulfil the [`ISiteProvider`] port contract.
//! Typed [`SiteError`](crate::SiteError)s are carried inside the returned
//! `anyhow::Error` so callers can still downcast them.

use anyhow::{Context, Result};
use tracing::debug;

use neodeploy_core::domain::{FileUpload, RemoteFile};
use neodeploy_core::ports::{ISiteProvider, MessageResult, SiteInfo};

use crate::client::SiteClient;

/// Site provider backed by the HTTP API
pub struct SiteProvider {
    client: SiteClient,
}

impl SiteProvider {
    /// Creates a provider around an authenticated client
    pub fn new(client: SiteClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ISiteProvider for SiteProvider {
    /// Lists the whole site
    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        debug!("SiteProvider::list_files");
        self.client
            .list_files(None)
            .await
            .context("Failed to list site files")
    }

    /// Uploads one batch of files
    async fn upload_files(&self, files: &[FileUpload]) -> Result<MessageResult> {
        debug!(files = files.len(), "SiteProvider::upload_files");
        self.client
            .upload_files(files)
            .await
            .with_context(|| format!("Failed to upload {} files", files.len()))
    }

    /// Deletes files by site path
    async fn delete_files(&self, names: &[String]) -> Result<MessageResult> {
        debug!(files = names.len(), "SiteProvider::delete_files");
        self.client
            .delete_files(names)
            .await
            .with_context(|| format!("Failed to delete {} files", names.len()))
    }

    /// Retrieves site info
    async fn site_info(&self, site_name: Option<&str>) -> Result<SiteInfo> {
        debug!(?site_name, "SiteProvider::site_info");
        self.client
            .site_info(site_name)
            .await
            .context("Failed to fetch site info")
    }
}
