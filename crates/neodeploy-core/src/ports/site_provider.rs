//! Site provider port (driven/secondary port)
//!
//! This module defines the interface for talking to the static-site host.
//! The implementation targets the Neocities HTTP API, but the engine only
//! sees the operations below.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - `upload_files` sends exactly one request. Splitting a large change set
//!   into batches is the caller's job.

use serde::{Deserialize, Serialize};

use crate::domain::{FileUpload, RemoteFile};

// ============================================================================
// DTOs
// ============================================================================

/// Public information about a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Site name (subdomain)
    pub sitename: String,
    /// Total hits
    #[serde(default)]
    pub hits: u64,
    /// Unique views, when the host reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    /// Creation date (RFC 2822)
    pub created_at: String,
    /// Last update date (RFC 2822), absent for never-updated sites
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Custom domain, if configured
    #[serde(default)]
    pub domain: Option<String>,
    /// Site tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Acknowledgement returned by mutating API calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    /// `"success"` on success
    pub result: String,
    /// Human-readable message
    pub message: String,
}

impl MessageResult {
    /// Returns true if the host reported success
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

// ============================================================================
// ISiteProvider trait
// ============================================================================

/// Port trait for site hosting operations
///
/// Every call is authenticated with the provider's configured credentials.
#[async_trait::async_trait]
pub trait ISiteProvider: Send + Sync {
    /// Lists every file and directory on the site
    ///
    /// # Returns
    /// The full flat listing, directories included
    async fn list_files(&self) -> anyhow::Result<Vec<RemoteFile>>;

    /// Uploads a set of files in a single request
    ///
    /// # Arguments
    /// * `files` - Destination names paired with the local files to send
    async fn upload_files(&self, files: &[FileUpload]) -> anyhow::Result<MessageResult>;

    /// Deletes files by their site path
    ///
    /// # Arguments
    /// * `names` - Root-relative site paths
    async fn delete_files(&self, names: &[String]) -> anyhow::Result<MessageResult>;

    /// Retrieves public information about a site
    ///
    /// # Arguments
    /// * `site_name` - Site to look up; `None` means the authenticated site
    async fn site_info(&self, site_name: Option<&str>) -> anyhow::Result<SiteInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_info_deserializes() {
        let json = r#"{
            "sitename": "youpi",
            "hits": 5072,
            "created_at": "Sat, 29 Jun 2013 10:11:38 +0000",
            "last_updated": "Tue, 23 Jul 2013 20:04:03 +0000",
            "domain": null,
            "tags": ["art", "music"]
        }"#;

        let info: SiteInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.sitename, "youpi");
        assert_eq!(info.hits, 5072);
        assert!(info.views.is_none());
        assert!(info.domain.is_none());
        assert_eq!(info.tags, vec!["art", "music"]);
    }

    #[test]
    fn test_message_result_success() {
        let ok: MessageResult = serde_json::from_str(
            r#"{"result": "success", "message": "file(s) have been deleted"}"#,
        )
        .unwrap();
        assert!(ok.is_success());

        let err = MessageResult {
            result: "error".to_string(),
            message: "nope".to_string(),
        };
        assert!(!err.is_success());
    }
}
