//! File listings and the diff result
//!
//! The two listing record types have deliberately different shapes: the
//! remote side knows sizes and hashes but nothing about local paths, the
//! local side knows paths and sizes but must be read to learn its hash.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{ContentHash, SitePath};

/// One entry of the remote site listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Root-relative, slash-separated path on the site
    pub path: SitePath,
    /// Whether this entry is a directory
    pub is_directory: bool,
    /// Size in bytes (absent for directories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// SHA-1 of the content (absent for directories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1_hash: Option<ContentHash>,
    /// Last update as reported by the API (RFC 2822)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RemoteFile {
    /// Creates a file record
    pub fn file(path: SitePath, size: u64, sha1_hash: ContentHash) -> Self {
        Self {
            path,
            is_directory: false,
            size: Some(size),
            sha1_hash: Some(sha1_hash),
            updated_at: None,
        }
    }

    /// Creates a directory record
    pub fn directory(path: SitePath) -> Self {
        Self {
            path,
            is_directory: true,
            size: None,
            sha1_hash: None,
            updated_at: None,
        }
    }

    /// Parsed `updated_at`, if present and well-formed
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One entry produced by walking the local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path relative to the walk root, with OS-native separators
    pub relative_path: PathBuf,
    /// Absolute path used to read the file
    pub absolute_path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Whether this entry is a directory
    pub is_directory: bool,
}

impl LocalFile {
    /// The relative path in forward-slash form, the join key against the
    /// remote listing
    pub fn site_key(&self) -> String {
        to_site_key(&self.relative_path)
    }
}

/// Renders a relative path with `/` separators regardless of platform
pub fn to_site_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// A file queued for upload
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileUpload {
    /// Destination path on the site
    pub name: String,
    /// Local file to read the bytes from
    pub path: PathBuf,
}

/// Outcome of comparing a local tree against the remote site
///
/// All lists are sorted by path. `files_to_upload` may be reordered by the
/// caller afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDiff {
    /// Local files that are new or differ from the remote copy
    pub files_to_upload: Vec<FileUpload>,
    /// Remote files absent locally and not protected
    pub files_to_delete: Vec<String>,
    /// Files identical on both sides
    pub files_skipped: Vec<String>,
    /// Remote files matched by the protection filter
    pub protected_files: Vec<String>,
    /// Local files whose extension the host does not accept
    pub unsupported_files: Vec<String>,
}

impl SiteDiff {
    /// True when neither uploads nor deletions are pending
    pub fn is_noop(&self) -> bool {
        self.files_to_upload.is_empty() && self.files_to_delete.is_empty()
    }
}
