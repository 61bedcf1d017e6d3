//! neodeploy site - HTTP client for the site hosting API
//!
//! Provides async client for:
//! - API key retrieval with site credentials
//! - Listing site files with their sizes and SHA-1 hashes
//! - Multipart uploads and batch deletes
//! - Public site info
//!
//! ## Modules
//!
//! - [`auth`] - API key storage in the system keyring
//! - [`client`] - Typed HTTP client for the `/api/*` endpoints
//! - [`provider`] - [`ISiteProvider`](neodeploy_core::ports::ISiteProvider) adapter

pub mod auth;
pub mod client;
pub mod provider;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the site API
#[derive(Debug, Error)]
pub enum SiteError {
    /// The API answered with a status above 299
    #[error("{context} failed with HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// What was being attempted, e.g. `"GET /api/list"`
        context: String,
        /// The API's error message, or the raw body when it has none
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The configured API base URL cannot be used
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A local file queued for upload could not be opened
    #[error("Failed to open {path} for upload")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API response could not be parsed or reported failure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A call that needs an API key was made without one
    #[error("No API key configured")]
    MissingApiKey,
}

impl SiteError {
    /// HTTP status code, if this error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            SiteError::Http { status, .. } => Some(*status),
            SiteError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the host rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = SiteError::Http {
            status: 400,
            context: "POST /api/upload".to_string(),
            body: "invalid_file_type: needle.mp3 is not a valid file type".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "POST /api/upload failed with HTTP 400: invalid_file_type: needle.mp3 is not a valid file type"
        );
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = SiteError::Http {
            status: 403,
            context: "GET /api/key".to_string(),
            body: "invalid_auth".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!SiteError::MissingApiKey.is_unauthorized());
    }
}
