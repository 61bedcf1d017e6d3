//! Domain error types
//!
//! This module defines error types specific to domain operations:
//! validation failures on the boundary types, and the failures a site diff
//! can end in.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid site path format or content
    #[error("Invalid site path: {0}")]
    InvalidSitePath(String),

    /// Invalid content hash format (expected 40 hex characters)
    #[error("Invalid hash format: {0}")]
    InvalidHash(String),

    /// Invalid site name
    #[error("Invalid site name: {0}")]
    InvalidSiteName(String),

    /// Invalid glob pattern for protected files
    #[error("Invalid protect pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why the pattern was rejected
        reason: String,
    },
}

/// Which of the two listings a diff error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSide {
    Local,
    Remote,
}

impl fmt::Display for ListingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSide::Local => write!(f, "local"),
            ListingSide::Remote => write!(f, "remote"),
        }
    }
}

/// Errors that end a site diff
///
/// Every variant is fatal for the diff call that produced it; no partial
/// classification is returned alongside.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A local file could not be read while computing its content hash
    #[error("failed to read local file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A classified path has no record in the index it was derived from
    #[error("missing {side} record for {path}")]
    MissingRecord { side: ListingSide, path: String },

    /// The same normalized path appears twice in one listing
    #[error("duplicate {side} path {path}")]
    DuplicatePath { side: ListingSide, path: String },

    /// A remote file record lacks a field the comparison needs
    #[error("remote file {path} has no {field}")]
    MissingMetadata { path: String, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidSitePath("/bad".to_string());
        assert_eq!(err.to_string(), "Invalid site path: /bad");

        let err = DomainError::InvalidPattern {
            pattern: "[".to_string(),
            reason: "unclosed".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid protect pattern [: unclosed");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidHash("abc".to_string());
        let err2 = DomainError::InvalidHash("abc".to_string());
        let err3 = DomainError::InvalidHash("def".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn test_diff_error_display() {
        let err = DiffError::MissingRecord {
            side: ListingSide::Remote,
            path: "index.html".to_string(),
        };
        assert_eq!(err.to_string(), "missing remote record for index.html");

        let err = DiffError::DuplicatePath {
            side: ListingSide::Local,
            path: "a/b.css".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate local path a/b.css");
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = DiffError::Read {
            path: PathBuf::from("/tmp/missing.html"),
            source: anyhow::anyhow!("No such file or directory"),
        };
        assert_eq!(err.to_string(), "failed to read local file /tmp/missing.html");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("No such file or directory"));
    }
}
