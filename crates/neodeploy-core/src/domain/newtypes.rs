//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for the values that cross the
//! boundary between the site API and the diff engine. Each newtype ensures
//! data validity at construction time, so a malformed listing fails fast
//! instead of producing a silently wrong diff.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A root-relative path on the hosted site
///
/// SitePath ensures the path is:
/// - Non-empty and relative (no leading `/`)
/// - Slash-separated with no empty segments
/// - Free of `.` and `..` segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SitePath(String);

impl SitePath {
    /// Create a new SitePath
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSitePath` if the path is empty, absolute,
    /// or contains empty, `.` or `..` segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidSitePath(
                "Site path cannot be empty".to_string(),
            ));
        }

        if path.starts_with('/') {
            return Err(DomainError::InvalidSitePath(format!(
                "Site path must be relative to the site root: {path}"
            )));
        }

        if path.contains('\\') {
            return Err(DomainError::InvalidSitePath(format!(
                "Site path must use forward slashes: {path}"
            )));
        }

        if path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(DomainError::InvalidSitePath(format!(
                "Site path contains an invalid segment: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SitePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SitePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for SitePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SitePath> for String {
    fn from(path: SitePath) -> Self {
        path.0
    }
}

// ============================================================================
// Hash types
// ============================================================================

/// SHA-1 content hash in lowercase hexadecimal
///
/// This is the digest the site API reports for every file.
/// Format: 40 hex characters. Upper-case input is folded to lower case so
/// that comparisons are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of a hex-encoded SHA-1 digest
    const HEX_LEN: usize = 40;

    /// Create a new ContentHash
    ///
    /// # Errors
    /// Returns error if the hash is not 40 hexadecimal characters
    pub fn new(hash: String) -> Result<Self, DomainError> {
        if hash.len() != Self::HEX_LEN {
            return Err(DomainError::InvalidHash(format!(
                "Hash has wrong length: expected {} characters, got {}",
                Self::HEX_LEN,
                hash.len()
            )));
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidHash(format!(
                "Hash is not hexadecimal: {hash}"
            )));
        }

        Ok(Self(hash.to_ascii_lowercase()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

// ============================================================================
// Site identity
// ============================================================================

/// Name of a hosted site (the subdomain it is served from)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteName(String);

impl SiteName {
    /// Create a new SiteName
    ///
    /// # Errors
    /// Returns error if the name is empty or contains characters other than
    /// ASCII alphanumerics, `-` and `_`
    pub fn new(name: String) -> Result<Self, DomainError> {
        let name = name.trim().to_string();

        if name.is_empty() {
            return Err(DomainError::InvalidSiteName(
                "Site name cannot be empty".to_string(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidSiteName(format!(
                "Site name contains invalid characters: {name}"
            )));
        }

        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SiteName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for SiteName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SiteName> for String {
    fn from(name: SiteName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------
    // SitePath
    // ------------------------------------------------------------------

    #[test]
    fn test_site_path_valid() {
        let path = SitePath::new("a-folder/foo.html".to_string()).unwrap();
        assert_eq!(path.as_str(), "a-folder/foo.html");
        assert_eq!(path.to_string(), "a-folder/foo.html");
    }

    #[test]
    fn test_site_path_rejects_absolute() {
        assert!(SitePath::new("/index.html".to_string()).is_err());
    }

    #[test]
    fn test_site_path_rejects_empty_and_traversal() {
        assert!(SitePath::new(String::new()).is_err());
        assert!(SitePath::new("a//b".to_string()).is_err());
        assert!(SitePath::new("a/../b".to_string()).is_err());
        assert!(SitePath::new("./a".to_string()).is_err());
        assert!(SitePath::new("a\\b".to_string()).is_err());
    }

    #[test]
    fn test_site_path_allows_dots_inside_names() {
        assert!(SitePath::new("..hidden/x".to_string()).is_ok());
        assert!(SitePath::new(".well-known/security.txt".to_string()).is_ok());
    }

    #[test]
    fn test_site_path_serde_validates() {
        let ok: Result<SitePath, _> = serde_json::from_str(r#""img/cat.png""#);
        assert!(ok.is_ok());

        let bad: Result<SitePath, _> = serde_json::from_str(r#""/img/cat.png""#);
        assert!(bad.is_err());
    }

    // ------------------------------------------------------------------
    // ContentHash
    // ------------------------------------------------------------------

    #[test]
    fn test_content_hash_valid() {
        let hash = ContentHash::new("fd2ee41b1922a39a716cacb88c323d613b0955e4".to_string());
        assert!(hash.is_ok());
    }

    #[test]
    fn test_content_hash_lowercases() {
        let upper = ContentHash::new("FD2EE41B1922A39A716CACB88C323D613B0955E4".to_string())
            .unwrap();
        let lower = ContentHash::new("fd2ee41b1922a39a716cacb88c323d613b0955e4".to_string())
            .unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_content_hash_rejects_wrong_length() {
        assert!(ContentHash::new("abc123".to_string()).is_err());
    }

    #[test]
    fn test_content_hash_rejects_non_hex() {
        let result = ContentHash::new("zz2ee41b1922a39a716cacb88c323d613b0955e4".to_string());
        assert!(matches!(result, Err(DomainError::InvalidHash(_))));
    }

    // ------------------------------------------------------------------
    // SiteName
    // ------------------------------------------------------------------

    #[test]
    fn test_site_name_trims_and_validates() {
        let name = SiteName::new("  my-site ".to_string()).unwrap();
        assert_eq!(name.as_str(), "my-site");

        assert!(SiteName::new(String::new()).is_err());
        assert!(SiteName::new("bad name".to_string()).is_err());
        assert!(SiteName::new("bad.name".to_string()).is_err());
    }
}
