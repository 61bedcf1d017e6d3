//! Domain entities and business logic
//!
//! This module contains the core domain types for neodeploy:
//! - Newtypes for validated site paths, hashes and names
//! - Remote and local listing records and the diff result
//! - The table of file types the host accepts
//! - Domain-specific error types

pub mod errors;
pub mod filetypes;
pub mod listing;
pub mod newtypes;

// Re-export commonly used types
pub use errors::{DiffError, DomainError, ListingSide};
pub use listing::{to_site_key, FileUpload, LocalFile, RemoteFile, SiteDiff};
pub use newtypes::*;
