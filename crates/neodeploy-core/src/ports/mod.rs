//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ISiteProvider`] - Remote site operations (listing, upload, delete, info)
//! - [`ILocalFileSystem`] - Walking the local publish directory
//! - [`IContentHasher`] - SHA-1 hashing of local files

pub mod local_filesystem;
pub mod site_provider;

pub use local_filesystem::{IContentHasher, ILocalFileSystem};
pub use site_provider::{ISiteProvider, MessageResult, SiteInfo};
