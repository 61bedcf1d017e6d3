//! Use cases (interactors) for neodeploy
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces.
//!
//! ## Use Cases
//!
//! - [`ContentIdentityResolver`] - Size-then-hash comparison of one file
//! - [`DiffSiteUseCase`] - Classification of a local tree against a site

pub mod diff_site;
pub mod identity;

pub use diff_site::{
    DiffContext, DiffFailure, DiffOptions, DiffSiteUseCase, ProtectedFilter,
    DEFAULT_MAX_CONCURRENT_HASHES,
};
pub use identity::ContentIdentityResolver;
