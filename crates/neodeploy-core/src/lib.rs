//! neodeploy core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `SitePath`, `ContentHash`, `RemoteFile`, `LocalFile`, `SiteDiff`
//! - **Use cases** - `DiffSiteUseCase`, `ContentIdentityResolver`
//! - **Port definitions** - Traits for adapters: `ISiteProvider`, `ILocalFileSystem`, `IContentHasher`
//! - **Configuration** - the project's `neodeploy.yaml`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module holds plain data and validation.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain types through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
