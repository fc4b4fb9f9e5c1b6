//! relcache - release manifest cache
//!
//! Keeps a local, file-backed copy of per-project, per-channel package
//! manifests from a remote release service and optionally mirrors the
//! artifacts they reference.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fsutil;
pub mod generator;
pub mod manifest;
pub mod mirror;
pub mod paths;
pub mod store;
pub mod transport;
pub mod ui;

pub use catalog::{Catalog, Channel, Project, Scope};
pub use coordinator::{CacheCoordinator, CacheState, CacheStatus, UpdateReport};
pub use error::{RelcacheError, RelcacheResult};
pub use manifest::{Manifest, PackageDescriptor, Timestamp};
