//! npm registry client for the cookie CLI
//!
//! This crate fetches package metadata and tarballs from an npm-compatible
//! registry. Two registries are known: the community mirror used by default
//! and the canonical upstream, which callers pick explicitly per client.

pub mod api;
pub mod client;
pub mod integrity;

// Re-export main types
pub use api::{DistInfo, RegistryMetadata, VersionManifest};
pub use client::{default_registry, RegistryClient, RegistryKind, DEFAULT_TIMEOUT};

use cookie_core::error::CookieError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, CookieError>;
