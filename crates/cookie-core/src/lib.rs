//! # cookie-core
//!
//! Core types and utilities shared across all cookie crates.
//!
//! This crate provides:
//! - Version and VersionConstraint types with semver precedence
//! - PackageDescriptor and InstalledPackage types for package resolution
//! - CookieError enum for unified error handling
//! - Path helpers for normalizing and URL-converting entry files
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, PackageDescriptor, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{CookieError, CookieResult, ErrorKind};
pub use types::{InstalledPackage, PackageDescriptor, Version, VersionConstraint};
