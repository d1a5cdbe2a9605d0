//! Core data types for cookie package resolution.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Version types for semantic versioning
//! - Package descriptors and installed package records

pub mod package;
pub mod version;

// Re-export all public types
pub use package::{install_dir_name, parse_install_dir_name, InstalledPackage, PackageDescriptor};
pub use version::{Version, VersionConstraint, VersionError};
