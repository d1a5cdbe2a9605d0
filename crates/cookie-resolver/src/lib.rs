//! Version resolution for the cookie CLI
//!
//! This crate picks the best published version of a package for a requested
//! constraint and reuses the same selection to check whether a newer
//! compatible release of the tool itself is available.

pub mod semver;
pub mod update;

// Re-export main types
pub use semver::{list_versions, select_best_version, select_for_constraint, SelectionMode, VersionSelector};
pub use update::{check_for_update, check_global_update, compare_versions, UpdateAdvisory, VersionComparison};

