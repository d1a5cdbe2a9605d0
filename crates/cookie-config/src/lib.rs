//! Configuration and package entry resolution for the cookie CLI
//!
//! This crate reads package manifests, locates a package's loadable entry
//! file, and layers user configuration from defaults, the config file,
//! environment variables and command-line flags into one [`CliConfig`].

pub mod entry;
pub mod json;
pub mod merge;

// Re-export main types
pub use entry::{resolve_entry, resolve_entry_from, resolve_root};
pub use json::PackageJson;
pub use merge::{CliConfig, CliOverrides, ConfigLayering, FileConfig};

use cookie_core::error::CookieError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, CookieError>;
