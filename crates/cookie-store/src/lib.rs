//! Path-addressable package store for the cookie CLI
//!
//! Installed packages live at `<store_dir>/<name>@<version>`. Installs are
//! staged under `<store_dir>/.tmp` and published with a single rename, so a
//! package directory is either absent or complete.

pub mod store;
pub mod tarball;

// Re-export main types
pub use store::{PackageStore, UpdateOutcome};
pub use tarball::extract_tarball;

use cookie_core::error::CookieError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, CookieError>;
