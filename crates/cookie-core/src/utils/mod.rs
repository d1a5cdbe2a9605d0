//! Utility functions and helpers.
//!
//! Common functionality used across multiple cookie crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{normalize_path, to_file_url};
