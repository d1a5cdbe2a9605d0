//! Tarball extraction for npm-compatible package archives

pub mod extract;

// Re-export main functions
pub use extract::extract_tarball;
