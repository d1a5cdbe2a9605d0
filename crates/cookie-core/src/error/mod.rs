//! Error types and result aliases for cookie operations.
//!
//! Provides a unified error type that covers every failure a package
//! resolution request can hit, grouped into coarse kinds so callers can
//! decide how to react without matching on every variant.

use thiserror::Error;

use crate::types::VersionError;

/// Unified error type for all cookie operations
#[derive(Error, Debug)]
pub enum CookieError {
    // Validation errors
    #[error("Field '{field}' is invalid: {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] VersionError),

    #[error("Failed to parse {path}: {message}")]
    JsonParse { path: String, message: String },

    // Registry errors
    #[error("Registry error: {message}")]
    Registry {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Resolution errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("No published version of '{name}' satisfies '{constraint}'")]
    NoMatchingVersion { name: String, constraint: String },

    // Install errors
    #[error("Failed to install {package}: {message}")]
    Install {
        package: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Integrity check failed for {package}: expected {expected}, got {actual}")]
    IntegrityFailure {
        package: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of a [`CookieError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request fields
    Validation,
    /// Transport failure talking to the registry
    Registry,
    /// Nothing published satisfies the request
    Resolution,
    /// Disk or download failure while installing
    Install,
}

/// Result type alias for cookie operations
pub type CookieResult<T> = Result<T, CookieError>;

impl CookieError {
    /// Create a validation error for a named field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a registry error from any error type
    pub fn registry<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Registry {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an install error from any error type
    pub fn install<E>(package: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Install {
            package: package.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CookieError::Validation { .. }
            | CookieError::InvalidVersion(_)
            | CookieError::JsonParse { .. } => ErrorKind::Validation,
            CookieError::Registry { .. } => ErrorKind::Registry,
            CookieError::PackageNotFound { .. } | CookieError::NoMatchingVersion { .. } => {
                ErrorKind::Resolution
            },
            CookieError::Install { .. }
            | CookieError::IntegrityFailure { .. }
            | CookieError::Io { .. } => ErrorKind::Install,
        }
    }

    /// Check if retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CookieError::Registry { .. } | CookieError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CookieError::PackageNotFound { .. } => {
                Some("Check the package name spelling or try the canonical registry")
            },
            CookieError::NoMatchingVersion { .. } => {
                Some("Loosen the version constraint or use 'latest'")
            },
            CookieError::Registry { .. } => Some("Check your internet connection and try again"),
            CookieError::IntegrityFailure { .. } => {
                Some("The downloaded archive is corrupt; retry or switch registries")
            },
            CookieError::Io { .. } => {
                Some("Check that the store directory is writable and the disk is not full")
            },
            _ => None,
        }
    }
}
