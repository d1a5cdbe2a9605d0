//! Package request and installation types.
//!
//! Defines the descriptor a caller hands to the store and the record of a
//! package once it has been persisted under the store directory.

use super::{Version, VersionConstraint};
use crate::error::{CookieError, CookieResult};
use camino::Utf8PathBuf;
use serde::Serialize;
use url::Url;

/// Maximum package name length accepted by npm-compatible registries
const MAX_NAME_LENGTH: usize = 214;

/// A single package resolution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version_constraint: VersionConstraint,
    pub store_dir: Utf8PathBuf,
    /// Local package directory; when set nothing is installed
    pub target_path: Option<Utf8PathBuf>,
}

/// A package whose contents are persisted under the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    pub root_dir: Utf8PathBuf,
    pub manifest_path: Utf8PathBuf,
    /// `file://` URI of the declared main file
    pub main_entry: Option<Url>,
}

impl PackageDescriptor {
    /// Create a validated descriptor
    pub fn new(
        name: impl Into<String>,
        version: &str,
        store_dir: impl Into<Utf8PathBuf>,
    ) -> CookieResult<Self> {
        let name = name.into();
        let store_dir = store_dir.into();

        if !Self::is_valid_name(&name) {
            return Err(CookieError::validation(
                "packageName",
                format!("'{}' is not a valid package name", name),
            ));
        }
        if store_dir.as_str().is_empty() {
            return Err(CookieError::validation("storeDir", "must not be empty"));
        }
        if version.trim().is_empty() {
            return Err(CookieError::validation("packageVersion", "must not be empty"));
        }

        let version_constraint = VersionConstraint::parse(version)?;

        Ok(Self {
            name,
            version_constraint,
            store_dir,
            target_path: None,
        })
    }

    /// Point the descriptor at a local package directory
    pub fn with_target_path(mut self, target_path: impl Into<Utf8PathBuf>) -> Self {
        self.target_path = Some(target_path.into());
        self
    }

    /// Check if this is a valid (optionally scoped) package name
    pub fn is_valid_name(name: &str) -> bool {
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return false;
        }

        match name.strip_prefix('@') {
            Some(scoped) => match scoped.split_once('/') {
                Some((scope, bare)) => is_valid_segment(scope) && is_valid_segment(bare),
                None => false,
            },
            None => is_valid_segment(name),
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.starts_with('_')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Directory name for `(name, version)` inside the store.
///
/// Scoped names keep their scope but swap `/` for `+` so every package
/// occupies a single directory level.
pub fn install_dir_name(name: &str, version: &Version) -> String {
    format!("{}@{}", name.replace('/', "+"), version)
}

/// Inverse of [`install_dir_name`]; `None` for unrelated entries
pub fn parse_install_dir_name(dir_name: &str) -> Option<(String, Version)> {
    // Scoped names start with '@', so split on the last one
    let (encoded, version) = dir_name.rsplit_once('@')?;
    if encoded.is_empty() {
        return None;
    }
    let version = version.parse().ok()?;
    Some((encoded.replace('+', "/"), version))
}

impl InstalledPackage {
    /// Directory name this package occupies in the store
    pub fn dir_name(&self) -> String {
        install_dir_name(&self.name, &self.version)
    }
}
