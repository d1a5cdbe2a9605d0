//! npm registry API response types

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Package document returned by `GET {registry}/{name}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistryMetadata {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Tags such as `latest`
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// Per-version manifests, in the order the registry declared them
    #[serde(default)]
    pub versions: IndexMap<String, VersionManifest>,
}

/// Manifest data for one published version
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionManifest {
    /// Version string
    pub version: Option<String>,
    /// Main entry point
    pub main: Option<String>,
    /// Distribution information
    pub dist: Option<DistInfo>,
    /// Remaining manifest fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Distribution information for a package tarball
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistInfo {
    /// Tarball download URL
    pub tarball: String,
    /// SHA-1 checksum (legacy)
    pub shasum: Option<String>,
    /// Subresource integrity hash (preferred)
    pub integrity: Option<String>,
}

impl RegistryMetadata {
    /// Version strings in registry-declared order
    pub fn version_strings(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }

    /// Manifest for an exact version string
    pub fn manifest(&self, version: &str) -> Option<&VersionManifest> {
        self.versions.get(version)
    }
}
