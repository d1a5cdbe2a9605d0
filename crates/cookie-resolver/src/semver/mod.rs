//! Semantic version selection
//!
//! Picks the highest published version satisfying a request. Registry
//! listings are taken as-is: they need not be sorted, and entries that are
//! not valid semver are ignored.

use std::collections::BTreeSet;
use std::str::FromStr;

use cookie_core::types::{Version, VersionConstraint};
use cookie_registry::RegistryMetadata;

/// How a base version restricts the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Caret range: same major (same major.minor for 0.x) and not below base
    Compatible,
    /// Only versions equal in precedence to base
    Exact,
}

/// Version selector for finding best matching versions
#[derive(Debug, Clone)]
pub struct VersionSelector {
    /// Parsed available versions in ascending order
    available_versions: BTreeSet<Version>,
}

impl VersionSelector {
    /// Create new version selector with available versions
    pub fn new(versions: Vec<Version>) -> Self {
        let available_versions = versions.into_iter().collect();
        Self { available_versions }
    }

    /// Parse a registry listing, skipping entries that are not valid semver
    pub fn from_listing<S: AsRef<str>>(versions: &[S]) -> Self {
        let available_versions = versions
            .iter()
            .filter_map(|v| Version::from_str(v.as_ref()).ok())
            .collect();
        Self { available_versions }
    }

    /// Select highest version matching the constraint
    pub fn select_best(&self, constraint: &VersionConstraint) -> Option<Version> {
        self.available_versions
            .iter()
            .rev() // Start with highest versions
            .find(|version| constraint.matches(version))
            .cloned()
    }

    /// Select highest stable version (no prerelease) matching the constraint
    pub fn select_best_stable(&self, constraint: &VersionConstraint) -> Option<Version> {
        self.available_versions
            .iter()
            .rev()
            .filter(|version| !version.is_prerelease())
            .find(|version| constraint.matches(version))
            .cloned()
    }

    /// Prefer stable releases, falling back to prereleases when none match
    pub fn select_preferred(&self, constraint: &VersionConstraint) -> Option<Version> {
        self.select_best_stable(constraint)
            .or_else(|| self.select_best(constraint))
    }

    /// Get the highest available version
    pub fn highest_version(&self) -> Option<&Version> {
        self.available_versions.iter().next_back()
    }

    /// Number of valid versions in the listing
    pub fn len(&self) -> usize {
        self.available_versions.len()
    }

    /// Whether the listing held no valid version
    pub fn is_empty(&self) -> bool {
        self.available_versions.is_empty()
    }
}

/// Version strings from registry metadata, in registry-declared order
pub fn list_versions(metadata: &RegistryMetadata) -> Vec<String> {
    metadata.version_strings()
}

/// Highest version in `versions` that `mode` admits relative to `base`.
///
/// `None` means nothing qualifies; it is not an error.
pub fn select_best_version<S: AsRef<str>>(
    base: &Version,
    versions: &[S],
    mode: SelectionMode,
) -> Option<Version> {
    let constraint = match mode {
        SelectionMode::Compatible => VersionConstraint::Caret(base.clone()),
        SelectionMode::Exact => VersionConstraint::Exact(base.clone()),
    };
    VersionSelector::from_listing(versions).select_best(&constraint)
}

/// Highest version in `versions` satisfying a descriptor constraint.
///
/// `latest` prefers the highest stable release and only falls back to a
/// prerelease when nothing stable has been published.
pub fn select_for_constraint<S: AsRef<str>>(
    constraint: &VersionConstraint,
    versions: &[S],
) -> Option<Version> {
    match constraint {
        VersionConstraint::Exact(base) => select_best_version(base, versions, SelectionMode::Exact),
        VersionConstraint::Caret(base) => {
            select_best_version(base, versions, SelectionMode::Compatible)
        },
        VersionConstraint::Latest => VersionSelector::from_listing(versions).select_preferred(constraint),
    }
}
