//! Semantic version types.
//!
//! Provides the Version and VersionConstraint types that follow the semantic
//! versioning specification, including pre-release precedence and caret
//! (compatible) ranges.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Requested version of a package: exact, caret range, or the `latest` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// `1.2.3` or `=1.2.3`
    Exact(Version),
    /// `^1.2.3`
    Caret(Version),
    /// `latest`
    Latest,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Invalid build metadata: {build}")]
    InvalidBuild { build: String },
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Compare by semver precedence (ignores build metadata)
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less, // prerelease < normal
                (None, Some(_)) => Ordering::Greater, // normal > prerelease
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }

    /// Caret compatibility: same major (same major.minor while major is 0)
    /// and at least `base` in precedence.
    pub fn is_compatible_with(&self, base: &Version) -> bool {
        if self.major != base.major {
            return false;
        }
        if base.major == 0 && self.minor != base.minor {
            return false;
        }
        self.cmp_precedence(base) != Ordering::Less
    }
}

/// Compare dot-separated prerelease identifiers: numeric identifiers compare
/// numerically and sort below alphanumeric ones; a shorter list sorts first
/// when all shared identifiers are equal.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            },
        }
    }
}

fn valid_identifiers(input: &str) -> bool {
    !input.is_empty()
        && input.split('.').all(|ident| {
            !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Numeric identifiers must not carry leading zeros
fn has_leading_zero(ident: &str) -> bool {
    ident.len() > 1 && ident.starts_with('0') && ident.chars().all(|c| c.is_ascii_digit())
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        // Split on '-' for prerelease
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        // Parse major.minor.patch
        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let parse_number = |component: &str| {
            if component.is_empty()
                || !component.chars().all(|c| c.is_ascii_digit())
                || has_leading_zero(component)
            {
                return Err(VersionError::InvalidNumber {
                    component: component.to_string(),
                });
            }
            component.parse::<u64>().map_err(|_| VersionError::InvalidNumber {
                component: component.to_string(),
            })
        };

        let major = parse_number(parts[0])?;
        let minor = parse_number(parts[1])?;
        let patch = parse_number(parts[2])?;

        if let Some(ref pre) = prerelease {
            if !valid_identifiers(pre) || pre.split('.').any(has_leading_zero) {
                return Err(VersionError::InvalidPrerelease {
                    prerelease: pre.clone(),
                });
            }
        }
        if let Some(ref b) = build {
            if !valid_identifiers(b) {
                return Err(VersionError::InvalidBuild { build: b.clone() });
            }
        }

        Ok(Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Build metadata only breaks ties so that Ord agrees with Eq.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_precedence(other)
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl VersionConstraint {
    /// Parse a constraint string (`latest`, `^1.2.3`, `1.2.3`, `=1.2.3`)
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();

        if input == "latest" {
            return Ok(VersionConstraint::Latest);
        }

        if let Some(stripped) = input.strip_prefix('^') {
            return Ok(VersionConstraint::Caret(Version::from_str(stripped)?));
        }

        let exact = input.strip_prefix('=').unwrap_or(input);
        Ok(VersionConstraint::Exact(Version::from_str(exact)?))
    }

    /// Check if a version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Exact(base) => version.cmp_precedence(base) == Ordering::Equal,
            VersionConstraint::Caret(base) => version.is_compatible_with(base),
            VersionConstraint::Latest => true,
        }
    }

    /// The pinned version, if this constraint names exactly one
    pub fn exact(&self) -> Option<&Version> {
        match self {
            VersionConstraint::Exact(version) => Some(version),
            _ => None,
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Exact(version) => write!(f, "{}", version),
            VersionConstraint::Caret(version) => write!(f, "^{}", version),
            VersionConstraint::Latest => write!(f, "latest"),
        }
    }
}
