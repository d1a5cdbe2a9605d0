//! package.json manifest parsing

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use cookie_core::error::CookieError;
use crate::ConfigResult;

/// The parts of a package.json manifest the CLI reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Main entry point, relative to the package root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Everything else in the manifest
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageJson {
    /// Declared main entry, ignoring an empty string
    pub fn main_entry(&self) -> Option<&str> {
        self.main.as_deref().filter(|main| !main.trim().is_empty())
    }
}

/// Parse package.json content; `origin` names the source in error messages
pub fn parse_package_json(content: &str, origin: &str) -> ConfigResult<PackageJson> {
    serde_json::from_str(content).map_err(|e| CookieError::JsonParse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Load and parse package.json from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageJson> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CookieError::io(format!("Failed to read {}", path), e))?;

    parse_package_json(&content, path.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_package_json() {
        let json = r#"
{
  "name": "test-package",
  "version": "1.0.0",
  "main": "lib/index.js"
}
"#;

        let manifest = parse_package_json(json, "package.json").unwrap();
        assert_eq!(manifest.name.as_deref(), Some("test-package"));
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        assert_eq!(manifest.main_entry(), Some("lib/index.js"));
    }

    #[test]
    fn test_unknown_fields_kept() {
        let json = r#"{ "name": "pkg", "scripts": { "test": "jest" } }"#;
        let manifest = parse_package_json(json, "package.json").unwrap();
        assert!(manifest.extra.contains_key("scripts"));
        assert_eq!(manifest.main_entry(), None);
    }

    #[test]
    fn test_empty_main_is_absent() {
        let manifest = parse_package_json(r#"{ "main": "  " }"#, "package.json").unwrap();
        assert_eq!(manifest.main_entry(), None);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_package_json("{ \"main\": ", "pkg/package.json").unwrap_err();
        match err {
            CookieError::JsonParse { path, .. } => assert_eq!(path, "pkg/package.json"),
            other => panic!("Expected JsonParse, got {:?}", other),
        }
    }
}
