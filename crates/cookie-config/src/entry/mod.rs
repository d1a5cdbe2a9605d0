//! Locating a package's root directory and its loadable entry file

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use url::Url;

use cookie_core::error::CookieError;
use cookie_core::utils::to_file_url;

use crate::json::load_from_file;
use crate::ConfigResult;

/// Manifest file that marks a package root
pub const MANIFEST_FILE: &str = "package.json";

/// Walk up from `target` to the nearest directory holding a package.json
pub fn resolve_root(target: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = target;

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return Some(current.to_path_buf());
        }

        // Move up one directory
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// `file://` URL of the entry declared by the manifest in `root`.
///
/// `Ok(None)` when the manifest is missing or declares no `main`.
pub async fn resolve_entry(root: &Utf8Path) -> ConfigResult<Option<Url>> {
    let absolute_root = absolutize(root)?;
    let manifest_path = absolute_root.join(MANIFEST_FILE);

    if !manifest_path.is_file() {
        debug!(%manifest_path, "no manifest, no entry");
        return Ok(None);
    }

    let manifest = load_from_file(&manifest_path).await?;
    let Some(main) = manifest.main_entry() else {
        debug!(%manifest_path, "manifest declares no main");
        return Ok(None);
    };

    to_file_url(Utf8Path::new(main), &absolute_root).map(Some)
}

/// Resolve the package containing `target`, then its entry
pub async fn resolve_entry_from(target: &Utf8Path) -> ConfigResult<Option<Url>> {
    let target = absolutize(target)?;
    match resolve_root(&target) {
        Some(root) => resolve_entry(&root).await,
        None => {
            debug!(%target, "no package root above target");
            Ok(None)
        },
    }
}

/// Resolve relative paths against the current directory
fn absolutize(path: &Utf8Path) -> ConfigResult<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| CookieError::io("Failed to read current directory".to_string(), e))?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        CookieError::validation("cwd", format!("current directory is not valid UTF-8: {}", e))
    })?;

    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn write_manifest(dir: &Utf8Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn test_resolve_root_walks_up() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp).join("pkg");
        write_manifest(&root, r#"{ "name": "pkg" }"#);
        let nested = root.join("lib/deep");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(resolve_root(&nested), Some(root.clone()));
        assert_eq!(resolve_root(&root), Some(root));
    }

    #[test]
    fn test_resolve_root_none_without_manifest() {
        let temp = TempDir::new().unwrap();
        let empty = utf8_root(&temp).join("empty");
        fs::create_dir_all(&empty).unwrap();

        // Only meaningful when no ancestor of the temp dir is a package
        if resolve_root(&utf8_root(&temp)).is_none() {
            assert_eq!(resolve_root(&empty), None);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_entry() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        write_manifest(&root, r#"{ "main": "lib/index.js" }"#);

        let url = resolve_entry(&root).await.unwrap().unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.path(), format!("{}/lib/index.js", root));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_entry_backslash_main() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        write_manifest(&root, r#"{ "main": ".\\lib\\..\\dist\\main.js" }"#);

        let url = resolve_entry(&root).await.unwrap().unwrap();
        assert_eq!(url.path(), format!("{}/dist/main.js", root));
    }

    #[tokio::test]
    async fn test_resolve_entry_without_main() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        write_manifest(&root, r#"{ "name": "no-main" }"#);

        assert_eq!(resolve_entry(&root).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_entry_missing_manifest() {
        let temp = TempDir::new().unwrap();
        assert_eq!(resolve_entry(&utf8_root(&temp)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_entry_malformed_manifest() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        write_manifest(&root, "{ not json");

        let err = resolve_entry(&root).await.unwrap_err();
        assert!(matches!(err, CookieError::JsonParse { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_entry_from_nested_target() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp).join("local-init");
        write_manifest(&root, r#"{ "main": "index.js" }"#);
        let nested = root.join("src");
        fs::create_dir_all(&nested).unwrap();

        let url = resolve_entry_from(&nested).await.unwrap().unwrap();
        assert_eq!(url.path(), format!("{}/index.js", root));
    }
}
