//! Path utilities for turning package files into loadable URLs.
//!
//! Provides lexical path normalization and `file://` conversion that gives the
//! same result whichever separator convention a manifest was written with.

use crate::error::{CookieError, CookieResult};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use url::Url;

/// Normalize a path by resolving `.` and `..` components lexically
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut components: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => match components.last() {
                Some(Utf8Component::Normal(_)) => {
                    components.pop();
                },
                // `..` at the root stays at the root
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {},
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().map(|c| c.as_str()).collect()
}

/// Convert `path` to a `file://` URL.
///
/// Backslash separators are rewritten to forward slashes first, relative
/// paths are resolved against `base`, and the result is normalized.
pub fn to_file_url(path: &Utf8Path, base: &Utf8Path) -> CookieResult<Url> {
    let forward = Utf8PathBuf::from(path.as_str().replace('\\', "/"));
    let absolute = if forward.is_absolute() {
        forward
    } else {
        Utf8PathBuf::from(base.as_str().replace('\\', "/")).join(forward)
    };
    let normalized = normalize_path(&absolute);

    Url::from_file_path(normalized.as_std_path()).map_err(|()| {
        CookieError::validation(
            "path",
            format!("'{}' cannot be expressed as a file URL", normalized),
        )
    })
}
