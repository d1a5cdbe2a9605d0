//! Tarball extraction functionality
//!
//! npm tarballs wrap their contents in one top-level directory (normally
//! `package/`). Extraction strips that directory and rejects any entry that
//! would land outside the destination.

use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

use cookie_core::error::CookieError;

use crate::StoreResult;

/// Extract a gzipped package tarball into `dest_dir`, dropping the top-level directory
pub fn extract_tarball<R: Read>(reader: R, dest_dir: &Path, package: &str) -> StoreResult<()> {
    let gz_decoder = GzDecoder::new(reader);
    let mut archive = Archive::new(gz_decoder);

    fs::create_dir_all(dest_dir)
        .map_err(|e| CookieError::install(package, "Failed to create extraction directory", e))?;

    let entries = archive
        .entries()
        .map_err(|e| CookieError::install(package, "Failed to read tarball", e))?;

    for entry_result in entries {
        let mut entry =
            entry_result.map_err(|e| CookieError::install(package, "Corrupt tarball entry", e))?;

        let entry_path = entry
            .path()
            .map_err(|e| CookieError::install(package, "Invalid path in tarball", e))?
            .into_owned();
        let Some(safe_path) = validate_extract_path(&entry_path, dest_dir, package)? else {
            // The top-level directory itself
            continue;
        };

        match entry.header().entry_type() {
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                let mode = entry.header().mode().ok();
                extract_regular_file(&mut entry, &safe_path, package)?;
                apply_mode(&safe_path, mode);
            },
            tar::EntryType::Directory => {
                fs::create_dir_all(&safe_path)
                    .map_err(|e| CookieError::install(package, "Failed to create directory", e))?;
            },
            other => {
                // Links, devices and pax headers carry nothing a package needs
                debug!(path = %entry_path.display(), kind = ?other, "skipping tarball entry");
            },
        }
    }

    Ok(())
}

/// Map an archive path into `dest_dir`; `None` for the wrapping directory
fn validate_extract_path(
    entry_path: &Path,
    dest_dir: &Path,
    package: &str,
) -> StoreResult<Option<PathBuf>> {
    let mut safe_path = dest_dir.to_path_buf();
    let mut stripped = false;
    let mut depth = 0usize;

    for component in entry_path.components() {
        match component {
            Component::Normal(name) => {
                if !stripped {
                    stripped = true;
                    continue;
                }
                safe_path.push(name);
                depth += 1;
            },
            Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CookieError::Install {
                    package: package.to_string(),
                    message: format!("tarball entry escapes the package: {}", entry_path.display()),
                    source: None,
                });
            },
        }
    }

    Ok((depth > 0).then_some(safe_path))
}

/// Preserve the archived file mode; the owner keeps read and write
#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode((mode & 0o777) | 0o600));
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) {}

/// Extract a regular file from tar entry
fn extract_regular_file<R: Read>(
    entry: &mut tar::Entry<R>,
    dest_path: &Path,
    package: &str,
) -> StoreResult<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CookieError::install(package, "Failed to create directory", e))?;
    }

    // Stream extraction without loading into memory
    let mut file = fs::File::create(dest_path)
        .map_err(|e| CookieError::install(package, "Failed to create file", e))?;

    std::io::copy(entry, &mut file)
        .map_err(|e| CookieError::install(package, "Failed to write file", e))?;

    Ok(())
}
