//! Tarball integrity verification.
//!
//! Checks downloaded archives against the registry's subresource integrity
//! string (`sha512-…` / `sha1-…`, base64) or, failing that, the legacy
//! hex `shasum`.

use base64::{engine::general_purpose, Engine as _};
use cookie_core::error::CookieError;
use sha1::Sha1;
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::api::DistInfo;
use crate::RegistryResult;

/// Verify `bytes` against the checksums published in `dist`
pub fn verify(bytes: &[u8], dist: &DistInfo, package: &str) -> RegistryResult<()> {
    if let Some(integrity) = &dist.integrity {
        // An SRI string may list several hashes; any supported one must match
        let mut last_mismatch = None;

        for entry in integrity.split_whitespace() {
            let Some((algorithm, expected)) = entry.split_once('-') else {
                continue;
            };
            let computed = match algorithm {
                "sha512" => general_purpose::STANDARD.encode(Sha512::digest(bytes)),
                "sha1" => general_purpose::STANDARD.encode(Sha1::digest(bytes)),
                _ => continue,
            };
            if computed == expected {
                return Ok(());
            }
            last_mismatch = Some((entry.to_string(), format!("{}-{}", algorithm, computed)));
        }

        if let Some((expected, actual)) = last_mismatch {
            return Err(CookieError::IntegrityFailure {
                package: package.to_string(),
                expected,
                actual,
            });
        }
    }

    if let Some(shasum) = &dist.shasum {
        let computed = hex::encode(Sha1::digest(bytes));
        if !computed.eq_ignore_ascii_case(shasum) {
            return Err(CookieError::IntegrityFailure {
                package: package.to_string(),
                expected: shasum.clone(),
                actual: computed,
            });
        }
        return Ok(());
    }

    debug!(package, "registry published no checksum, skipping verification");
    Ok(())
}
