//! HTTP client for registry metadata and tarball downloads.
//!
//! Requests are issued once; transport failures are handed back to the
//! caller rather than retried here. Every request carries a bounded timeout.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use cookie_core::error::CookieError;

use crate::api::{DistInfo, RegistryMetadata};
use crate::RegistryResult;

/// Canonical upstream registry
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Community mirror used by default
pub const NPM_MIRROR_REGISTRY: &str = "https://registry.npmmirror.com";

/// Request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which well-known registry a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryKind {
    /// Community mirror
    #[default]
    Mirror,
    /// Canonical upstream
    Canonical,
}

impl RegistryKind {
    /// Base URL of this registry
    pub fn base_url(self) -> &'static str {
        default_registry(self == RegistryKind::Canonical)
    }
}

/// Base URL of the canonical registry when `canonical`, else the mirror
pub fn default_registry(canonical: bool) -> &'static str {
    if canonical {
        NPM_REGISTRY
    } else {
        NPM_MIRROR_REGISTRY
    }
}

/// HTTP client bound to one registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Base registry URL, without trailing slash
    base_url: String,
}

impl RegistryClient {
    /// Create a client for one of the well-known registries
    pub fn new(kind: RegistryKind) -> RegistryResult<Self> {
        Self::with_base_url(kind.base_url(), DEFAULT_TIMEOUT)
    }

    /// Create a client for an arbitrary registry base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("cookie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CookieError::registry(format!("Failed to create HTTP client: {}", e), e))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Base registry URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch package metadata.
    ///
    /// Any non-success status means "no such package" and yields `Ok(None)`;
    /// transport failures and undecodable bodies are errors.
    pub async fn fetch_metadata(&self, package_name: &str) -> RegistryResult<Option<RegistryMetadata>> {
        if package_name.is_empty() {
            return Err(CookieError::validation("packageName", "must not be empty"));
        }

        let url = format!("{}/{}", self.base_url, encode_package_name(package_name));
        debug!(%url, "fetching registry metadata");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CookieError::registry(format!("Failed to fetch metadata for {}: {}", package_name, e), e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, package = package_name, "registry has no metadata");
            return Ok(None);
        }

        let metadata = response
            .json::<RegistryMetadata>()
            .await
            .map_err(|e| CookieError::registry(format!("Failed to parse metadata for {}: {}", package_name, e), e))?;

        Ok(Some(metadata))
    }

    /// Download a package tarball and verify its published checksum
    pub async fn download_tarball(&self, dist: &DistInfo, package: &str) -> RegistryResult<Vec<u8>> {
        debug!(tarball = %dist.tarball, package, "downloading tarball");

        let response = self
            .client
            .get(&dist.tarball)
            .send()
            .await
            .map_err(|e| CookieError::install(package, format!("Failed to download tarball: {}", e), e))?;

        if !response.status().is_success() {
            return Err(CookieError::Install {
                package: package.to_string(),
                message: format!("Tarball request returned status {}", response.status()),
                source: None,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CookieError::install(package, format!("Failed to read tarball: {}", e), e))?
            .to_vec();

        crate::integrity::verify(&bytes, dist, package)?;

        Ok(bytes)
    }
}

/// Encode package name for URL (handle scoped packages)
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg -> @org%2fpkg
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}
