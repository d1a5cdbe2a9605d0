//! Package store
//!
//! Resolves a [`PackageDescriptor`] to an installed package, fetching and
//! installing it from the registry only when the selected version is not
//! already present under the descriptor's store directory.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};
use url::Url;
use walkdir::WalkDir;

use cookie_config::entry::{resolve_entry, resolve_entry_from, MANIFEST_FILE};
use cookie_core::error::CookieError;
use cookie_core::types::{
    install_dir_name, parse_install_dir_name, InstalledPackage, PackageDescriptor, Version,
};
use cookie_registry::{RegistryClient, RegistryMetadata};
use cookie_resolver::{list_versions, select_for_constraint};

use crate::tarball::extract_tarball;
use crate::StoreResult;

/// Staging directory for in-flight installs, relative to the store root
pub const STAGING_DIR: &str = ".tmp";

/// Result of [`PackageStore::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The resolved version was downloaded and installed
    Installed(InstalledPackage),
    /// The resolved version was already installed; nothing was written
    Unchanged(InstalledPackage),
}

impl UpdateOutcome {
    /// The package the store now holds
    pub fn package(&self) -> &InstalledPackage {
        match self {
            UpdateOutcome::Installed(package) | UpdateOutcome::Unchanged(package) => package,
        }
    }
}

/// Registry-backed package store
#[derive(Debug, Clone)]
pub struct PackageStore {
    client: RegistryClient,
}

impl PackageStore {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Directory `(name, version)` occupies under `store_dir`
    pub fn package_dir(store_dir: &Utf8Path, name: &str, version: &Version) -> Utf8PathBuf {
        store_dir.join(install_dir_name(name, version))
    }

    /// Whether a complete copy of `(name, version)` is installed
    pub fn contains(store_dir: &Utf8Path, name: &str, version: &Version) -> bool {
        Self::package_dir(store_dir, name, version)
            .join(MANIFEST_FILE)
            .is_file()
    }

    /// Installed versions of `name`, ascending
    pub fn cached_versions(store_dir: &Utf8Path, name: &str) -> StoreResult<Vec<Version>> {
        if !store_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in WalkDir::new(store_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let message = format!("Failed to list store {}", store_dir);
                match e.into_io_error() {
                    Some(io) => CookieError::io(message, io),
                    None => CookieError::io(message, std::io::Error::other("filesystem loop")),
                }
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(dir_name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some((entry_name, version)) = parse_install_dir_name(dir_name) {
                if entry_name == name && Self::contains(store_dir, name, &version) {
                    versions.push(version);
                }
            }
        }

        versions.sort();
        Ok(versions)
    }

    /// Describe an installed package, resolving its entry file
    pub async fn installed(
        store_dir: &Utf8Path,
        name: &str,
        version: &Version,
    ) -> StoreResult<InstalledPackage> {
        let root_dir = Self::package_dir(store_dir, name, version);
        let main_entry = resolve_entry(&root_dir).await?;

        Ok(InstalledPackage {
            name: name.to_string(),
            version: version.clone(),
            manifest_path: root_dir.join(MANIFEST_FILE),
            root_dir,
            main_entry,
        })
    }

    /// Entry URL for a descriptor.
    ///
    /// A descriptor pointing at a local package is resolved in place and
    /// never installs anything.
    pub async fn entry_point(&self, descriptor: &PackageDescriptor) -> StoreResult<Option<Url>> {
        if let Some(target) = &descriptor.target_path {
            debug!(%target, "resolving local package");
            return resolve_entry_from(target).await;
        }

        Ok(self.resolve_package(descriptor).await?.main_entry)
    }

    /// Resolve `descriptor` to an installed package, installing it if needed
    pub async fn resolve_package(&self, descriptor: &PackageDescriptor) -> StoreResult<InstalledPackage> {
        let store_dir = &descriptor.store_dir;
        let name = &descriptor.name;

        // Exact requests need no metadata once installed
        if let Some(version) = descriptor.version_constraint.exact() {
            if Self::contains(store_dir, name, version) {
                debug!(package = %name, %version, "already installed");
                return Self::installed(store_dir, name, version).await;
            }
        }

        let (version, metadata) = self.select_version(descriptor).await?;

        if Self::contains(store_dir, name, &version) {
            debug!(package = %name, %version, "already installed");
        } else {
            self.install(store_dir, name, &version, &metadata).await?;
        }

        Self::installed(store_dir, name, &version).await
    }

    /// Re-resolve against the registry and install when the result is new
    pub async fn update(&self, descriptor: &PackageDescriptor) -> StoreResult<UpdateOutcome> {
        let store_dir = &descriptor.store_dir;
        let name = &descriptor.name;

        let (version, metadata) = self.select_version(descriptor).await?;
        let newest_cached = Self::cached_versions(store_dir, name)?.pop();

        if newest_cached.as_ref() == Some(&version) || Self::contains(store_dir, name, &version) {
            debug!(package = %name, %version, "already up to date");
            return Ok(UpdateOutcome::Unchanged(
                Self::installed(store_dir, name, &version).await?,
            ));
        }

        self.install(store_dir, name, &version, &metadata).await?;

        Ok(UpdateOutcome::Installed(
            Self::installed(store_dir, name, &version).await?,
        ))
    }

    /// Fetch metadata and pick the best version for the descriptor
    async fn select_version(
        &self,
        descriptor: &PackageDescriptor,
    ) -> StoreResult<(Version, RegistryMetadata)> {
        let name = &descriptor.name;

        let metadata = self
            .client
            .fetch_metadata(name)
            .await?
            .ok_or_else(|| CookieError::PackageNotFound { name: name.clone() })?;

        let version = select_for_constraint(&descriptor.version_constraint, &list_versions(&metadata))
            .ok_or_else(|| CookieError::NoMatchingVersion {
                name: name.clone(),
                constraint: descriptor.version_constraint.to_string(),
            })?;

        debug!(package = %name, %version, "selected version");
        Ok((version, metadata))
    }

    /// Download, verify and publish `(name, version)` under `store_dir`
    async fn install(
        &self,
        store_dir: &Utf8Path,
        name: &str,
        version: &Version,
        metadata: &RegistryMetadata,
    ) -> StoreResult<()> {
        let spec = format!("{}@{}", name, version);

        let dist = metadata
            .versions
            .iter()
            .find(|(key, _)| key.parse::<Version>().ok().as_ref() == Some(version))
            .and_then(|(_, manifest)| manifest.dist.as_ref())
            .ok_or_else(|| CookieError::Install {
                package: spec.clone(),
                message: "registry metadata has no tarball for this version".to_string(),
                source: None,
            })?;

        info!(package = %spec, "installing");
        let bytes = self.client.download_tarball(dist, &spec).await?;

        let staging_root = store_dir.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_root)
            .await
            .map_err(|e| CookieError::install(&spec, format!("Failed to create {}", staging_root), e))?;

        // Removed on drop, whether the install finishes, fails or is cancelled
        let staging = tempfile::Builder::new()
            .prefix(&format!("{}-", install_dir_name(name, version)))
            .tempdir_in(&staging_root)
            .map_err(|e| CookieError::install(&spec, "Failed to create staging directory", e))?;

        // Extraction owns the staging directory until it stops writing
        let extract_spec = spec.clone();
        let (staging, extracted) = tokio::task::spawn_blocking(move || {
            let unpacked = staging.path().join("package");
            let extracted = extract_tarball(std::io::Cursor::new(bytes), &unpacked, &extract_spec);
            (staging, extracted)
        })
        .await
        .map_err(|e| CookieError::install(&spec, "Extraction task failed", e))?;
        extracted?;

        let unpacked = staging.path().join("package");

        if !unpacked.join(MANIFEST_FILE).is_file() {
            return Err(CookieError::Install {
                package: spec,
                message: format!("tarball has no {}", MANIFEST_FILE),
                source: None,
            });
        }

        let destination = Self::package_dir(store_dir, name, version);
        if let Err(e) = tokio::fs::rename(&unpacked, &destination).await {
            if Self::contains(store_dir, name, version) {
                debug!(package = %spec, "installed concurrently by another process");
                return Ok(());
            }
            return Err(CookieError::install(
                &spec,
                format!("Failed to move package into {}", destination),
                e,
            ));
        }

        info!(package = %spec, path = %destination, "installed");
        Ok(())
    }
}
