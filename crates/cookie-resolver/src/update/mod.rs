//! Self-update check
//!
//! Compares the running tool's version with the newest compatible release
//! on the canonical registry. The check is advisory: every failure is logged
//! and swallowed so it can never fail the command that triggered it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use cookie_core::types::Version;
use cookie_registry::client::NPM_REGISTRY;
use cookie_registry::RegistryClient;

use crate::semver::{list_versions, select_best_version, SelectionMode};

/// Outcome of comparing the installed version with the newest release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionComparison {
    /// Nothing newer is published
    UpToDate,
    /// A strictly greater compatible version exists
    UpdateAvailable { current: Version, latest: Version },
}

/// Message shown when a newer release exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAdvisory {
    pub tool_name: String,
    pub current: Version,
    pub latest: Version,
}

impl UpdateAdvisory {
    /// Shell command that installs the latest release globally
    pub fn command(&self) -> String {
        format!("npm install -g {}@{}", self.tool_name, self.latest)
    }
}

impl fmt::Display for UpdateAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Please update {} manually, current version: {}, latest version: {}\nUpdate command: {}",
            self.tool_name,
            self.current,
            self.latest,
            self.command()
        )
    }
}

/// Compare `current` against the resolved newest version.
///
/// Build metadata carries no precedence, so `1.0.0+build.1` is not newer
/// than `1.0.0`.
pub fn compare_versions(current: &Version, latest: Option<&Version>) -> VersionComparison {
    match latest {
        Some(latest) if latest.cmp_precedence(current) == Ordering::Greater => {
            VersionComparison::UpdateAvailable {
                current: current.clone(),
                latest: latest.clone(),
            }
        },
        _ => VersionComparison::UpToDate,
    }
}

/// Check `client`'s registry for a newer compatible release of `tool_name`.
///
/// Returns `None` when up to date and on any failure.
pub async fn check_for_update(
    client: &RegistryClient,
    current_version: &str,
    tool_name: &str,
) -> Option<UpdateAdvisory> {
    let current = match Version::from_str(current_version) {
        Ok(version) => version,
        Err(e) => {
            debug!(error = %e, "update check skipped: current version is not semver");
            return None;
        },
    };

    let metadata = match client.fetch_metadata(tool_name).await {
        Ok(Some(metadata)) => metadata,
        Ok(None) => {
            debug!(tool = tool_name, "update check skipped: tool not published");
            return None;
        },
        Err(e) => {
            debug!(error = %e, "update check failed");
            return None;
        },
    };

    let latest = select_best_version(&current, &list_versions(&metadata), SelectionMode::Compatible);

    match compare_versions(&current, latest.as_ref()) {
        VersionComparison::UpdateAvailable { current, latest } => Some(UpdateAdvisory {
            tool_name: tool_name.to_string(),
            current,
            latest,
        }),
        VersionComparison::UpToDate => None,
    }
}

/// Run [`check_for_update`] against the canonical registry with a hard deadline
pub async fn check_global_update(
    current_version: &str,
    tool_name: &str,
    timeout: Duration,
) -> Option<UpdateAdvisory> {
    // The mirror can lag behind releases, so always ask upstream
    let client = match RegistryClient::with_base_url(NPM_REGISTRY, timeout) {
        Ok(client) => client,
        Err(e) => {
            debug!(error = %e, "update check skipped: no HTTP client");
            return None;
        },
    };

    match tokio::time::timeout(timeout, check_for_update(&client, current_version, tool_name)).await {
        Ok(advisory) => advisory,
        Err(_) => {
            debug!("update check timed out");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    async fn registry_with(versions: serde_json::Value) -> (MockServer, RegistryClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie-cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "cookie-cli",
                "versions": versions
            })))
            .mount(&server)
            .await;
        let client = RegistryClient::with_base_url(server.uri(), Duration::from_secs(5)).unwrap();
        (server, client)
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(
            compare_versions(&v("1.0.0"), Some(&v("1.1.0"))),
            VersionComparison::UpdateAvailable {
                current: v("1.0.0"),
                latest: v("1.1.0")
            }
        );
        assert_eq!(compare_versions(&v("1.1.0"), Some(&v("1.1.0"))), VersionComparison::UpToDate);
        assert_eq!(compare_versions(&v("1.1.0"), None), VersionComparison::UpToDate);
        assert_eq!(
            compare_versions(&v("1.1.0"), Some(&v("1.1.0+build.7"))),
            VersionComparison::UpToDate
        );
    }

    #[test]
    fn test_advisory_message() {
        let advisory = UpdateAdvisory {
            tool_name: "cookie-cli".to_string(),
            current: v("1.0.0"),
            latest: v("1.2.0"),
        };

        assert_eq!(advisory.command(), "npm install -g cookie-cli@1.2.0");
        let message = advisory.to_string();
        assert!(message.contains("1.0.0"));
        assert!(message.contains("1.2.0"));
        assert!(message.contains("npm install -g cookie-cli@1.2.0"));
    }

    #[tokio::test]
    async fn test_update_available() {
        let (_server, client) =
            registry_with(serde_json::json!({ "1.0.0": {}, "1.3.0": {}, "2.0.0": {} })).await;

        let advisory = check_for_update(&client, "1.0.0", "cookie-cli").await.unwrap();
        assert_eq!(advisory.latest, v("1.3.0"));
        assert_eq!(advisory.current, v("1.0.0"));
    }

    #[tokio::test]
    async fn test_up_to_date() {
        let (_server, client) = registry_with(serde_json::json!({ "1.0.0": {}, "2.0.0": {} })).await;
        assert!(check_for_update(&client, "1.0.0", "cookie-cli").await.is_none());
    }

    #[tokio::test]
    async fn test_build_metadata_release_is_not_an_update() {
        let (_server, client) =
            registry_with(serde_json::json!({ "1.0.0": {}, "1.0.0+build.1": {} })).await;
        assert!(check_for_update(&client, "1.0.0", "cookie-cli").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_versions_no_advisory() {
        let (_server, client) = registry_with(serde_json::json!({})).await;
        assert!(check_for_update(&client, "1.0.0", "cookie-cli").await.is_none());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let client = RegistryClient::with_base_url(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(check_for_update(&client, "1.0.0", "cookie-cli").await.is_none());

        let unreachable =
            RegistryClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(check_for_update(&unreachable, "1.0.0", "cookie-cli").await.is_none());

        assert!(check_for_update(&client, "not-semver", "cookie-cli").await.is_none());
    }
}
