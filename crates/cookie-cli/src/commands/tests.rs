//! Unit tests for CLI commands.

use super::*;
use crate::Cli;

use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser};
use cookie_core::error::{CookieError, ErrorKind};
use cookie_registry::{RegistryKind, DEFAULT_TIMEOUT};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config rooted in a temporary home directory
fn test_config(temp_dir: &TempDir) -> CliConfig {
    let home = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    CliConfig {
        cli_home: home.join(".cookie-cli"),
        home,
        target_path: None,
        debug: false,
        registry: RegistryKind::Mirror,
        timeout: DEFAULT_TIMEOUT,
    }
}

/// Registry that answers every request with `status`
async fn registry_returning(status: u16, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn create_test_context(config: CliConfig, server: &MockServer) -> CommandContext {
    let client = RegistryClient::with_base_url(server.uri(), Duration::from_secs(5)).unwrap();
    CommandContext::with_client(config, client)
}

#[test]
fn test_cli_definition() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_init() {
    let cli = Cli::try_parse_from([
        "cookie",
        "init",
        "my-app",
        "--force",
        "--debug",
        "--target-path",
        "/work/init",
    ])
    .unwrap();

    assert!(cli.debug);
    assert_eq!(cli.target_path, Some(Utf8PathBuf::from("/work/init")));
    assert_eq!(
        cli.command,
        Commands::Init {
            project_name: Some("my-app".to_string()),
            force: true
        }
    );
}

#[test]
fn test_parse_resolve_defaults_to_latest() {
    let cli = Cli::try_parse_from(["cookie", "resolve", "left-pad"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Resolve {
            package: "left-pad".to_string(),
            version: "latest".to_string()
        }
    );
}

#[test]
fn test_unknown_command_is_rejected() {
    let err = Cli::try_parse_from(["cookie", "publish"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
}

#[tokio::test]
async fn test_init_with_local_target_skips_registry() {
    let temp_dir = TempDir::new().unwrap();
    let local = Utf8PathBuf::try_from(temp_dir.path().join("local-init")).unwrap();
    fs::create_dir_all(local.join("lib")).unwrap();
    fs::write(local.join("package.json"), r#"{ "main": "lib\\index.js" }"#).unwrap();

    let server = registry_returning(500, 0).await;
    let mut config = test_config(&temp_dir);
    config.target_path = Some(local.join("lib"));
    let ctx = create_test_context(config, &server);

    let entry = init::execute(Some("my-app".to_string()), false, &ctx).await.unwrap();
    assert_eq!(entry.scheme(), "file");
    assert!(entry.path().ends_with("/local-init/lib/index.js"));
    assert!(!ctx.config.store_dir().exists());
}

#[tokio::test]
async fn test_init_local_target_without_main() {
    let temp_dir = TempDir::new().unwrap();
    let local = Utf8PathBuf::try_from(temp_dir.path().join("no-main")).unwrap();
    fs::create_dir_all(&local).unwrap();
    fs::write(local.join("package.json"), r#"{ "name": "no-main" }"#).unwrap();

    let server = registry_returning(500, 0).await;
    let mut config = test_config(&temp_dir);
    config.target_path = Some(local);
    let ctx = create_test_context(config, &server);

    let err = init::execute(None, false, &ctx).await.unwrap_err();
    assert!(matches!(err, CookieError::Validation { .. }));
}

#[tokio::test]
async fn test_init_unpublished_package() {
    let temp_dir = TempDir::new().unwrap();
    let server = registry_returning(404, 1).await;
    let ctx = create_test_context(test_config(&temp_dir), &server);

    let err = init::execute(None, true, &ctx).await.unwrap_err();
    assert!(matches!(err, CookieError::PackageNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Resolution);
}

#[tokio::test]
async fn test_resolve_rejects_invalid_request() {
    let temp_dir = TempDir::new().unwrap();
    let server = registry_returning(404, 0).await;
    let ctx = create_test_context(test_config(&temp_dir), &server);

    let err = resolve::execute("Not A Name", "latest", &ctx).await.unwrap_err();
    assert!(matches!(err, CookieError::Validation { .. }));

    let err = resolve::execute("left-pad", "one.two", &ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_update_unpublished_package() {
    let temp_dir = TempDir::new().unwrap();
    let server = registry_returning(404, 1).await;
    let ctx = create_test_context(test_config(&temp_dir), &server);

    let err = resolve::update("left-pad", "^1.0.0", &ctx).await.unwrap_err();
    assert!(matches!(err, CookieError::PackageNotFound { .. }));
}

#[tokio::test]
async fn test_dispatch_reports_errors() {
    let temp_dir = TempDir::new().unwrap();
    let server = registry_returning(404, 1).await;
    let ctx = create_test_context(test_config(&temp_dir), &server);

    let command = Commands::Resolve {
        package: "left-pad".to_string(),
        version: "latest".to_string(),
    };
    assert!(dispatch_command(command, &ctx).await.is_err());
}
