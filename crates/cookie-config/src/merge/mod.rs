//! Configuration layering, fallback logic, and environment overrides
//!
//! Layers apply in increasing priority: built-in defaults, the user config
//! file at `<cli_home>/config.toml`, environment variables, then
//! command-line flags. Variables in `<home>/.env` join the environment layer
//! but never replace a variable that is already set. The result is a plain [`CliConfig`] value that is
//! handed to every component instead of re-reading the environment.

use std::collections::HashMap;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cookie_core::error::CookieError;
use cookie_registry::{RegistryClient, RegistryKind, RegistryResult, DEFAULT_TIMEOUT};

use crate::ConfigResult;

/// Directory under the home directory used when `CLI_HOME` is unset
pub const DEFAULT_CLI_HOME: &str = ".cookie-cli";

/// Config file name inside the CLI home
pub const CONFIG_FILE: &str = "config.toml";

/// Dotenv file name inside the home directory
pub const DOTENV_FILE: &str = ".env";

/// Environment variables read by [`ConfigLayering::collect_env_overrides`]
pub const ENV_CLI_HOME: &str = "CLI_HOME";
pub const ENV_TARGET_PATH: &str = "CLI_TARGET_PATH";
pub const ENV_REGISTRY: &str = "COOKIE_REGISTRY";
pub const ENV_DEBUG: &str = "COOKIE_DEBUG";

/// Fully resolved CLI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// User home directory
    pub home: Utf8PathBuf,
    /// Root of everything the CLI writes
    pub cli_home: Utf8PathBuf,
    /// Local package used instead of a registry install
    pub target_path: Option<Utf8PathBuf>,
    /// Verbose logging
    pub debug: bool,
    /// Registry packages are installed from
    pub registry: RegistryKind,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl CliConfig {
    /// Directory holding installed dependencies
    pub fn dependencies_dir(&self) -> Utf8PathBuf {
        self.cli_home.join("dependencies")
    }

    /// Package store root
    pub fn store_dir(&self) -> Utf8PathBuf {
        self.dependencies_dir().join("node_modules")
    }

    /// Path of the user config file
    pub fn config_file(&self) -> Utf8PathBuf {
        self.cli_home.join(CONFIG_FILE)
    }

    /// Registry client for the configured registry and timeout
    pub fn registry_client(&self) -> RegistryResult<RegistryClient> {
        RegistryClient::with_base_url(self.registry.base_url(), self.timeout)
    }
}

/// Contents of `<cli_home>/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `mirror` or `canonical`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Verbose logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl FileConfig {
    /// Parse config file content; `origin` names the source in error messages
    pub fn parse(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| CookieError::validation(origin, e.to_string()))
    }

    /// Load the config file, or `None` when it does not exist
    pub async fn load(path: &Utf8Path) -> ConfigResult<Option<Self>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::parse(&content, path.as_str()).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CookieError::io(format!("Failed to read {}", path), e)),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub debug: bool,
    pub target_path: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
#[derive(Debug, Clone, Default)]
pub struct ConfigLayering {
    /// Home directory; looked up with `dirs` when unset
    home: Option<Utf8PathBuf>,
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// CLI flag overrides
    cli_overrides: CliOverrides,
}

impl ConfigLayering {
    /// Create a new configuration layering system
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `home` instead of the detected home directory
    pub fn with_home(mut self, home: impl Into<Utf8PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Environment variables to apply, usually from [`Self::collect_env_overrides`]
    pub fn with_env(mut self, env_overrides: HashMap<String, String>) -> Self {
        self.env_overrides = env_overrides;
        self
    }

    /// Command-line flags to apply last
    pub fn with_cli(mut self, cli_overrides: CliOverrides) -> Self {
        self.cli_overrides = cli_overrides;
        self
    }

    /// Merge every layer into a [`CliConfig`]
    pub async fn build(self) -> ConfigResult<CliConfig> {
        let home = match self.home {
            Some(home) => home,
            None => detect_home()?,
        };
        if !home.is_dir() {
            return Err(CookieError::validation(
                "home",
                format!("home directory '{}' does not exist", home),
            ));
        }

        let mut env_overrides = self.env_overrides;
        load_dotenv(&home.join(DOTENV_FILE), &mut env_overrides)?;

        // CLI_HOME picks where the config file lives, so it applies first
        let cli_home = match env_overrides.get(ENV_CLI_HOME) {
            Some(dir) if !dir.is_empty() => home.join(dir),
            _ => home.join(DEFAULT_CLI_HOME),
        };

        let mut config = CliConfig {
            home,
            cli_home,
            target_path: None,
            debug: false,
            registry: RegistryKind::default(),
            timeout: DEFAULT_TIMEOUT,
        };

        if let Some(file) = FileConfig::load(&config.config_file()).await? {
            debug!(path = %config.config_file(), "applying config file");
            Self::apply_file_config(&mut config, &file)?;
        }

        Self::apply_env_overrides(&mut config, &env_overrides)?;
        Self::apply_cli_overrides(&mut config, &self.cli_overrides);

        Ok(config)
    }

    fn apply_file_config(config: &mut CliConfig, file: &FileConfig) -> ConfigResult<()> {
        if let Some(registry) = &file.registry {
            config.registry = parse_registry(registry, "registry")?;
        }
        if let Some(secs) = file.timeout_secs {
            if secs == 0 {
                return Err(CookieError::validation("timeout_secs", "must be greater than zero"));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(debug) = file.debug {
            config.debug = debug;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut CliConfig, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_TARGET_PATH if !value.is_empty() => {
                    config.target_path = Some(Utf8PathBuf::from(value));
                },
                ENV_REGISTRY => {
                    config.registry = parse_registry(value, ENV_REGISTRY)?;
                },
                ENV_DEBUG => {
                    config.debug = parse_flag(value, ENV_DEBUG)?;
                },
                _ => {
                    // Handled earlier or unknown, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut CliConfig, overrides: &CliOverrides) {
        if overrides.debug {
            config.debug = true;
        }
        if let Some(target) = &overrides.target_path {
            config.target_path = Some(target.clone());
        }
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars().filter(|(key, _)| is_cli_variable(key)).collect()
    }
}

fn is_cli_variable(key: &str) -> bool {
    key == ENV_CLI_HOME || key == ENV_TARGET_PATH || key.starts_with("COOKIE_")
}

/// Add the CLI variables of a dotenv file that `env` does not already set
fn load_dotenv(path: &Utf8Path, env: &mut HashMap<String, String>) -> ConfigResult<()> {
    if !path.is_file() {
        return Ok(());
    }

    let invalid = |e: dotenvy::Error| CookieError::validation(path.as_str(), e.to_string());
    for item in dotenvy::from_path_iter(path).map_err(invalid)? {
        let (key, value) = item.map_err(invalid)?;
        if is_cli_variable(&key) {
            env.entry(key).or_insert(value);
        }
    }

    debug!(%path, "loaded dotenv file");
    Ok(())
}

fn detect_home() -> ConfigResult<Utf8PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| CookieError::validation("home", "Could not determine home directory"))?;

    Utf8PathBuf::try_from(home_dir)
        .map_err(|e| CookieError::validation("home", format!("Invalid home directory path: {}", e)))
}

fn parse_registry(value: &str, field: &str) -> ConfigResult<RegistryKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mirror" | "npmmirror" => Ok(RegistryKind::Mirror),
        "canonical" | "npm" | "npmjs" => Ok(RegistryKind::Canonical),
        other => Err(CookieError::validation(
            field,
            format!("unknown registry '{}', expected 'mirror' or 'canonical'", other),
        )),
    }
}

fn parse_flag(value: &str, field: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CookieError::validation(field, format!("'{}' is not a boolean", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_home() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let home = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, home)
    }

    #[tokio::test]
    async fn test_defaults() {
        let (_temp, home) = temp_home();
        let config = ConfigLayering::new().with_home(&home).build().await.unwrap();

        assert_eq!(config.cli_home, home.join(".cookie-cli"));
        assert_eq!(config.store_dir(), home.join(".cookie-cli/dependencies/node_modules"));
        assert_eq!(config.registry, RegistryKind::Mirror);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.debug);
        assert!(config.target_path.is_none());
    }

    #[tokio::test]
    async fn test_cli_home_is_relative_to_home() {
        let (_temp, home) = temp_home();
        let env = HashMap::from([(ENV_CLI_HOME.to_string(), ".custom".to_string())]);
        let config = ConfigLayering::new().with_home(&home).with_env(env).build().await.unwrap();

        assert_eq!(config.cli_home, home.join(".custom"));
        assert_eq!(config.dependencies_dir(), home.join(".custom/dependencies"));
    }

    #[tokio::test]
    async fn test_dotenv_sets_cli_home() {
        let (_temp, home) = temp_home();
        let dotenv = "# cookie\nCLI_HOME=.from-dotenv\nCOOKIE_DEBUG=true\nOTHER=x\n";
        tokio::fs::write(home.join(DOTENV_FILE), dotenv).await.unwrap();

        let config = ConfigLayering::new().with_home(&home).build().await.unwrap();
        assert_eq!(config.cli_home, home.join(".from-dotenv"));
        assert!(config.debug);
    }

    #[tokio::test]
    async fn test_environment_beats_dotenv() {
        let (_temp, home) = temp_home();
        let dotenv = "CLI_HOME=.from-dotenv\nCOOKIE_REGISTRY=canonical\n";
        tokio::fs::write(home.join(DOTENV_FILE), dotenv).await.unwrap();

        let env = HashMap::from([(ENV_CLI_HOME.to_string(), ".from-env".to_string())]);
        let config = ConfigLayering::new().with_home(&home).with_env(env).build().await.unwrap();

        assert_eq!(config.cli_home, home.join(".from-env"));
        assert_eq!(config.registry, RegistryKind::Canonical);
    }

    #[tokio::test]
    async fn test_malformed_dotenv() {
        let (_temp, home) = temp_home();
        tokio::fs::write(home.join(DOTENV_FILE), "CLI_HOME='unterminated\n").await.unwrap();

        let err = ConfigLayering::new().with_home(&home).build().await.unwrap_err();
        assert!(matches!(err, CookieError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_layer_precedence() {
        let (_temp, home) = temp_home();
        let cli_home = home.join(".cookie-cli");
        tokio::fs::create_dir_all(&cli_home).await.unwrap();
        tokio::fs::write(
            cli_home.join(CONFIG_FILE),
            "registry = \"canonical\"\ntimeout_secs = 5\ndebug = false\n",
        )
        .await
        .unwrap();

        // File layer alone
        let config = ConfigLayering::new().with_home(&home).build().await.unwrap();
        assert_eq!(config.registry, RegistryKind::Canonical);
        assert_eq!(config.timeout, Duration::from_secs(5));

        // Environment beats the file, flags beat the environment
        let env = HashMap::from([
            (ENV_REGISTRY.to_string(), "mirror".to_string()),
            (ENV_TARGET_PATH.to_string(), "/from/env".to_string()),
        ]);
        let cli = CliOverrides {
            debug: true,
            target_path: Some(Utf8PathBuf::from("/from/flag")),
        };
        let config = ConfigLayering::new()
            .with_home(&home)
            .with_env(env)
            .with_cli(cli)
            .build()
            .await
            .unwrap();

        assert_eq!(config.registry, RegistryKind::Mirror);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.debug);
        assert_eq!(config.target_path, Some(Utf8PathBuf::from("/from/flag")));
    }

    #[tokio::test]
    async fn test_env_debug_flag() {
        let (_temp, home) = temp_home();
        let env = HashMap::from([(ENV_DEBUG.to_string(), "1".to_string())]);
        let config = ConfigLayering::new().with_home(&home).with_env(env).build().await.unwrap();
        assert!(config.debug);

        let env = HashMap::from([(ENV_DEBUG.to_string(), "maybe".to_string())]);
        let err = ConfigLayering::new().with_home(&home).with_env(env).build().await.unwrap_err();
        assert!(matches!(err, CookieError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_home_is_validation_error() {
        let (_temp, home) = temp_home();
        let err = ConfigLayering::new()
            .with_home(home.join("does-not-exist"))
            .build()
            .await
            .unwrap_err();

        match err {
            CookieError::Validation { field, .. } => assert_eq!(field, "home"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_config_file() {
        let (_temp, home) = temp_home();
        let cli_home = home.join(".cookie-cli");
        tokio::fs::create_dir_all(&cli_home).await.unwrap();
        tokio::fs::write(cli_home.join(CONFIG_FILE), "registry = \"somewhere\"\n").await.unwrap();

        let err = ConfigLayering::new().with_home(&home).build().await.unwrap_err();
        assert!(matches!(err, CookieError::Validation { .. }));

        tokio::fs::write(cli_home.join(CONFIG_FILE), "unknown_key = 1\n").await.unwrap();
        let err = ConfigLayering::new().with_home(&home).build().await.unwrap_err();
        assert!(matches!(err, CookieError::Validation { .. }));
    }

    #[test]
    fn test_collect_env_overrides() {
        std::env::set_var("COOKIE_TEST_MARKER", "1");
        std::env::set_var("NOT_COOKIE_VAR", "ignored");

        let overrides = ConfigLayering::collect_env_overrides();

        assert!(overrides.contains_key("COOKIE_TEST_MARKER"));
        assert!(!overrides.contains_key("NOT_COOKIE_VAR"));

        std::env::remove_var("COOKIE_TEST_MARKER");
        std::env::remove_var("NOT_COOKIE_VAR");
    }
}
