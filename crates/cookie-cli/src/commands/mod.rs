//! Command implementations and dispatch logic.
//!
//! Each command is an async function that takes a [`CommandContext`].

use tracing::info;

use cookie_config::CliConfig;
use cookie_core::error::CookieResult;
use cookie_core::types::PackageDescriptor;
use cookie_registry::RegistryClient;
use cookie_store::PackageStore;

pub mod init;
pub mod resolve;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub config: CliConfig,
    pub store: PackageStore,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a context talking to the configured registry
    pub fn new(config: CliConfig) -> CookieResult<Self> {
        let client = config.registry_client()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a context around an existing registry client
    pub fn with_client(config: CliConfig, client: RegistryClient) -> Self {
        Self {
            config,
            store: PackageStore::new(client),
            output: OutputHandler::new(),
        }
    }

    /// Descriptor for `package` under the configured store
    pub fn descriptor(&self, package: &str, version: &str) -> CookieResult<PackageDescriptor> {
        PackageDescriptor::new(package, version, self.config.store_dir())
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> CookieResult<()> {
    match command {
        Commands::Init { project_name, force } => {
            info!("Initializing project {:?} (force: {})", project_name, force);
            init::execute(project_name, force, ctx).await.map(|_| ())
        },
        Commands::Resolve { package, version } => {
            info!("Resolving {}@{}", package, version);
            resolve::execute(&package, &version, ctx).await.map(|_| ())
        },
        Commands::Update { package, version } => {
            info!("Updating {}@{}", package, version);
            resolve::update(&package, &version, ctx).await.map(|_| ())
        },
    }
}
