//! # cookie-cli
//!
//! Scaffolding CLI whose commands are npm packages resolved at run time.
//!
//! This is the main entry point for the `cookie` binary. It parses arguments,
//! prepares the configuration and logging, runs the self-update check and
//! dispatches to the command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use cookie_config::{CliOverrides, ConfigLayering};
use cookie_core::error::{CookieError, CookieResult};
use cookie_resolver::check_global_update;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Name the CLI is published under
pub const TOOL_NAME: &str = "@cookie-cli-dev/core";

/// Scaffolding CLI for JavaScript projects
#[derive(Parser, Debug)]
#[command(name = "cookie", version, about = "Scaffolding CLI for JavaScript projects")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Use a local package instead of installing from the registry
    #[arg(long, global = true, value_name = "PATH")]
    pub target_path: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Initialize a project
    Init {
        project_name: Option<String>,
        /// Overwrite a non-empty directory
        #[arg(short, long)]
        force: bool,
    },
    /// Resolve a package and print its entry file
    Resolve {
        package: String,
        /// Exact version, caret range or `latest`
        #[arg(long, default_value = "latest")]
        version: String,
    },
    /// Install the newest matching version of a package
    Update {
        package: String,
        /// Exact version, caret range or `latest`
        #[arg(long, default_value = "latest")]
        version: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_panic_handler();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> CookieResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CookieError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = prepare(&cli).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

/// Build the configuration, start logging and run the update check
async fn prepare(cli: &Cli) -> CookieResult<CommandContext> {
    let config = ConfigLayering::new()
        .with_env(ConfigLayering::collect_env_overrides())
        .with_cli(CliOverrides {
            debug: cli.debug,
            target_path: cli.target_path.clone(),
        })
        .build()
        .await?;

    setup_logging(config.debug);
    info!("cookie v{}", env!("CARGO_PKG_VERSION"));

    let timeout = config.timeout;
    let ctx = CommandContext::new(config)?;

    if let Some(advisory) = check_global_update(env!("CARGO_PKG_VERSION"), TOOL_NAME, timeout).await {
        ctx.output.warn(&advisory.to_string());
    }

    Ok(ctx)
}

fn setup_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = [
        "cookie",
        "cookie_cli",
        "cookie_core",
        "cookie_config",
        "cookie_registry",
        "cookie_resolver",
        "cookie_store",
    ]
    .iter()
    .map(|target| format!("{}={}", target, level))
    .collect::<Vec<_>>()
    .join(",");

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("cookie encountered an unexpected error: {}", panic_info);
        eprintln!("cookie crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/cookie-cli-dev/cookie-cli/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
