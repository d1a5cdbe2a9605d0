//! `cookie init` command implementation.
//!
//! Resolves the init package, from the registry or from `--target-path`, and
//! reports the entry file the scaffolding step loads.

use url::Url;

use cookie_core::error::{CookieError, CookieResult};

use super::CommandContext;

/// Package implementing project initialization
pub const INIT_PACKAGE: &str = "@cookie-cli-dev/init";

/// Execute the `cookie init` command
pub async fn execute(project_name: Option<String>, force: bool, ctx: &CommandContext) -> CookieResult<Url> {
    let mut descriptor = ctx.descriptor(INIT_PACKAGE, "latest")?;
    if let Some(target) = &ctx.config.target_path {
        ctx.output.info(&format!("Using local package at {}", target));
        descriptor = descriptor.with_target_path(target.clone());
    }

    let entry = ctx
        .store
        .entry_point(&descriptor)
        .await?
        .ok_or_else(|| CookieError::validation("main", format!("{} declares no entry file", INIT_PACKAGE)))?;

    let project = project_name.as_deref().unwrap_or(".");
    ctx.output.step("🍪", &format!("Initializing {} (force: {})", project, force));
    ctx.output.success(entry.as_str());

    Ok(entry)
}
