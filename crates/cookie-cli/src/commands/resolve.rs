//! `cookie resolve` and `cookie update` command implementations.

use cookie_core::error::CookieResult;
use cookie_core::types::InstalledPackage;
use cookie_store::UpdateOutcome;

use super::CommandContext;

/// Execute the `cookie resolve` command
pub async fn execute(package: &str, version: &str, ctx: &CommandContext) -> CookieResult<InstalledPackage> {
    let descriptor = ctx.descriptor(package, version)?;
    let installed = ctx.store.resolve_package(&descriptor).await?;

    ctx.output.step("📦", &format!("{}@{}", installed.name, installed.version));
    ctx.output.info(&format!("Installed at {}", installed.root_dir));
    match &installed.main_entry {
        Some(entry) => ctx.output.success(entry.as_str()),
        None => ctx.output.warn("Package declares no entry file"),
    }

    Ok(installed)
}

/// Execute the `cookie update` command
pub async fn update(package: &str, version: &str, ctx: &CommandContext) -> CookieResult<UpdateOutcome> {
    let descriptor = ctx.descriptor(package, version)?;
    let outcome = ctx.store.update(&descriptor).await?;

    match &outcome {
        UpdateOutcome::Installed(installed) => {
            ctx.output.success(&format!("Installed {}@{}", installed.name, installed.version));
        },
        UpdateOutcome::Unchanged(installed) => {
            ctx.output.info(&format!("{}@{} is already the newest version", installed.name, installed.version));
        },
    }

    Ok(outcome)
}
