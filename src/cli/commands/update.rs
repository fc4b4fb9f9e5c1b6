//! Update command - refresh cached manifests from upstream

use super::build_coordinator;
use crate::catalog::{Channel, Project, Scope};
use crate::cli::args::UpdateArgs;
use crate::config::Config;
use crate::error::{RelcacheError, RelcacheResult};
use crate::ui::{self, UiContext};
use tracing::debug;

/// Execute the update command
pub async fn execute(args: UpdateArgs, config: &Config) -> RelcacheResult<()> {
    let mut config = config.clone();
    if args.mirror {
        config.cache.mirror = true;
    }
    if let Some(packages_root) = args.packages_root {
        config.cache.packages_root = packages_root;
    }

    let catalog = config.catalog()?;
    let projects = args
        .projects
        .iter()
        .map(|name| catalog.project(name))
        .collect::<RelcacheResult<Vec<Project>>>()?;
    let channels = args
        .channels
        .iter()
        .map(|name| catalog.channel(name))
        .collect::<RelcacheResult<Vec<Channel>>>()?;
    let scope = Scope::filtered(&catalog, &projects, &channels);
    debug!("Update scope has {} pairs", scope.len());

    let coordinator = build_coordinator(&config)?;
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Updating manifest cache");
    if coordinator.mirror_enabled() {
        ui::key_value(
            &ctx,
            "mirroring into",
            &config.cache.packages_root.display().to_string(),
        );
    }

    let report = coordinator.update(&scope).await?;

    for outcome in &report.outcomes {
        let pair = format!("{}/{}", outcome.project, outcome.channel);
        match &outcome.result {
            Ok(summary) => ui::step_ok_detail(
                &ctx,
                &pair,
                &format!(
                    "{} packages, {} downloaded, {} verified",
                    summary.packages, summary.downloaded, summary.skipped
                ),
            ),
            Err(e) => ui::step_error_detail(&ctx, &pair, &e.to_string()),
        }
    }

    let total = report.outcomes.len();
    let failed = total - report.succeeded();
    if failed > 0 {
        ui::outro_warn(&ctx, &format!("{} of {} pairs failed", failed, total));
        return Err(RelcacheError::UpdateIncomplete { failed, total });
    }

    ui::outro_success(&ctx, &format!("{} pairs up to date", total));
    Ok(())
}
