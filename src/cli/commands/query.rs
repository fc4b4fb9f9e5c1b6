//! Show and last-modified commands - read the cache without refreshing

use super::build_coordinator;
use crate::cli::args::QueryArgs;
use crate::config::Config;
use crate::error::RelcacheResult;

/// Print the cached manifest as JSON
pub async fn show(args: QueryArgs, config: &Config) -> RelcacheResult<()> {
    let catalog = config.catalog()?;
    let project = catalog.project(&args.project)?;
    let channel = catalog.channel(&args.channel)?;

    let manifest = build_coordinator(config)?
        .manifest_for(&project, channel)
        .await?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

/// Print the manifest's generation timestamp
pub async fn last_modified(args: QueryArgs, config: &Config) -> RelcacheResult<()> {
    let catalog = config.catalog()?;
    let project = catalog.project(&args.project)?;
    let channel = catalog.channel(&args.channel)?;

    let timestamp = build_coordinator(config)?
        .last_modified_for(&project, channel)
        .await?;
    println!("{}", timestamp);
    Ok(())
}
