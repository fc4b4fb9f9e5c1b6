//! Init command - create the cache directory layout

use crate::config::Config;
use crate::error::RelcacheResult;
use crate::store::ManifestStore;
use crate::ui::{self, UiContext};

/// Execute the init command
pub async fn execute(config: &Config) -> RelcacheResult<()> {
    let catalog = config.catalog()?;
    let store = ManifestStore::new(config.cache.root.clone());
    store.ensure_layout(catalog.channels()).await?;

    let ctx = UiContext::detect();
    ui::step_ok_detail(
        &ctx,
        "Cache layout ready",
        &store.root().display().to_string(),
    );
    Ok(())
}
