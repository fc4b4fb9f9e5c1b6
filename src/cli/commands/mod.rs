//! CLI command implementations

pub mod completions;
pub mod config;
pub mod init;
pub mod query;
pub mod status;
pub mod update;

pub use completions::execute as completions;
pub use config::execute as config;
pub use init::execute as init;
pub use query::{last_modified, show};
pub use status::execute as status;
pub use update::execute as update;

use crate::config::Config;
use crate::coordinator::CacheCoordinator;
use crate::error::RelcacheResult;
use crate::generator::{GeneratorConfig, HttpManifestGenerator};
use crate::mirror::ArtifactMirror;
use crate::store::ManifestStore;
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;

/// Wire a coordinator with the HTTP collaborators described by `config`
pub fn build_coordinator(config: &Config) -> RelcacheResult<CacheCoordinator> {
    let mirror_enabled = config.cache.mirror;
    let generator_config = GeneratorConfig::from_upstream(&config.upstream, mirror_enabled)?;

    let mirror = mirror_enabled.then(|| {
        let transport = HttpTransport::new(Duration::from_secs(config.upstream.timeout_secs.max(1)));
        ArtifactMirror::new(config.cache.packages_root.clone(), Arc::new(transport))
    });

    let coordinator = CacheCoordinator::new(
        ManifestStore::new(config.cache.root.clone()),
        Arc::new(HttpManifestGenerator::new()),
        generator_config,
        mirror,
    )
    .with_mirror_base_url(config.mirror_base_url()?);

    Ok(coordinator)
}
