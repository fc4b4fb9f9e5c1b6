//! Cache update orchestration and query surface
//!
//! For every (project, channel) pair in a scope, an update generates the
//! manifest, mirrors the packages it references (when mirroring is on),
//! and persists the manifest. Pairs are processed one at a time and fail
//! independently: a failed pair leaves its previous file untouched.

use crate::catalog::{Channel, Project, Scope};
use crate::error::{RelcacheError, RelcacheResult};
use crate::generator::{GeneratorConfig, ManifestGenerator};
use crate::manifest::{Manifest, Timestamp};
use crate::mirror::{ArtifactMirror, MirrorOutcome};
use crate::store::ManifestStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Counters for one successfully updated pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairSummary {
    /// Packages listed in the manifest
    pub packages: usize,
    /// Artifacts fetched from the remote
    pub downloaded: usize,
    /// Artifacts whose verified local copy was kept
    pub skipped: usize,
    /// Where the manifest was written
    pub path: PathBuf,
}

/// Outcome of updating one pair
#[derive(Debug)]
pub struct PairOutcome {
    pub project: Project,
    pub channel: Channel,
    pub result: Result<PairSummary, RelcacheError>,
}

impl PairOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-pair results of one update invocation, in scope order
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub outcomes: Vec<PairOutcome>,
}

impl UpdateReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(PairOutcome::is_ok)
    }

    /// Scope containing only the failed pairs, for a retry
    pub fn failed(&self) -> Scope {
        self.outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| (o.project.clone(), o.channel))
            .collect()
    }
}

/// What the cache holds for one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Cached,
    Missing,
    /// A file exists but is not a valid manifest
    Malformed,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Cached => "cached",
            CacheState::Missing => "missing",
            CacheState::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache state of one pair
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub project: Project,
    pub channel: Channel,
    pub state: CacheState,
    /// Generation timestamp, when the cached file is valid
    pub last_modified: Option<Timestamp>,
    /// Why a cached file was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CacheStatus {
    pub fn is_cached(&self) -> bool {
        self.state == CacheState::Cached
    }
}

/// Drives updates and answers cache queries
pub struct CacheCoordinator {
    store: ManifestStore,
    generator: Arc<dyn ManifestGenerator>,
    generator_config: GeneratorConfig,
    mirror: Option<ArtifactMirror>,
    mirror_base_url: Option<Url>,
}

impl CacheCoordinator {
    /// Create a coordinator; `mirror: None` disables artifact mirroring
    pub fn new(
        store: ManifestStore,
        generator: Arc<dyn ManifestGenerator>,
        generator_config: GeneratorConfig,
        mirror: Option<ArtifactMirror>,
    ) -> Self {
        Self {
            store,
            generator,
            generator_config,
            mirror,
            mirror_base_url: None,
        }
    }

    /// Rewrite package URLs to `base` in persisted manifests while mirroring
    pub fn with_mirror_base_url(mut self, base: Option<Url>) -> Self {
        self.mirror_base_url = base;
        self
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn mirror_enabled(&self) -> bool {
        self.mirror.is_some()
    }

    /// Update every pair in `scope`, sequentially.
    ///
    /// Returns `Err` only when the cache root or a channel directory cannot
    /// be created, which aborts the invocation. Every other failure,
    /// including artifact storage under the packages root, is recorded in
    /// the report for its pair.
    pub async fn update(&self, scope: &Scope) -> RelcacheResult<UpdateReport> {
        let mut channels: Vec<Channel> = scope.iter().map(|(_, c)| *c).collect();
        channels.sort();
        channels.dedup();
        self.store.ensure_layout(&channels).await?;

        let mut report = UpdateReport::default();
        for (project, channel) in scope.iter() {
            let result = match self.update_pair(project, *channel).await {
                Err(e) if e.is_fatal() => {
                    warn!("Aborting update at {}/{}: {}", project, channel, e);
                    return Err(e);
                }
                other => other,
            };

            match &result {
                Ok(summary) => info!(
                    "Updated {}/{}: {} packages ({} downloaded, {} skipped)",
                    project, channel, summary.packages, summary.downloaded, summary.skipped
                ),
                Err(e) => warn!("Update of {}/{} failed: {}", project, channel, e),
            }

            report.outcomes.push(PairOutcome {
                project: project.clone(),
                channel: *channel,
                result,
            });
        }

        Ok(report)
    }

    async fn update_pair(&self, project: &Project, channel: Channel) -> RelcacheResult<PairSummary> {
        let mut manifest = self
            .generator
            .generate(project, channel, &self.generator_config)
            .await?;

        let count = manifest.packages().len();
        debug!("{}/{} lists {} packages", project, channel, count);

        let mut downloaded = 0;
        let mut skipped = 0;
        if let Some(mirror) = &self.mirror {
            for entry in manifest.packages() {
                match mirror.mirror(entry.package).await? {
                    MirrorOutcome::Downloaded => downloaded += 1,
                    MirrorOutcome::Skipped => skipped += 1,
                }
            }

            if let Some(base) = &self.mirror_base_url {
                manifest.rewrite_urls(base)?;
            }
        }

        let bytes = manifest.to_json_bytes()?;
        let path = self.store.write(channel, project, bytes).await?;

        Ok(PairSummary {
            packages: count,
            downloaded,
            skipped,
            path,
        })
    }

    /// Cached manifest for a pair. Never triggers an update.
    pub async fn manifest_for(&self, project: &Project, channel: Channel) -> RelcacheResult<Manifest> {
        self.store.load(channel, project).await
    }

    /// Generation timestamp of the cached manifest for a pair
    pub async fn last_modified_for(
        &self,
        project: &Project,
        channel: Channel,
    ) -> RelcacheResult<Timestamp> {
        self.store.last_modified(channel, project).await
    }

    /// Cache state of every pair in `scope`.
    ///
    /// Unreadable files are an error rather than a state.
    pub async fn status(&self, scope: &Scope) -> RelcacheResult<Vec<CacheStatus>> {
        let mut statuses = Vec::with_capacity(scope.len());
        for (project, channel) in scope.iter() {
            let (state, last_modified, detail) =
                match self.last_modified_for(project, *channel).await {
                    Ok(ts) => (CacheState::Cached, Some(ts), None),
                    Err(RelcacheError::MissingManifest { .. }) => (CacheState::Missing, None, None),
                    Err(e @ RelcacheError::MalformedManifest { .. }) => {
                        debug!("{}/{} is malformed: {}", project, channel, e);
                        (CacheState::Malformed, None, Some(e.to_string()))
                    }
                    Err(e) => return Err(e),
                };
            statuses.push(CacheStatus {
                project: project.clone(),
                channel: *channel,
                state,
                last_modified,
                detail,
            });
        }
        Ok(statuses)
    }
}
