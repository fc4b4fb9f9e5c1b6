//! Manifest generation
//!
//! The authoritative manifest for a project and channel comes from the
//! remote release service. Which endpoint and backend to use is decided by
//! the caller and passed in as a [`GeneratorConfig`] on every call.

use crate::catalog::{Channel, Project};
use crate::config::schema::UpstreamConfig;
use crate::error::{RelcacheError, RelcacheResult};
use crate::manifest::{Manifest, RunData};
use crate::transport::{http_agent, transport_error};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Largest manifest body accepted from the upstream
const MAX_MANIFEST_BYTES: u64 = 64 * 1024 * 1024;

/// Backend flavor served by the upstream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Default release service
    Legacy,
    /// Unified artifact backend, used together with mirroring
    Unified,
}

/// Per-call settings for manifest generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: Url,
    pub backend: BackendMode,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Select endpoint and backend; mirroring switches to the unified backend
    pub fn from_upstream(upstream: &UpstreamConfig, mirror_enabled: bool) -> RelcacheResult<Self> {
        let (raw, backend) = if mirror_enabled {
            (&upstream.mirror_endpoint, BackendMode::Unified)
        } else {
            (&upstream.endpoint, BackendMode::Legacy)
        };

        let endpoint = Url::parse(raw).map_err(|e| RelcacheError::ConfigInvalid {
            path: "upstream".into(),
            reason: format!("invalid endpoint {}: {}", raw, e),
        })?;

        Ok(Self {
            endpoint,
            backend,
            timeout: Duration::from_secs(upstream.timeout_secs.max(1)),
        })
    }

    /// `{endpoint}/{channel}/{project}/packages`
    pub fn packages_url(&self, project: &Project, channel: Channel) -> RelcacheResult<Url> {
        let raw = format!(
            "{}/{}/{}/packages",
            self.endpoint.as_str().trim_end_matches('/'),
            channel,
            project
        );
        let mut url = Url::parse(&raw).map_err(|e| RelcacheError::Internal(e.to_string()))?;
        if self.backend == BackendMode::Unified {
            url.query_pairs_mut().append_pair("backend", "unified");
        }
        Ok(url)
    }
}

/// Produces the canonical manifest for a project and channel
#[async_trait]
pub trait ManifestGenerator: Send + Sync {
    async fn generate(
        &self,
        project: &Project,
        channel: Channel,
        config: &GeneratorConfig,
    ) -> RelcacheResult<Manifest>;
}

/// Fetches the package tree over HTTP and stamps the generation time
#[derive(Debug, Clone, Default)]
pub struct HttpManifestGenerator;

impl HttpManifestGenerator {
    pub fn new() -> Self {
        Self
    }
}

/// Add `run_data.timestamp` unless the upstream already supplied one
pub fn stamp(manifest: &mut Manifest, now: chrono::DateTime<Utc>) {
    let run_data = manifest.run_data.get_or_insert_with(RunData::default);
    if run_data.timestamp.is_none() {
        run_data.timestamp = Some(now.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
}

#[async_trait]
impl ManifestGenerator for HttpManifestGenerator {
    async fn generate(
        &self,
        project: &Project,
        channel: Channel,
        config: &GeneratorConfig,
    ) -> RelcacheResult<Manifest> {
        let url = config.packages_url(project, channel)?;
        let agent = http_agent(config.timeout);

        debug!("Generating manifest for {}/{} from {}", project, channel, url);
        let body = tokio::task::spawn_blocking({
            let url = url.clone();
            move || -> RelcacheResult<Vec<u8>> {
                let mut response = agent
                    .get(url.as_str())
                    .call()
                    .map_err(|e| transport_error(&url, e))?;
                response
                    .body_mut()
                    .with_config()
                    .limit(MAX_MANIFEST_BYTES)
                    .read_to_vec()
                    .map_err(|e| transport_error(&url, e))
            }
        })
        .await
        .map_err(|e| RelcacheError::Internal(format!("manifest request task failed: {}", e)))??;

        let mut manifest = Manifest::from_slice(&body, url.as_str())?;
        stamp(&mut manifest, Utc::now());
        Ok(manifest)
    }
}
