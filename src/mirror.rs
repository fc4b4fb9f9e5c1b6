//! Artifact mirroring
//!
//! Each package URI maps to `{packages_root}/{uri path}`. A local file whose
//! SHA-256 matches the descriptor's checksum is kept as is; anything else is
//! fetched again through the injected transport.

use crate::error::{RelcacheError, RelcacheResult};
use crate::fsutil;
use crate::manifest::PackageDescriptor;
use crate::paths;
use crate::transport::ArtifactTransport;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

/// Result of mirroring one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// Fetched from the remote
    Downloaded,
    /// Local copy already matched the checksum
    Skipped,
}

/// Mirrors package artifacts onto local storage
#[derive(Clone)]
pub struct ArtifactMirror {
    packages_root: PathBuf,
    transport: Arc<dyn ArtifactTransport>,
}

impl ArtifactMirror {
    pub fn new(packages_root: impl Into<PathBuf>, transport: Arc<dyn ArtifactTransport>) -> Self {
        Self {
            packages_root: packages_root.into(),
            transport,
        }
    }

    pub fn packages_root(&self) -> &Path {
        &self.packages_root
    }

    /// Ensure the artifact behind `package` exists locally with good content
    pub async fn mirror(&self, package: &PackageDescriptor) -> RelcacheResult<MirrorOutcome> {
        let uri = Url::parse(&package.url).map_err(|e| RelcacheError::InvalidArtifactUri {
            uri: package.url.clone(),
            reason: e.to_string(),
        })?;
        let dest = paths::artifact_path(&self.packages_root, &uri)?;
        let expected = package.sha256.as_deref().map(str::to_ascii_lowercase);

        if let Some(ref expected) = expected {
            if let Some(actual) = local_checksum(&dest).await? {
                if &actual == expected {
                    debug!("Skipping {}, local copy verified", uri);
                    return Ok(MirrorOutcome::Skipped);
                }
                debug!("Local copy of {} is stale, re-fetching", uri);
            }
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| RelcacheError::ArtifactStorage {
                    uri: uri.to_string(),
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        info!("Downloading {}", uri);
        self.transport.fetch(&uri, &dest).await?;

        if let Some(expected) = expected {
            let actual = local_checksum(&dest).await?.unwrap_or_default();
            if actual != expected {
                return Err(RelcacheError::ChecksumMismatch {
                    uri: uri.to_string(),
                    expected,
                    actual,
                });
            }
        }

        Ok(MirrorOutcome::Downloaded)
    }
}

/// SHA-256 of a local file, or `None` if it doesn't exist
async fn local_checksum(path: &Path) -> RelcacheResult<Option<String>> {
    let target = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || fsutil::sha256_file(&target))
        .await
        .map_err(|e| RelcacheError::Internal(format!("checksum task failed: {}", e)))?;

    match digest {
        Ok(digest) => Ok(Some(digest)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RelcacheError::io(format!("hashing {}", path.display()), e)),
    }
}
