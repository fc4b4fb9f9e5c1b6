//! Persistent manifest storage
//!
//! One JSON file per (project, channel) under the cache root. Files are
//! replaced wholesale on each write and never deleted here.
//!
//! The store assumes a single writer per cache root. Callers that may run
//! overlapping updates must serialize them externally (a scheduler or a
//! lock file around the root).

use crate::catalog::{Channel, Project};
use crate::error::{RelcacheError, RelcacheResult};
use crate::fsutil;
use crate::manifest::{Manifest, Timestamp};
use crate::paths;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-backed manifest store rooted at the cache root
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the manifest file for a pair
    pub fn path(&self, channel: Channel, project: &Project) -> PathBuf {
        paths::manifest_path(&self.root, channel, project)
    }

    /// Create the cache root and one directory per channel
    pub async fn ensure_layout(&self, channels: &[Channel]) -> RelcacheResult<()> {
        for channel in channels {
            let dir = paths::channel_dir(&self.root, *channel);
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| RelcacheError::directory(&dir, e))?;
        }
        debug!("Cache layout ready at {}", self.root.display());
        Ok(())
    }

    /// Persist manifest bytes, replacing any previous file atomically
    pub async fn write(
        &self,
        channel: Channel,
        project: &Project,
        bytes: Vec<u8>,
    ) -> RelcacheResult<PathBuf> {
        let path = self.path(channel, project);
        let dir = paths::channel_dir(&self.root, channel);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| RelcacheError::directory(&dir, e))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || fsutil::atomic_write(&target, &bytes))
            .await
            .map_err(|e| RelcacheError::Internal(format!("manifest write task failed: {}", e)))?
            .map_err(|e| RelcacheError::io(format!("writing manifest {}", path.display()), e))?;

        debug!("Wrote manifest {}", path.display());
        Ok(path)
    }

    /// Raw persisted bytes for a pair
    pub async fn read(&self, channel: Channel, project: &Project) -> RelcacheResult<Vec<u8>> {
        let path = self.path(channel, project);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RelcacheError::MissingManifest {
                project: project.to_string(),
                channel,
            }),
            Err(e) => Err(RelcacheError::io(
                format!("reading manifest {}", path.display()),
                e,
            )),
        }
    }

    /// Read and parse the manifest for a pair
    pub async fn load(&self, channel: Channel, project: &Project) -> RelcacheResult<Manifest> {
        let bytes = self.read(channel, project).await?;
        Manifest::from_slice(&bytes, &self.path(channel, project).display().to_string())
    }

    /// The `run_data.timestamp` of the cached manifest
    pub async fn last_modified(
        &self,
        channel: Channel,
        project: &Project,
    ) -> RelcacheResult<Timestamp> {
        let manifest = self.load(channel, project).await?;
        manifest.timestamp(&self.path(channel, project).display().to_string())
    }

    /// Whether a manifest has been cached for the pair.
    ///
    /// Only a missing file counts as absent; other I/O failures are returned.
    pub async fn exists(&self, channel: Channel, project: &Project) -> RelcacheResult<bool> {
        let path = self.path(channel, project);
        fs::try_exists(&path)
            .await
            .map_err(|e| RelcacheError::io(format!("checking manifest {}", path.display()), e))
    }
}
