//! Typed package manifest
//!
//! A manifest is a JSON object whose keys are platform names, plus the
//! reserved `run_data` key carrying generation metadata. Below each platform
//! sit the platform version, the architecture and the product version:
//!
//! ```json
//! {
//!   "ubuntu": {
//!     "16.04": {
//!       "x86_64": { "12.19.36": { "url": "...", "sha256": "..." } }
//!     }
//!   },
//!   "run_data": { "timestamp": "2024-01-01T00:00:00Z" }
//! }
//! ```
//!
//! Every map level keeps insertion order, so flattening and serialization
//! are deterministic.

use crate::error::{RelcacheError, RelcacheResult};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// product version -> package
pub type ProductMap = IndexMap<String, PackageDescriptor>;
/// architecture -> product version -> package
pub type ArchMap = IndexMap<String, ProductMap>;
/// platform version -> architecture -> product version -> package
pub type VersionMap = IndexMap<String, ArchMap>;
/// platform -> platform version -> architecture -> product version -> package
pub type PackageTree = IndexMap<String, VersionMap>;

/// A single downloadable artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Source URI of the artifact
    pub url: String,

    /// Hex SHA-256 of the artifact, when the upstream publishes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    /// Fields we don't interpret, kept so rewrites are lossless
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sha256: None,
            sha1: None,
            extra: Map::new(),
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// Metadata about the generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generation timestamp as stored in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the stored value as RFC 3339, if it is one
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One leaf of the package tree together with its coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageEntry<'a> {
    pub platform: &'a str,
    pub platform_version: &'a str,
    pub arch: &'a str,
    pub product_version: &'a str,
    pub package: &'a PackageDescriptor,
}

/// Package manifest for one project and channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(flatten)]
    pub platforms: PackageTree,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_data: Option<RunData>,
}

impl Manifest {
    /// Create a manifest from a package tree and a generation timestamp
    pub fn new(platforms: PackageTree, timestamp: impl Into<String>) -> Self {
        Self {
            platforms,
            run_data: Some(RunData {
                timestamp: Some(timestamp.into()),
                extra: Map::new(),
            }),
        }
    }

    /// Parse manifest bytes; `origin` names the source in error messages
    pub fn from_slice(bytes: &[u8], origin: &str) -> RelcacheResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| RelcacheError::malformed(origin, e.to_string()))
    }

    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json_bytes(&self) -> RelcacheResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Flatten the four map levels into entries, in insertion order
    pub fn packages(&self) -> Vec<PackageEntry<'_>> {
        let mut entries = Vec::new();
        for (platform, versions) in &self.platforms {
            for (platform_version, arches) in versions {
                for (arch, products) in arches {
                    for (product_version, package) in products {
                        entries.push(PackageEntry {
                            platform,
                            platform_version,
                            arch,
                            product_version,
                            package,
                        });
                    }
                }
            }
        }
        entries
    }

    /// The `run_data.timestamp` value
    pub fn timestamp(&self, origin: &str) -> RelcacheResult<Timestamp> {
        let run_data = self
            .run_data
            .as_ref()
            .ok_or_else(|| RelcacheError::malformed(origin, "missing run_data"))?;

        match run_data.timestamp.as_deref() {
            Some(ts) if !ts.trim().is_empty() => Ok(Timestamp(ts.to_string())),
            Some(_) => Err(RelcacheError::malformed(origin, "empty run_data.timestamp")),
            None => Err(RelcacheError::malformed(origin, "missing run_data.timestamp")),
        }
    }

    /// Point every package URL at `base`, keeping the original path and query
    pub fn rewrite_urls(&mut self, base: &Url) -> RelcacheResult<()> {
        let prefix = base.as_str().trim_end_matches('/');

        let packages = self
            .platforms
            .values_mut()
            .flat_map(|versions| versions.values_mut())
            .flat_map(|arches| arches.values_mut())
            .flat_map(|products| products.values_mut());

        for package in packages {
            let source = Url::parse(&package.url).map_err(|e| RelcacheError::InvalidArtifactUri {
                uri: package.url.clone(),
                reason: e.to_string(),
            })?;

            let mut rewritten = format!("{}{}", prefix, source.path());
            if let Some(query) = source.query() {
                rewritten.push('?');
                rewritten.push_str(query);
            }
            package.url = rewritten;
        }
        Ok(())
    }
}
