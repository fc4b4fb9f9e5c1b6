//! Error types for relcache
//!
//! All modules use `RelcacheResult<T>` as their return type.

use crate::catalog::Channel;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relcache operations
pub type RelcacheResult<T> = Result<T, RelcacheError>;

/// All errors that can occur in relcache
#[derive(Error, Debug)]
pub enum RelcacheError {
    // Cache errors
    #[error("Can not find the manifest file for '{project}' - '{channel}'")]
    MissingManifest { project: String, channel: Channel },

    #[error("Malformed manifest {path}: {reason}")]
    MalformedManifest { path: String, reason: String },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Update failed for {failed} of {total} pairs")]
    UpdateIncomplete { failed: usize, total: usize },

    // Transport errors
    #[error("Transfer failed for {uri}: {reason}")]
    TransportFailure { uri: String, reason: String },

    #[error("Checksum mismatch for {uri}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid artifact URI {uri}: {reason}")]
    InvalidArtifactUri { uri: String, reason: String },

    #[error("Cannot store artifact {uri} under {path}: {source}")]
    ArtifactStorage {
        uri: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Catalog errors
    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a directory creation error
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryError {
            path: path.into(),
            source,
        }
    }

    /// Create a transport failure for a URI
    pub fn transport(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed manifest error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable by re-running the update for the same pair
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure { .. } | Self::ChecksumMismatch { .. }
        )
    }

    /// Cache directory errors abort the whole update invocation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DirectoryError { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingManifest { .. } => Some("Run: relcache update"),
            Self::MalformedManifest { .. } => {
                Some("The cached file is corrupt or from another schema; re-run: relcache update")
            }
            Self::TransportFailure { .. } => Some("Check network access to the upstream endpoint"),
            Self::DirectoryError { .. } => Some("Check permissions and free space of the cache root"),
            Self::ArtifactStorage { .. } => {
                Some("Check permissions and free space of the packages root")
            }
            Self::UpdateIncomplete { .. } => Some("Re-run the update to retry the failed pairs"),
            Self::UnknownProject(_) | Self::UnknownChannel(_) => {
                Some("Run: relcache status --format plain to list known pairs")
            }
            _ => None,
        }
    }
}
