//! Deterministic on-disk locations for manifests and mirrored artifacts
//!
//! Writers and readers both go through these functions, so whatever is
//! written is exactly what is later read.

use crate::catalog::{Channel, Project};
use crate::error::{RelcacheError, RelcacheResult};
use std::path::{Path, PathBuf};
use url::Url;

/// Directory holding all manifests of one channel
pub fn channel_dir(root: &Path, channel: Channel) -> PathBuf {
    root.join(channel.as_str())
}

/// `{root}/{channel}/{project}-manifest.json`
pub fn manifest_path(root: &Path, channel: Channel, project: &Project) -> PathBuf {
    channel_dir(root, channel).join(format!("{}-manifest.json", project))
}

/// Local path of a mirrored artifact: the URI's path rooted under `packages_root`
pub fn artifact_path(packages_root: &Path, uri: &Url) -> RelcacheResult<PathBuf> {
    let invalid = |reason: &str| RelcacheError::InvalidArtifactUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let segments = uri
        .path_segments()
        .ok_or_else(|| invalid("URI has no path"))?;

    let mut path = packages_root.to_path_buf();
    let mut depth = 0usize;
    for segment in segments.filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(invalid("path traversal segment"));
        }
        path.push(segment);
        depth += 1;
    }

    if depth == 0 {
        return Err(invalid("URI path is empty"));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn manifest_path_layout() {
        let catalog = Catalog::new(["widget"]).unwrap();
        let widget = catalog.project("widget").unwrap();
        assert_eq!(
            manifest_path(Path::new("/tmp/cache"), Channel::Stable, &widget),
            PathBuf::from("/tmp/cache/stable/widget-manifest.json")
        );
    }

    #[test]
    fn artifact_path_mirrors_uri_path() {
        let uri = Url::parse("https://example.test/widget/1.0/linux/x64/pkg.tar.gz").unwrap();
        assert_eq!(
            artifact_path(Path::new("./packages"), &uri).unwrap(),
            PathBuf::from("./packages/widget/1.0/linux/x64/pkg.tar.gz")
        );
    }

    #[test]
    fn artifact_path_ignores_query() {
        let uri = Url::parse("https://example.test/a/b.rpm?token=x").unwrap();
        assert_eq!(
            artifact_path(Path::new("/p"), &uri).unwrap(),
            PathBuf::from("/p/a/b.rpm")
        );
    }

    #[test]
    fn artifact_path_rejects_empty_path() {
        let uri = Url::parse("https://example.test/").unwrap();
        assert!(matches!(
            artifact_path(Path::new("/p"), &uri),
            Err(RelcacheError::InvalidArtifactUri { .. })
        ));
    }

    #[test]
    fn artifact_path_stays_under_root() {
        let uri = Url::parse("https://example.test/a/../../b.rpm").unwrap();
        let path = artifact_path(Path::new("/p"), &uri).unwrap();
        assert_eq!(path, PathBuf::from("/p/b.rpm"));
    }
}
