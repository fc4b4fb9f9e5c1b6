//! Known projects, release channels, and update scopes
//!
//! Both catalogs are closed sets fixed at process start. A [`Scope`] is an
//! ordered selection of (project, channel) pairs drawn from them.

use crate::error::{RelcacheError, RelcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in product catalog used when configuration does not override it
pub const DEFAULT_PROJECTS: &[&str] = &[
    "angrychef",
    "automate",
    "chef",
    "chef-server",
    "chefdk",
    "compliance",
    "delivery",
    "ha",
    "inspec",
    "manage",
    "omnibus-toolchain",
    "push-jobs-client",
    "push-jobs-server",
    "reporting",
    "supermarket",
];

/// Release channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Unpromoted builds
    Current,
    /// Promoted releases
    Stable,
}

impl Channel {
    /// All channels in cache layout order
    pub fn all() -> &'static [Self] {
        &[Self::Current, Self::Stable]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = RelcacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Self::Current),
            "stable" => Ok(Self::Stable),
            other => Err(RelcacheError::UnknownChannel(other.to_string())),
        }
    }
}

/// Project identifier from the product catalog
///
/// Only constructed through [`Catalog`], so every value is a known product
/// whose name is safe to use as a file name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Project(String);

impl Project {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn valid_project_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// The fixed set of projects and channels known to this process
#[derive(Debug, Clone)]
pub struct Catalog {
    projects: Vec<Project>,
    channels: Vec<Channel>,
}

impl Catalog {
    /// Build a catalog from project names, using every known channel
    pub fn new<I, S>(projects: I) -> RelcacheResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<Project> = Vec::new();
        for name in projects {
            let name = name.as_ref().trim();
            if !valid_project_name(name) {
                return Err(RelcacheError::UnknownProject(name.to_string()));
            }
            let project = Project(name.to_string());
            if !list.contains(&project) {
                list.push(project);
            }
        }

        Ok(Self {
            projects: list,
            channels: Channel::all().to_vec(),
        })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Look up a project by name
    pub fn project(&self, name: &str) -> RelcacheResult<Project> {
        self.projects
            .iter()
            .find(|p| p.as_str() == name)
            .cloned()
            .ok_or_else(|| RelcacheError::UnknownProject(name.to_string()))
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> RelcacheResult<Channel> {
        let channel: Channel = name.parse()?;
        if self.channels.contains(&channel) {
            Ok(channel)
        } else {
            Err(RelcacheError::UnknownChannel(name.to_string()))
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            projects: DEFAULT_PROJECTS
                .iter()
                .map(|name| Project((*name).to_string()))
                .collect(),
            channels: Channel::all().to_vec(),
        }
    }
}

/// Ordered, duplicate-free set of (project, channel) pairs to update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pairs: Vec<(Project, Channel)>,
}

impl Scope {
    /// Every known project crossed with every known channel
    pub fn full(catalog: &Catalog) -> Self {
        Self::filtered(catalog, &[], &[])
    }

    /// Cross product restricted to the given projects and channels.
    /// An empty slice selects the whole axis.
    pub fn filtered(catalog: &Catalog, projects: &[Project], channels: &[Channel]) -> Self {
        let mut scope = Self::default();
        for project in catalog.projects() {
            if !projects.is_empty() && !projects.contains(project) {
                continue;
            }
            for channel in catalog.channels() {
                if !channels.is_empty() && !channels.contains(channel) {
                    continue;
                }
                scope.insert(project.clone(), *channel);
            }
        }
        scope
    }

    /// Add a pair, ignoring duplicates
    pub fn insert(&mut self, project: Project, channel: Channel) {
        if !self.contains(&project, channel) {
            self.pairs.push((project, channel));
        }
    }

    pub fn contains(&self, project: &Project, channel: Channel) -> bool {
        self.pairs
            .iter()
            .any(|(p, c)| p == project && *c == channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Project, Channel)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(Project, Channel)> for Scope {
    fn from_iter<T: IntoIterator<Item = (Project, Channel)>>(iter: T) -> Self {
        let mut scope = Self::default();
        for (project, channel) in iter {
            scope.insert(project, channel);
        }
        scope
    }
}
