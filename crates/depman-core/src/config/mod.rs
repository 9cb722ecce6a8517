//! Repository configuration store
//!
//! Holds the ordered list of remote repositories and the map of known package
//! versions. Both are read once, when a resolution coordinator is built, and
//! never change afterwards.
//!
//! Missing or unreadable configuration files fall back to defaults (Maven
//! Central, empty version map). Files that exist but are malformed are
//! configuration errors.

pub mod consts;
mod model;

pub use model::{RepositoryDescriptor, VersionMap};

use crate::error::{DepmanError, Result};
use model::RepositoryEntry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    repositories: Vec<RepositoryDescriptor>,
    versions: VersionMap,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repositories: default_repositories(),
            versions: VersionMap::new(),
        }
    }
}

impl RepositoryConfig {
    pub fn new(repositories: Vec<RepositoryDescriptor>, versions: VersionMap) -> Self {
        Self {
            repositories,
            versions,
        }
    }

    /// Loads configuration from the paths named by
    /// [`consts::REPOSITORIES_CFG_ENV`] and [`consts::VERSIONS_CFG_ENV`].
    pub fn from_env() -> Result<Self> {
        let repositories = env_path(consts::REPOSITORIES_CFG_ENV);
        let versions = env_path(consts::VERSIONS_CFG_ENV);
        Self::load(repositories.as_deref(), versions.as_deref())
    }

    /// Loads configuration from explicit file paths. `None` selects the default.
    pub fn load(repositories: Option<&Path>, versions: Option<&Path>) -> Result<Self> {
        let repositories = match repositories {
            Some(path) => read_repositories(path)?,
            None => default_repositories(),
        };
        let versions = match versions {
            Some(path) => read_versions(path)?,
            None => VersionMap::new(),
        };

        Ok(Self {
            repositories,
            versions,
        })
    }

    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        &self.repositories
    }

    pub fn versions(&self) -> &VersionMap {
        &self.versions
    }
}

fn default_repositories() -> Vec<RepositoryDescriptor> {
    vec![RepositoryDescriptor::central()]
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Reads a configuration file, returning `None` when it is absent or
/// cannot be read.
fn read_optional(path: &Path, what: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "{what} file not found, using defaults");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "{what} file is unreadable, using defaults");
            None
        }
    }
}

fn read_repositories(path: &Path) -> Result<Vec<RepositoryDescriptor>> {
    let Some(content) = read_optional(path, "repository configuration") else {
        return Ok(default_repositories());
    };
    parse_repositories(&content, path)
}

fn parse_repositories(content: &str, path: &Path) -> Result<Vec<RepositoryDescriptor>> {
    let invalid = |reason: String| DepmanError::ConfigInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let root: serde_json::Value =
        serde_json::from_str(content).map_err(|source| DepmanError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    let object = root
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object at the top level".to_string()))?;

    let entries = match object.get("repositories") {
        None | Some(serde_json::Value::Null) => return Ok(default_repositories()),
        Some(serde_json::Value::Array(entries)) => entries,
        Some(_) => {
            return Err(invalid(
                "the 'repositories' value should be an array of objects".to_string(),
            ));
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let entry: RepositoryEntry = serde_json::from_value(value.clone())
                .map_err(|e| invalid(format!("repositories[{idx}]: {e}")))?;

            let id = entry
                .id
                .ok_or_else(|| invalid(format!("repositories[{idx}]: missing repository 'id' value")))?;
            let url = entry.url.ok_or_else(|| {
                invalid(format!("repositories[{idx}] ({id}): missing repository 'url' value"))
            })?;
            let layout = entry
                .layout
                .unwrap_or_else(|| consts::DEFAULT_LAYOUT.to_string());

            Ok(RepositoryDescriptor {
                id,
                layout,
                url,
                allow_snapshots: entry.snapshots.unwrap_or(true),
            })
        })
        .collect()
}

fn read_versions(path: &Path) -> Result<VersionMap> {
    let Some(content) = read_optional(path, "package version map") else {
        return Ok(VersionMap::new());
    };

    let map: BTreeMap<String, String> =
        serde_json::from_str(&content).map_err(|source| DepmanError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(map.into_iter().collect())
}
