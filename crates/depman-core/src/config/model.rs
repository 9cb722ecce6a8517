use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One remote package repository. Order among descriptors is precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub layout: String,
    pub url: String,
    pub allow_snapshots: bool,
}

impl RepositoryDescriptor {
    pub fn new(
        id: impl Into<String>,
        layout: impl Into<String>,
        url: impl Into<String>,
        allow_snapshots: bool,
    ) -> Self {
        Self {
            id: id.into(),
            layout: layout.into(),
            url: url.into(),
            allow_snapshots,
        }
    }

    /// Maven Central, used when no repository configuration is supplied.
    pub fn central() -> Self {
        Self::new(
            super::consts::CENTRAL_ID,
            super::consts::DEFAULT_LAYOUT,
            super::consts::CENTRAL_URL,
            false,
        )
    }
}

/// Entry of the `repositories` array as written in the configuration file.
///
/// Every field is optional at the serde level so that a missing `id` or `url`
/// is reported by name rather than as a generic parse failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RepositoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snapshots: Option<bool>,
}

/// Known package name (`group:name`) to default version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionMap(BTreeMap<String, String>);

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coordinate: &str) -> Option<&str> {
        self.0.get(coordinate).map(String::as_str)
    }

    pub fn contains(&self, coordinate: &str) -> bool {
        self.0.contains_key(coordinate)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VersionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
