//! Resolution results

use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Identity of a resolved dependency: where it came from, or what it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Identity {
    /// Direct link, identified by its URI
    Uri { uri: Url },
    /// Repository artifact, identified by its coordinate
    Artifact {
        group: String,
        name: String,
        version: String,
    },
}

/// A resolved dependency: a local file plus exactly one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResolvedEntity {
    pub path: PathBuf,
    pub identity: Identity,
}

impl ResolvedEntity {
    pub fn from_uri(path: PathBuf, uri: Url) -> Self {
        Self {
            path,
            identity: Identity::Uri { uri },
        }
    }

    pub fn from_artifact(
        path: PathBuf,
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            path,
            identity: Identity::Artifact {
                group: group.into(),
                name: name.into(),
                version: version.into(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uri(&self) -> Option<&Url> {
        match &self.identity {
            Identity::Uri { uri } => Some(uri),
            Identity::Artifact { .. } => None,
        }
    }
}
