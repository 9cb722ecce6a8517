//! Package repository resolution engine interface
//!
//! The engine performs the actual network-bound artifact and dependency-graph
//! resolution. Implementations may keep mutable session state (resolved
//! artifact caches, connection pools) that is not safe for concurrent use;
//! the methods therefore take `&mut self` and the resolution coordinator owns
//! the engine behind its lock.

pub mod layout;

pub use layout::RepositoryLayoutEngine;

use crate::coordinate::PackageCoordinate;
use crate::entity::ResolvedEntity;
use crate::http::DownloadError;
use depman_core::RepositoryDescriptor;
use std::path::PathBuf;
use thiserror::Error;

/// A locally available artifact and the identity it resolved to.
///
/// The version may differ from the requested one (e.g. a timestamped
/// snapshot), so the identity is reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    pub group: String,
    pub name: String,
    pub version: String,
}

impl ResolvedArtifact {
    pub fn for_coordinate(coordinate: &PackageCoordinate, path: PathBuf) -> Self {
        Self {
            path,
            group: coordinate.group.clone(),
            name: coordinate.name.clone(),
            version: coordinate.version.clone(),
        }
    }
}

impl From<ResolvedArtifact> for ResolvedEntity {
    fn from(artifact: ResolvedArtifact) -> Self {
        ResolvedEntity::from_artifact(artifact.path, artifact.group, artifact.name, artifact.version)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("artifact {coordinate} not found in repositories [{repositories}]")]
    NotFound {
        coordinate: String,
        repositories: String,
    },

    #[error("transfer of {coordinate} from '{repository}' failed: {source}")]
    Transfer {
        coordinate: String,
        repository: String,
        #[source]
        source: DownloadError,
    },

    #[error("invalid URL for repository '{repository}': {source}")]
    InvalidRepositoryUrl {
        repository: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Resolution backend invoked by the coordinator while it holds its lock.
pub trait ResolutionEngine: Send {
    /// Resolves exactly one artifact, without its dependencies.
    fn resolve_artifact(
        &mut self,
        coordinate: &PackageCoordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact, EngineError>;

    /// Resolves the full dependency graph rooted at `roots` in one request.
    fn resolve_transitive_closure(
        &mut self,
        roots: &[PackageCoordinate],
        repositories: &[RepositoryDescriptor],
    ) -> Result<Vec<ResolvedArtifact>, EngineError>;
}

impl<E: ResolutionEngine + ?Sized> ResolutionEngine for Box<E> {
    fn resolve_artifact(
        &mut self,
        coordinate: &PackageCoordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact, EngineError> {
        (**self).resolve_artifact(coordinate, repositories)
    }

    fn resolve_transitive_closure(
        &mut self,
        roots: &[PackageCoordinate],
        repositories: &[RepositoryDescriptor],
    ) -> Result<Vec<ResolvedArtifact>, EngineError> {
        (**self).resolve_transitive_closure(roots, repositories)
    }
}

pub(crate) fn describe_repositories(repositories: &[RepositoryDescriptor]) -> String {
    repositories
        .iter()
        .map(|r| r.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
