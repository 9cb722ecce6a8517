//! Single-artifact resolution against `default` layout repositories
//!
//! Artifacts are looked up at
//! `<base>/<group as path>/<name>/<version>/<name>-<version>[-<classifier>].<ext>`
//! in each repository, in configured order, and stored at the same relative
//! path under the local repository directory.
//!
//! This engine does not read dependency metadata, so it cannot compute a
//! transitive closure.

use super::{EngineError, ResolutionEngine, ResolvedArtifact, describe_repositories};
use crate::coordinate::PackageCoordinate;
use crate::http::{self, DownloadError};
use depman_core::RepositoryDescriptor;
use depman_core::config::consts::DEFAULT_LAYOUT;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug)]
pub struct RepositoryLayoutEngine {
    client: Client,
    local_repository: PathBuf,
    /// Artifacts already resolved by this engine instance.
    session: HashMap<PackageCoordinate, ResolvedArtifact>,
}

impl RepositoryLayoutEngine {
    pub fn new(local_repository: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            client,
            local_repository: local_repository.into(),
            session: HashMap::new(),
        }
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    fn local_path(&self, coordinate: &PackageCoordinate) -> PathBuf {
        coordinate
            .layout_segments()
            .iter()
            .fold(self.local_repository.clone(), |path, segment| path.join(segment))
    }

    fn remember(&mut self, coordinate: &PackageCoordinate, path: PathBuf) -> ResolvedArtifact {
        let artifact = ResolvedArtifact::for_coordinate(coordinate, path);
        self.session.insert(session_key(coordinate), artifact.clone());
        artifact
    }
}

/// Scope does not affect where an artifact lives.
fn session_key(coordinate: &PackageCoordinate) -> PackageCoordinate {
    PackageCoordinate {
        scope: String::new(),
        ..coordinate.clone()
    }
}

fn artifact_url(
    repository: &RepositoryDescriptor,
    coordinate: &PackageCoordinate,
) -> Result<Url, EngineError> {
    let mut url = Url::parse(&repository.url).map_err(|source| EngineError::InvalidRepositoryUrl {
        repository: repository.id.clone(),
        source,
    })?;

    let segments = coordinate.layout_segments();
    url.path_segments_mut()
        .map_err(|()| EngineError::InvalidRepositoryUrl {
            repository: repository.id.clone(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .extend(segments.iter().map(String::as_str));

    Ok(url)
}

impl ResolutionEngine for RepositoryLayoutEngine {
    fn resolve_artifact(
        &mut self,
        coordinate: &PackageCoordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact, EngineError> {
        if let Some(artifact) = self.session.get(&session_key(coordinate)) {
            tracing::debug!(%coordinate, "artifact resolved earlier in this session");
            return Ok(artifact.clone());
        }

        let local = self.local_path(coordinate);
        if !coordinate.is_snapshot() && local.is_file() {
            tracing::debug!(%coordinate, path = %local.display(), "artifact found in local repository");
            return Ok(self.remember(coordinate, local));
        }

        for repository in repositories {
            if repository.layout != DEFAULT_LAYOUT {
                tracing::debug!(repository = %repository.id, layout = %repository.layout, "skipping repository with unsupported layout");
                continue;
            }
            if coordinate.is_snapshot() && !repository.allow_snapshots {
                tracing::debug!(repository = %repository.id, %coordinate, "repository does not serve snapshots");
                continue;
            }

            let url = artifact_url(repository, coordinate)?;
            tracing::debug!(repository = %repository.id, %url, "resolving artifact");

            match http::fetch_to_file(&self.client, &url, &local) {
                Ok(bytes) => {
                    tracing::info!(%coordinate, repository = %repository.id, bytes, "artifact downloaded");
                    return Ok(self.remember(coordinate, local));
                }
                Err(DownloadError::NotFound { .. }) => {
                    tracing::debug!(repository = %repository.id, %coordinate, "artifact not in repository");
                }
                Err(source) => {
                    tracing::error!(repository = %repository.id, %coordinate, error = %source, "transfer failed");
                    return Err(EngineError::Transfer {
                        coordinate: coordinate.to_string(),
                        repository: repository.id.clone(),
                        source,
                    });
                }
            }
        }

        if local.is_file() {
            tracing::warn!(%coordinate, path = %local.display(), "no repository served the snapshot, using local copy");
            return Ok(self.remember(coordinate, local));
        }

        Err(EngineError::NotFound {
            coordinate: coordinate.to_string(),
            repositories: describe_repositories(repositories),
        })
    }

    fn resolve_transitive_closure(
        &mut self,
        roots: &[PackageCoordinate],
        _repositories: &[RepositoryDescriptor],
    ) -> Result<Vec<ResolvedArtifact>, EngineError> {
        let roots = roots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(EngineError::Unsupported(format!(
            "dependency graph resolution of [{roots}] needs an engine that reads dependency metadata"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::fs;
    use tempfile::TempDir;

    fn engine(local: &Path) -> RepositoryLayoutEngine {
        RepositoryLayoutEngine::new(local, http::build_client(http::DEFAULT_TIMEOUT).unwrap())
    }

    fn coordinate(s: &str) -> PackageCoordinate {
        PackageCoordinate::parse(s, "compile").unwrap()
    }

    fn repo(id: &str, url: &str, allow_snapshots: bool) -> RepositoryDescriptor {
        RepositoryDescriptor::new(id, "default", url, allow_snapshots)
    }

    #[test]
    fn test_artifact_url_appends_layout_path() {
        let url = artifact_url(
            &repo("central", "https://repo.example/maven2/", false),
            &coordinate("org.example:tool:1.0"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example/maven2/org/example/tool/1.0/tool-1.0.jar"
        );

        let url = artifact_url(
            &repo("plain", "https://repo.example/maven2", false),
            &coordinate("org.example:tool:1.0"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example/maven2/org/example/tool/1.0/tool-1.0.jar"
        );
    }

    #[test]
    fn test_repositories_tried_in_order() {
        let mut first = Server::new();
        let mut second = Server::new();
        let path = "/org/example/tool/1.0/tool-1.0.jar";
        let miss = first.mock("GET", path).with_status(404).expect(1).create();
        let hit = second
            .mock("GET", path)
            .with_status(200)
            .with_body("jar bytes")
            .expect(1)
            .create();

        let local = TempDir::new().unwrap();
        let mut engine = engine(local.path());
        let repositories = [
            repo("first", &first.url(), true),
            repo("second", &second.url(), true),
        ];

        let artifact = engine
            .resolve_artifact(&coordinate("org.example:tool:1.0"), &repositories)
            .unwrap();

        miss.assert();
        hit.assert();
        assert_eq!(
            artifact.path,
            local.path().join("org/example/tool/1.0/tool-1.0.jar")
        );
        assert_eq!(fs::read_to_string(&artifact.path).unwrap(), "jar bytes");
        assert_eq!(artifact.version, "1.0");
    }

    #[test]
    fn test_session_and_local_repository_avoid_network() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/g/a/1.0/a-1.0.jar")
            .with_status(200)
            .with_body("x")
            .expect(1)
            .create();

        let local = TempDir::new().unwrap();
        let repositories = [repo("r", &server.url(), true)];

        let mut first = engine(local.path());
        first.resolve_artifact(&coordinate("g:a:1.0"), &repositories).unwrap();
        first.resolve_artifact(&coordinate("g:a:1.0"), &repositories).unwrap();

        // a fresh session finds the artifact in the local repository
        let mut second = engine(local.path());
        second.resolve_artifact(&coordinate("g:a:1.0"), &repositories).unwrap();

        mock.assert();
    }

    #[test]
    fn test_snapshot_skips_repositories_without_snapshots() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .expect(0)
            .create();

        let local = TempDir::new().unwrap();
        let mut engine = engine(local.path());
        let err = engine
            .resolve_artifact(
                &coordinate("g:a:1.0-SNAPSHOT"),
                &[repo("releases", &server.url(), false)],
            )
            .unwrap_err();

        mock.assert();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(err.to_string().contains("releases"));
    }

    #[test]
    fn test_non_default_layout_is_skipped() {
        let local = TempDir::new().unwrap();
        let mut engine = engine(local.path());
        let legacy = RepositoryDescriptor::new("old", "legacy", "https://old.example/", true);

        let err = engine
            .resolve_artifact(&coordinate("g:a:1.0"), &[legacy])
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_server_error_is_transfer_error() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/g/a/1.0/a-1.0.jar").with_status(503).create();

        let local = TempDir::new().unwrap();
        let mut engine = engine(local.path());
        let err = engine
            .resolve_artifact(&coordinate("g:a:1.0"), &[repo("r", &server.url(), true)])
            .unwrap_err();

        assert!(matches!(err, EngineError::Transfer { ref repository, .. } if repository == "r"));
        assert!(!local.path().join("g/a/1.0/a-1.0.jar").exists());
    }

    #[test]
    fn test_transitive_closure_is_unsupported() {
        let local = TempDir::new().unwrap();
        let mut engine = engine(local.path());
        let err = engine
            .resolve_transitive_closure(&[coordinate("g:a:1.0")], &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(ref msg) if msg.contains("g:a:1.0")));
    }
}
