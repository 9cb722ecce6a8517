//! Resolution coordinator
//!
//! [`DependencyManager`] is the only entry point to the resolution engine and
//! the file cache. Both sit behind one mutex: every cache check-and-download
//! and every engine call runs while holding it, so a manager instance resolves
//! one thing at a time no matter how many threads call into it. Callers that
//! need parallel throughput run several managers with distinct cache roots.

use crate::cache::FileCache;
use crate::classify::{PackageReference, classify};
use crate::coordinate::PackageCoordinate;
use crate::engine::{EngineError, RepositoryLayoutEngine, ResolutionEngine};
use crate::entity::ResolvedEntity;
use crate::http;
use crate::identifier::{DependencyIdentifier, parse_all};
use crate::version::VersionInjector;
use depman_core::{DepmanError, RepositoryConfig, RepositoryDescriptor, Result};
use reqwest::blocking::Client;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// Construction options for a [`DependencyManager`]
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Root of the manager's own cache (direct links land in `files/`)
    pub cache_dir: PathBuf,
    /// Local package repository; defaults to `~/.m2/repository`
    pub local_repository: Option<PathBuf>,
    /// Timeout for a single HTTP transfer
    pub timeout: Duration,
}

impl ManagerOptions {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            local_repository: None,
            timeout: http::DEFAULT_TIMEOUT,
        }
    }

    pub fn local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(path.into());
        self
    }

    fn resolved_local_repository(&self) -> PathBuf {
        self.local_repository
            .clone()
            .unwrap_or_else(default_local_repository)
    }
}

/// The user-scoped Maven repository cache, or `.m2/repository` under the
/// working directory when no home directory is known.
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}

fn build_client(options: &ManagerOptions) -> Result<Client> {
    http::build_client(options.timeout).map_err(|e| {
        DepmanError::io(
            "build HTTP client for",
            &options.cache_dir,
            std::io::Error::other(e),
        )
    })
}

/// Mutable state shared by all callers, only reachable through the lock.
struct State<E> {
    engine: E,
    files: FileCache,
}

pub struct DependencyManager<E = RepositoryLayoutEngine> {
    cache_dir: PathBuf,
    local_repository: PathBuf,
    config: RepositoryConfig,
    state: Mutex<State<E>>,
}

impl DependencyManager<RepositoryLayoutEngine> {
    /// Builds a manager with configuration read from the environment
    /// (see [`RepositoryConfig::from_env`]).
    ///
    /// The built-in [`RepositoryLayoutEngine`] resolves single artifacts
    /// only. Package identifiers resolved transitively (the default when
    /// `transitive` is absent) fail with [`DepmanError::ResolutionFailed`]
    /// wrapping [`EngineError::Unsupported`]; use
    /// [`with_engine`](DependencyManager::with_engine) with an engine that
    /// reads dependency metadata, or pass `transitive=false`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = RepositoryConfig::from_env()?;
        Self::with_config(ManagerOptions::new(cache_dir), config)
    }

    /// Builds a manager with explicit configuration and the repository
    /// layout engine.
    ///
    /// Same limitation as [`new`](Self::new): no transitive closure.
    pub fn with_config(options: ManagerOptions, config: RepositoryConfig) -> Result<Self> {
        let engine =
            RepositoryLayoutEngine::new(options.resolved_local_repository(), build_client(&options)?);
        Self::with_engine(options, config, engine)
    }
}

impl<E: ResolutionEngine> DependencyManager<E> {
    /// Builds a manager around a caller-supplied resolution engine.
    ///
    /// Creates the cache directory if needed.
    pub fn with_engine(options: ManagerOptions, config: RepositoryConfig, engine: E) -> Result<Self> {
        std::fs::create_dir_all(&options.cache_dir)
            .map_err(|e| DepmanError::io("create cache directory", &options.cache_dir, e))?;

        let files = FileCache::new(&options.cache_dir, build_client(&options)?);
        let local_repository = options.resolved_local_repository();

        tracing::info!(
            cache_dir = %options.cache_dir.display(),
            local_repository = %local_repository.display(),
            repositories = ?config.repositories().iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            known_packages = config.versions().len(),
            "dependency manager initialized"
        );

        Ok(Self {
            cache_dir: options.cache_dir,
            local_repository,
            config,
            state: Mutex::new(State { engine, files }),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        self.config.repositories()
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Resolves a batch of identifiers into local files.
    ///
    /// Inputs are processed in sorted order. Direct links go through the file
    /// cache, transitive package references are resolved as one dependency
    /// graph, and single package references one artifact at a time. Results
    /// are merged and deduplicated.
    ///
    /// An empty batch (including `None`) yields an empty set. The first
    /// failure aborts the whole batch; no partial result is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use depman::{DependencyManager, parse_all};
    ///
    /// # fn main() -> depman::Result<()> {
    /// let manager = DependencyManager::new("/tmp/depman-cache")?;
    /// let deps = parse_all([
    ///     "pkg://org.example:tool:1.2.3?transitive=false",
    ///     "https://example.com/files/helper.jar",
    /// ])?;
    /// for entity in manager.resolve(deps)? {
    ///     println!("{}", entity.path.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn resolve<I>(&self, identifiers: I) -> Result<BTreeSet<ResolvedEntity>>
    where
        I: IntoIterator<Item = DependencyIdentifier>,
    {
        let list = classify(identifiers)?;
        let mut result = BTreeSet::new();
        if list.is_empty() {
            return Ok(result);
        }

        tracing::debug!(
            direct_links = list.direct_links.len(),
            transitive = list.transitive.len(),
            single = list.single.len(),
            "resolving batch"
        );

        // Validate every package reference before touching disk or network.
        let transitive = self.prepare_all(&list.transitive)?;
        let single = self.prepare_all(&list.single)?;

        for link in &list.direct_links {
            let path = self.resolve_file(&link.url)?;
            result.insert(ResolvedEntity::from_uri(path, link.url.clone()));
        }

        if !transitive.is_empty() {
            let artifacts = self
                .call_engine(|engine, repositories| {
                    engine.resolve_transitive_closure(&transitive, repositories)
                })?
                .map_err(|e| resolution_failed(&transitive, e))?;
            result.extend(artifacts.into_iter().map(ResolvedEntity::from));
        }

        for coordinate in &single {
            result.insert(self.resolve_artifact(coordinate)?);
        }

        Ok(result)
    }

    /// Parses `uris` and resolves them with [`resolve`](Self::resolve).
    pub fn resolve_uris<I, S>(&self, uris: I) -> Result<BTreeSet<ResolvedEntity>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve(parse_all(uris)?)
    }

    /// Resolves one identifier without its dependencies.
    ///
    /// Package identifiers get the usual version injection and honor
    /// `scope`; `transitive` is ignored.
    pub fn resolve_single(&self, identifier: &DependencyIdentifier) -> Result<ResolvedEntity> {
        if let Some(url) = identifier.link() {
            let path = self.resolve_file(url)?;
            return Ok(ResolvedEntity::from_uri(path, url.clone()));
        }

        let reference = PackageReference::from_identifier(identifier)?;
        let coordinate = self.prepare(&VersionInjector::new(self.config.versions()), &reference)?;
        self.resolve_artifact(&coordinate)
    }

    /// Returns the cached path of a direct link, downloading it if needed.
    pub fn resolve_file(&self, uri: &Url) -> Result<PathBuf> {
        let state = self.lock()?;
        state.files.resolve_direct(uri)
    }

    fn resolve_artifact(&self, coordinate: &PackageCoordinate) -> Result<ResolvedEntity> {
        let artifact = self
            .call_engine(|engine, repositories| engine.resolve_artifact(coordinate, repositories))?
            .map_err(|e| resolution_failed(std::slice::from_ref(coordinate), e))?;
        Ok(artifact.into())
    }

    fn prepare_all(&self, references: &[PackageReference]) -> Result<Vec<PackageCoordinate>> {
        let injector = VersionInjector::new(self.config.versions());
        references
            .iter()
            .map(|reference| self.prepare(&injector, reference))
            .collect()
    }

    /// Injects the default version, if any, and parses the coordinate.
    fn prepare(
        &self,
        injector: &VersionInjector<'_>,
        reference: &PackageReference,
    ) -> Result<PackageCoordinate> {
        let coordinate = injector.inject(&reference.coordinate)?;
        PackageCoordinate::parse(&coordinate, &reference.scope)
    }

    fn call_engine<T>(
        &self,
        f: impl FnOnce(&mut E, &[RepositoryDescriptor]) -> T,
    ) -> Result<T> {
        let mut state = self.lock()?;
        Ok(f(&mut state.engine, self.config.repositories()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<E>>> {
        self.state.lock().map_err(|_| DepmanError::StatePoisoned)
    }
}

fn resolution_failed(coordinates: &[PackageCoordinate], error: EngineError) -> DepmanError {
    DepmanError::ResolutionFailed {
        coordinates: coordinates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        source: Box::new(error),
    }
}
