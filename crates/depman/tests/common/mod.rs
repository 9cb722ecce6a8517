//! Shared fixtures for depman integration tests

#![allow(dead_code)]

use depman::{
    DependencyManager, EngineError, ManagerOptions, PackageCoordinate, RepositoryConfig,
    RepositoryDescriptor, ResolutionEngine, ResolvedArtifact, VersionMap,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// One call received by [`FakeEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Artifact(String),
    Closure(Vec<String>),
}

/// In-memory resolution engine.
///
/// Artifacts resolve to `<root>/<group>/<name>-<version>.jar`. A transitive
/// request returns each root plus the dependencies registered with
/// [`FakeEngine::with_dependencies`].
#[derive(Debug, Clone)]
pub struct FakeEngine {
    root: PathBuf,
    graph: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            graph: HashMap::new(),
            failing: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every call take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_in_flight)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Declares the dependencies of `coordinate` (all `group:name:version`).
    pub fn with_dependencies(mut self, coordinate: &str, deps: &[&str]) -> Self {
        self.graph.insert(
            coordinate.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        );
        self
    }

    /// Makes resolution of `coordinate` fail with a not-found error.
    pub fn failing_on(mut self, coordinate: &str) -> Self {
        self.failing.push(coordinate.to_string());
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<EngineCall>>> {
        Arc::clone(&self.calls)
    }

    fn artifact(&self, coordinate: &str) -> Result<ResolvedArtifact, EngineError> {
        if self.failing.iter().any(|f| f == coordinate) {
            return Err(EngineError::NotFound {
                coordinate: coordinate.to_string(),
                repositories: "fake".to_string(),
            });
        }
        let parts: Vec<&str> = coordinate.split(':').collect();
        let (group, name, version) = (parts[0], parts[1], parts[parts.len() - 1]);
        Ok(ResolvedArtifact {
            path: self.root.join(group).join(format!("{name}-{version}.jar")),
            group: group.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl ResolutionEngine for FakeEngine {
    fn resolve_artifact(
        &mut self,
        coordinate: &PackageCoordinate,
        _repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact, EngineError> {
        let key = coordinate.to_string();
        self.calls.lock().unwrap().push(EngineCall::Artifact(key.clone()));
        self.enter();
        let result = self.artifact(&key);
        self.leave();
        result
    }

    fn resolve_transitive_closure(
        &mut self,
        roots: &[PackageCoordinate],
        _repositories: &[RepositoryDescriptor],
    ) -> Result<Vec<ResolvedArtifact>, EngineError> {
        let keys: Vec<String> = roots.iter().map(ToString::to_string).collect();
        self.calls.lock().unwrap().push(EngineCall::Closure(keys.clone()));

        self.enter();
        let result = keys
            .iter()
            .flat_map(|key| std::iter::once(key).chain(self.graph.get(key).into_iter().flatten()))
            .map(|coordinate| self.artifact(coordinate))
            .collect();
        self.leave();
        result
    }
}

/// A manager over a [`FakeEngine`] with its own temporary cache root.
pub struct Fixture {
    pub manager: DependencyManager<FakeEngine>,
    pub calls: Arc<Mutex<Vec<EngineCall>>>,
    pub cache: TempDir,
}

impl Fixture {
    pub fn new(engine: FakeEngine, versions: VersionMap) -> Self {
        let cache = depman_testkit::temp_dir_in_workspace();
        let calls = engine.calls();
        let config = RepositoryConfig::new(vec![RepositoryDescriptor::central()], versions);
        let options = ManagerOptions::new(cache.path().join("cache"))
            .local_repository(cache.path().join("repository"));
        let manager = DependencyManager::with_engine(options, config, engine).unwrap();
        Self {
            manager,
            calls,
            cache,
        }
    }

    pub fn engine_calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn fake_engine() -> FakeEngine {
    FakeEngine::new(Path::new("/fake-repo"))
}
