//! Dependency resolution and caching.
//!
//! Turns dependency identifiers (package coordinates or plain download links)
//! into local files, reusing what is already cached and serializing access to
//! the shared cache and resolver state.
//!
//! # Architecture
//!
//! - [`identifier`]: parsed `pkg://` references and direct links
//! - [`classify`]: partitions a batch into transitive, single and direct buckets
//! - [`version`]: default versions for known, unversioned packages
//! - [`cache`]: on-disk cache for direct links
//! - [`engine`]: the package repository resolution backend
//! - [`manager`]: the coordinator tying it all together
//!
//! # Resolution Flow
//!
//! ```text
//! DependencyManager::resolve(batch)
//!     ↓
//! 1. sort + classify
//!     ↓
//! 2. inject default versions, parse coordinates
//!     ↓
//! 3. under the manager lock:
//!     → direct links:  FileCache (cached unless file: or SNAPSHOT)
//!     → transitive:    engine.resolve_transitive_closure (one call)
//!     → single:        engine.resolve_artifact (per coordinate)
//!     ↓
//! 4. merged, deduplicated set of ResolvedEntity
//! ```
//!
//! # Cache Layout
//!
//! - `<cache_dir>/files/<last path segment>`: direct links
//! - `<local repository>/<group path>/<name>/<version>/...`: repository
//!   artifacts, `~/.m2/repository` by default

pub mod cache;
pub mod classify;
pub mod coordinate;
pub mod engine;
pub mod entity;
pub mod http;
pub mod identifier;
pub mod manager;
pub mod version;

pub use classify::{DependencyList, DirectLink, PackageReference, classify};
pub use coordinate::PackageCoordinate;
pub use engine::{EngineError, RepositoryLayoutEngine, ResolutionEngine, ResolvedArtifact};
pub use entity::{Identity, ResolvedEntity};
pub use identifier::{DependencyIdentifier, PACKAGE_SCHEME, parse_all};
pub use manager::{DependencyManager, ManagerOptions};
pub use version::VersionInjector;

pub use depman_core::{DepmanError, ErrorKind, RepositoryConfig, RepositoryDescriptor, VersionMap};

pub type Result<T> = depman_core::Result<T>;
