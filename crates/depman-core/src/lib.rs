//! Shared building blocks for the depman workspace.
//!
//! - [`error`]: the error taxonomy surfaced by every resolution call
//! - [`config`]: the repository configuration store (repositories + known package versions)
//! - [`lock`]: advisory file locks guarding a cache root across processes

pub mod config;
pub mod error;
pub mod lock;

pub use config::{RepositoryConfig, RepositoryDescriptor, VersionMap};
pub use error::{DepmanError, ErrorKind, Result};
