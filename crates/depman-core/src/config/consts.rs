//! Configuration constants

/// Environment variable naming the repository list file.
pub const REPOSITORIES_CFG_ENV: &str = "DEPMAN_REPOSITORIES_CFG";

/// Environment variable naming the known package version map file.
pub const VERSIONS_CFG_ENV: &str = "DEPMAN_VERSIONS_CFG";

pub const CENTRAL_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";
pub const DEFAULT_LAYOUT: &str = "default";
