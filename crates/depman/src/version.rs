//! Default version injection for known packages

use depman_core::{DepmanError, Result, VersionMap};

/// Appends configured default versions to unversioned package coordinates.
#[derive(Debug, Clone, Copy)]
pub struct VersionInjector<'a> {
    versions: &'a VersionMap,
}

impl<'a> VersionInjector<'a> {
    pub fn new(versions: &'a VersionMap) -> Self {
        Self { versions }
    }

    /// Returns the coordinate with an explicit version.
    ///
    /// Versioned coordinates pass through. With an empty version map every
    /// coordinate passes through unchanged. Otherwise an unversioned
    /// coordinate must be a known package.
    pub fn inject(&self, coordinate: &str) -> Result<String> {
        if self.versions.is_empty() || has_version(coordinate) {
            return Ok(coordinate.to_string());
        }

        match self.versions.get(coordinate) {
            Some(version) => Ok(format!("{coordinate}:{version}")),
            None => Err(DepmanError::UnofficialPackage {
                coordinate: coordinate.to_string(),
            }),
        }
    }
}

/// True when the last `:`-separated segment looks like a version:
/// `digits(.digits)*` optionally followed by `-` and word characters.
pub fn has_version(coordinate: &str) -> bool {
    let Some((_, version)) = coordinate.rsplit_once(':') else {
        return false;
    };

    let (numeric, qualifier) = match version.split_once('-') {
        Some((numeric, qualifier)) => (numeric, Some(qualifier)),
        None => (version, None),
    };

    let numeric_ok = numeric
        .split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    let qualifier_ok = qualifier
        .map(|q| q.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'))
        .unwrap_or(true);

    numeric_ok && qualifier_ok
}
