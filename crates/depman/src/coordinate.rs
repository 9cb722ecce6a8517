//! Package coordinates
//!
//! Accepted forms: `group:name:version`, `group:name:extension:version` and
//! `group:name:extension:classifier:version`. The extension defaults to `jar`.

use depman_core::{DepmanError, Result};
use serde::Serialize;
use std::fmt;

pub const DEFAULT_EXTENSION: &str = "jar";

const SNAPSHOT_MARKER: &str = "SNAPSHOT";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageCoordinate {
    pub group: String,
    pub name: String,
    pub extension: String,
    pub classifier: Option<String>,
    pub version: String,
    pub scope: String,
}

impl PackageCoordinate {
    /// Parses a coordinate string; the version is mandatory.
    pub fn parse(coordinate: &str, scope: &str) -> Result<Self> {
        let invalid = |reason: &str| DepmanError::CoordinateInvalid {
            coordinate: coordinate.to_string(),
            reason: reason.to_string(),
        };

        if coordinate.chars().any(char::is_whitespace) {
            return Err(invalid("coordinates must not contain whitespace"));
        }

        let parts: Vec<&str> = coordinate.split(':').collect();
        let (group, name, extension, classifier, version) = match parts.as_slice() {
            [group, name, version] => (*group, *name, DEFAULT_EXTENSION, None, *version),
            [group, name, extension, version] => (*group, *name, *extension, None, *version),
            [group, name, extension, classifier, version] => {
                (*group, *name, *extension, Some(*classifier), *version)
            }
            [_, _] => return Err(invalid("missing version")),
            _ => {
                return Err(invalid(
                    "expected <group>:<name>[:<extension>[:<classifier>]]:<version>",
                ));
            }
        };

        if group.is_empty() || name.is_empty() {
            return Err(invalid("group and name must not be empty"));
        }
        if version.is_empty() {
            return Err(invalid("missing version"));
        }

        Ok(Self {
            group: group.to_string(),
            name: name.to_string(),
            extension: if extension.is_empty() {
                DEFAULT_EXTENSION.to_string()
            } else {
                extension.to_string()
            },
            classifier: classifier.filter(|c| !c.is_empty()).map(str::to_string),
            version: version.to_string(),
            scope: scope.to_string(),
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_MARKER)
    }

    /// `<name>-<version>[-<classifier>].<extension>`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.name, self.version, self.extension),
        }
    }

    /// Path segments of the artifact in a `default` layout repository.
    pub fn layout_segments(&self) -> Vec<String> {
        let mut segments: Vec<String> = self.group.split('.').map(str::to_string).collect();
        segments.push(self.name.clone());
        segments.push(self.version.clone());
        segments.push(self.file_name());
        segments
    }
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if self.extension != DEFAULT_EXTENSION || self.classifier.is_some() {
            write!(f, ":{}", self.extension)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}
