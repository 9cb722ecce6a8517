use crate::lock::LockError;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed source for errors raised by pluggable collaborators (download
/// transports, resolution engines).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum DepmanError {
    // Configuration errors
    #[error("CONFIG_INVALID: {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("CONFIG_PARSE_ERROR: failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("UNOFFICIAL_PACKAGE: unofficial package '{coordinate}': version is required")]
    UnofficialPackage { coordinate: String },

    // Classification errors
    #[error("IDENTIFIER_INVALID: '{identifier}': {reason}")]
    IdentifierInvalid { identifier: String, reason: String },

    #[error("COORDINATE_INVALID: '{coordinate}': {reason}")]
    CoordinateInvalid { coordinate: String, reason: String },

    // I/O errors
    #[error("FILE_NAME_UNDERIVABLE: invalid dependency URL, cannot derive file name: {uri}")]
    FileNameUnderivable { uri: String },

    #[error("DOWNLOAD_FAILED: {uri}: {source}")]
    DownloadFailed {
        uri: String,
        #[source]
        source: BoxError,
    },

    #[error("IO_ERROR: {operation} {}: {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LOCK_FAILED: {0}")]
    LockFailed(#[from] LockError),

    #[error("STATE_POISONED: resolver state lock was poisoned by a panicking caller")]
    StatePoisoned,

    // Resolution errors
    #[error("RESOLUTION_FAILED: [{coordinates}]: {source}")]
    ResolutionFailed {
        coordinates: String,
        #[source]
        source: BoxError,
    },
}

/// Coarse error classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed configuration or an unversioned unofficial package.
    Configuration,
    /// Unparseable identifier, query string or coordinate.
    Classification,
    /// Download, filesystem or locking failure.
    Io,
    /// The resolution engine could not resolve a coordinate or graph.
    Resolution,
}

impl DepmanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DepmanError::ConfigInvalid { .. }
            | DepmanError::ConfigParse { .. }
            | DepmanError::UnofficialPackage { .. } => ErrorKind::Configuration,
            DepmanError::IdentifierInvalid { .. } | DepmanError::CoordinateInvalid { .. } => {
                ErrorKind::Classification
            }
            DepmanError::FileNameUnderivable { .. }
            | DepmanError::DownloadFailed { .. }
            | DepmanError::Io { .. }
            | DepmanError::LockFailed(_)
            | DepmanError::StatePoisoned => ErrorKind::Io,
            DepmanError::ResolutionFailed { .. } => ErrorKind::Resolution,
        }
    }

    /// Shorthand for [`DepmanError::Io`].
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DepmanError::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DepmanError>;
