//! Error types for plugin operations.
//!
//! [`PluginError`] separates failures of delegated tools (the external build)
//! from failures of this crate's own filesystem and archive work, so callers
//! can tell which stage broke.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Boxed error used to chain underlying causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    /// A delegated external tool failed (build command, shell).
    #[error("{message}")]
    Downstream {
        /// Short description of what failed
        message: String,
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error annotated with the operation and path involved
    #[error("{context} ({})", .path.display())]
    Fs {
        /// Operation being performed
        context: String,
        /// Path being operated on
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A file was asked to be archived relative to a directory it does not live under
    #[error("{} is not under {}", .path.display(), .base.display())]
    PathOutsideBase {
        /// File path
        path: PathBuf,
        /// Base directory
        base: PathBuf,
    },

    /// Zip format errors that are not plain IO failures
    #[error("Archive error: {0}")]
    Archive(zip::result::ZipError),

    /// Template registration or rendering errors
    #[error("Template error: {0}")]
    Template(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File name that cannot be stored as a UTF-8 archive entry
    #[error("File name is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Resource type name does not match `Org::Service::Resource`
    #[error("Invalid type name '{0}': expected three '::'-separated alphanumeric segments")]
    InvalidTypeName(String),

    /// Project configuration missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl PluginError {
    /// Wraps a failure of a delegated tool.
    pub fn downstream(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Downstream {
            message: message.into(),
            source: source.into(),
        }
    }

    /// True when the failure happened in an external tool rather than in this crate.
    pub fn is_downstream(&self) -> bool {
        matches!(self, Self::Downstream { .. })
    }

    /// True for filesystem and archive IO failures.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Fs { .. })
    }
}

impl From<zip::result::ZipError> for PluginError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::Archive(other),
        }
    }
}

impl From<walkdir::Error> for PluginError {
    fn from(err: walkdir::Error) -> Self {
        match err.path().map(Path::to_path_buf) {
            Some(path) => Self::Fs {
                context: "walking directory".to_string(),
                path,
                source: err.into(),
            },
            None => Self::Io(err.into()),
        }
    }
}

impl From<handlebars::RenderError> for PluginError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for PluginError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

/// Adds operation and path context to IO results.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`PluginError::Fs`] describing what was being done.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| PluginError::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}
