use std::path::PathBuf;
use thiserror::Error;

/// Main error type for guardpatch
///
/// Anchor misses are not errors: they are reported as rule outcomes and the
/// write is skipped. Everything here aborts the run.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("File is not valid UTF-8: {}", path.display())]
    Encoding { path: PathBuf },

    #[error("File {} was modified by another process since it was read", path.display())]
    ConcurrentModification { path: PathBuf },

    #[error("Invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },
}

impl PatchError {
    /// Create a new IO error with path context
    pub fn io_error(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source: err,
            path: path.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn unknown_target(name: impl Into<String>) -> Self {
        Self::UnknownTarget { name: name.into() }
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(error: serde_json::Error) -> Self {
        PatchError::parse_error(error.to_string())
    }
}

impl From<serde_yaml::Error> for PatchError {
    fn from(error: serde_yaml::Error) -> Self {
        PatchError::parse_error(error.to_string())
    }
}

impl From<toml::de::Error> for PatchError {
    fn from(error: toml::de::Error) -> Self {
        PatchError::parse_error(error.to_string())
    }
}

/// Result type alias using PatchError
pub type PatchResult<T> = Result<T, PatchError>;

/// Contextual error mapping function
pub fn map_io_err<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> PatchError {
    let path = path.into();
    move |err| PatchError::io_error(err, path)
}
