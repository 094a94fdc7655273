//! The crate's unified error type.

/// Errors returned by the public `clean`/`split`/`merge` entry points.
#[derive(Debug, thiserror::Error)]
pub enum GcodeCleanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not parse merge filename {0:?}: {1}")]
    MergeFilename(std::path::PathBuf, String),

    #[error("invalid annotation dictionary: {0}")]
    Annotation(#[from] serde_json::Error),

    #[error("invalid toml configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no input files found in {0:?}")]
    NoInputFiles(std::path::PathBuf),
}

pub type Result<T> = std::result::Result<T, GcodeCleanError>;
