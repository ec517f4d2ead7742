//! Error types for detection, fetching and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the diagnostic executor itself
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{binary} not found. Please install smartmontools or set the binary path in the configuration.")]
    NotFound { binary: String },

    #[error("failed to run {binary}: {source}")]
    Io {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with status {status}: {reason}")]
    Failed {
        binary: String,
        status: i32,
        reason: String,
    },
}

/// A failure to fetch or parse basic data for one device.
/// These are collected per device and never abort a batch on their own.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{device}: {source}")]
    Execution {
        device: String,
        #[source]
        source: ExecutorError,
    },

    #[error("{device}: smartctl returned an empty output")]
    EmptyOutput { device: String },

    #[error("{device}: cannot open device: {reason}")]
    OpenFailed { device: String, reason: String },

    #[error("{device}: cannot parse smartctl output: {reason}")]
    Parse { device: String, reason: String },
}

impl FetchError {
    /// Device (with type, if any) the error belongs to
    pub fn device(&self) -> &str {
        match self {
            FetchError::Execution { device, .. }
            | FetchError::EmptyOutput { device }
            | FetchError::OpenFailed { device, .. }
            | FetchError::Parse { device, .. } => device,
        }
    }
}

/// Device detection failed as a whole
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The discovery strategy produced no devices; carries its last error message
    #[error("{message}")]
    NoDevices { message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid blacklist pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
