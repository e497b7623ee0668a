//! Error types for drydock operations
//!
//! Every error is terminal to a single command invocation: nothing here is
//! retried internally. Each variant carries enough context to print a single
//! operator-facing line while preserving the underlying cause for logging.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for drydock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classification used for process exit codes.
///
/// `Config` covers everything the operator can fix by editing configuration
/// or the command line; `Backend` covers failures of the cluster backend or
/// the transition itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Configuration or input error
    Config,
    /// Backend or transition error
    Backend,
}

/// Main error type for drydock operations
#[derive(Debug, Error)]
pub enum Error {
    /// The mandatory base configuration file is missing
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// A configuration file exists but could not be parsed
    #[error("failed to parse configuration {path}: {message}")]
    ConfigParse {
        /// Path of the malformed file
        path: PathBuf,
        /// Parser error text
        message: String,
    },

    /// The assembled cluster configuration is unusable
    #[error("invalid cluster config: {message}")]
    InvalidClusterConfig {
        /// Description of what's missing or wrong
        message: String,
    },

    /// The cluster topology file is missing or unreadable
    #[error("cluster topology not found: {path}")]
    ClusterConfigNotFound {
        /// Path to the topology file
        path: PathBuf,
    },

    /// The cluster backend failed to respond
    #[error("backend unavailable [{backend}]: {message}")]
    BackendUnavailable {
        /// Backend identifier (e.g. "compose")
        backend: String,
        /// Description of what failed
        message: String,
    },

    /// The lifecycle transition was attempted and failed
    #[error("transition failed for {cluster}: {message}")]
    TransitionFailed {
        /// Name of the cluster the transition ran against
        cluster: String,
        /// Failure reason reported by the backend
        message: String,
    },
}

impl Error {
    /// Create a `ConfigNotFound` error for the given path
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a `ConfigParse` error for the given path
    pub fn config_parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an `InvalidClusterConfig` error with the given message
    pub fn invalid_cluster_config(msg: impl Into<String>) -> Self {
        Self::InvalidClusterConfig {
            message: msg.into(),
        }
    }

    /// Create a `ClusterConfigNotFound` error for the given topology path
    pub fn cluster_config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ClusterConfigNotFound { path: path.into() }
    }

    /// Create a `BackendUnavailable` error for the given backend
    pub fn backend_unavailable(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    /// Create a `TransitionFailed` error with cluster context
    pub fn transition_failed(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TransitionFailed {
            cluster: cluster.into(),
            message: msg.into(),
        }
    }

    /// Classify this error for exit-code mapping
    ///
    /// Configuration errors require the operator to fix inputs; backend
    /// errors mean the inputs were fine but the delegate failed.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigParse { .. }
            | Error::InvalidClusterConfig { .. }
            | Error::ClusterConfigNotFound { .. } => ErrorClass::Config,
            Error::BackendUnavailable { .. } | Error::TransitionFailed { .. } => {
                ErrorClass::Backend
            }
        }
    }

    /// Get the cluster name if this error is associated with a specific cluster
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Error::TransitionFailed { cluster, .. } => Some(cluster),
            _ => None,
        }
    }
}
