use std::io;

use thiserror::Error;

use crate::registry::{Category, Handle};

/// Result alias for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur while describing a scene or driving the simulator process.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("handle {0} was never registered")]
    UnknownHandle(Handle),
    #[error("{parameter}: handle {handle} is a {actual:?}, expected a {expected:?}")]
    CategoryMismatch {
        parameter: &'static str,
        handle: Handle,
        expected: Category,
        actual: Category,
    },
    #[error("{parameter}: {reason}")]
    InvalidArgument {
        parameter: &'static str,
        reason: String,
    },
    #[error("collision matrix already built")]
    MatrixAlreadyBuilt,
    #[error("failed to spawn simulator: {0}")]
    ProcessSpawnFailure(String),
    #[error("malformed telemetry stream: {0}")]
    MalformedTelemetry(String),
    #[error("conflicting run configuration: {0}")]
    ConfigurationConflict(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("config serialization error: {0}")]
    ConfigSerialization(#[from] serde_json::Error),
}

impl SceneError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        SceneError::InvalidArgument {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn spawn(err: impl Into<String>) -> Self {
        SceneError::ProcessSpawnFailure(err.into())
    }

    pub(crate) fn telemetry(message: impl Into<String>) -> Self {
        SceneError::MalformedTelemetry(message.into())
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        SceneError::ConfigurationConflict(message.into())
    }
}
