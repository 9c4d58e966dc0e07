use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Top-level error type for ReelForge operations.
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("please upload at least 2 videos to merge (got {got})")]
    NotEnoughVideos { got: usize },

    #[error("please select all videos in your desired order: {0}")]
    IncompleteOrder(String),

    #[error("unsupported upload {name}: {reason}")]
    UnsupportedUpload { name: String, reason: String },

    #[error("missing multipart field: {0}")]
    MissingField(&'static str),

    #[error("{stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest path contains a single quote: {0}")]
    UnsafeManifestPath(PathBuf),

    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used by the HTTP and CLI surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Upload or ordering problem; the operation was not attempted.
    Precondition,
    /// The external tool exited non-zero.
    Tool,
    /// Filesystem, decode or launch fault.
    Internal,
}

impl ReelError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReelError::NotEnoughVideos { .. }
            | ReelError::IncompleteOrder(_)
            | ReelError::UnsupportedUpload { .. }
            | ReelError::MissingField(_) => ErrorClass::Precondition,
            ReelError::ToolFailed { .. } => ErrorClass::Tool,
            ReelError::Spawn { .. }
            | ReelError::UnsafeManifestPath(_)
            | ReelError::Image(_)
            | ReelError::Io(_)
            | ReelError::Other(_) => ErrorClass::Internal,
        }
    }
}

pub type ReelResult<T> = Result<T, ReelError>;
