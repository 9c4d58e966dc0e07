//! Shared types and the error model for ReelForge.

pub mod error;
pub mod types;

pub use error::{ErrorClass, ReelError, ReelResult};
pub use types::{
    OperationKind, OperationOutcome, Resolution, UploadSummary, UploadedFile, VideoMetadata,
};
