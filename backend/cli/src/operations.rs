//! Request-level orchestration shared by the HTTP API and the CLI.
//!
//! Validates uploads, applies the requested order, emits operation events and
//! turns failures into the text shown to the user.

use std::future::Future;
use std::path::{Path, PathBuf};

use reelforge_core::{ErrorClass, OperationKind, OperationOutcome, ReelError, ReelResult, UploadedFile};
use uuid::Uuid;

use logging::{EventLogger, OperationEvent};
use media::ToolRunner;

/// Fresh stored-output path for `kind` under `dir`.
pub fn output_path(dir: &Path, kind: OperationKind) -> PathBuf {
    dir.join(format!("{}{}", Uuid::new_v4().simple(), kind.output_suffix()))
}

/// Run `work` on its own task and wait for it. Dropping the returned future
/// (a disconnected client) does not cancel the operation.
pub async fn detached<F>(work: F) -> ReelResult<OperationOutcome>
where
    F: Future<Output = ReelResult<OperationOutcome>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| ReelError::Other(e.into()))?
}

/// Merge `videos` in the order given by `order` (file names), or upload order
/// when no order is supplied.
pub async fn merge(
    tool: &dyn ToolRunner,
    videos: Vec<UploadedFile>,
    order: Option<&[String]>,
    output: &Path,
) -> ReelResult<OperationOutcome> {
    for video in &videos {
        media::validate_video(video)?;
    }
    media::ensure_min_videos(&videos)?;
    let arranged = media::apply_order(videos, order)?;

    let inputs = arranged.iter().map(|f| f.name.clone()).collect();
    logged(
        OperationKind::Concat,
        inputs,
        media::concat_videos(tool, &arranged, output),
    )
    .await
}

/// Watermark an uploaded video with an uploaded logo.
pub async fn watermark(
    tool: &dyn ToolRunner,
    video: UploadedFile,
    logo: UploadedFile,
    output: &Path,
) -> ReelResult<OperationOutcome> {
    media::validate_video(&video)?;
    media::validate_logo(&logo)?;

    let inputs = vec![video.name.clone(), logo.name.clone()];
    logged(
        OperationKind::Watermark,
        inputs,
        media::add_watermark_upload(tool, &video, &logo, output),
    )
    .await
}

/// Watermark a video that is already on disk.
pub async fn watermark_file(
    tool: &dyn ToolRunner,
    video: &Path,
    logo: UploadedFile,
    output: &Path,
) -> ReelResult<OperationOutcome> {
    media::validate_logo(&logo)?;

    let inputs = vec![video.display().to_string(), logo.name.clone()];
    logged(
        OperationKind::Watermark,
        inputs,
        media::add_watermark(tool, video, &logo, output),
    )
    .await
}

async fn logged<F>(kind: OperationKind, inputs: Vec<String>, run: F) -> ReelResult<OperationOutcome>
where
    F: Future<Output = ReelResult<OperationOutcome>>,
{
    let request_id = Uuid::new_v4().to_string();
    EventLogger::log_event(
        &request_id,
        OperationEvent::Started {
            operation: kind.to_string(),
            inputs,
        },
    );

    let result = run.await;
    let event = match &result {
        Ok(outcome) => OperationEvent::Succeeded {
            operation: kind.to_string(),
            output: outcome.output_path.display().to_string(),
        },
        Err(e) => OperationEvent::Failed {
            operation: kind.to_string(),
            class: class_name(e.class()).to_string(),
            error_msg: e.to_string(),
        },
    };
    EventLogger::log_event(&request_id, event);
    result
}

fn class_name(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::Precondition => "precondition",
        ErrorClass::Tool => "tool",
        ErrorClass::Internal => "internal",
    }
}

/// Text shown to the user when `kind` fails with `err`.
///
/// Concat tool failures carry the diagnostics verbatim; watermark failures
/// prefix them. Internal faults name the operation.
pub fn failure_message(kind: OperationKind, err: &ReelError) -> String {
    match (err.class(), kind) {
        (ErrorClass::Precondition, _) => err.to_string(),
        (ErrorClass::Tool, OperationKind::Concat) => err.to_string(),
        (ErrorClass::Tool, OperationKind::Watermark) => format!("FFmpeg error: {err}"),
        (ErrorClass::Internal, OperationKind::Concat) => format!("Error merging videos: {err}"),
        (ErrorClass::Internal, OperationKind::Watermark) => format!("Error adding watermark: {err}"),
    }
}
