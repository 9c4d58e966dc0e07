//! Bottom-right logo overlay.

use std::ffi::OsString;
use std::path::Path;

use reelforge_core::{OperationKind, OperationOutcome, ReelResult, Resolution, UploadedFile};
use serde_json::json;
use tracing::{info, warn};

use crate::logo::{prepare_logo, LogoPlan};
use crate::probe::probe_video;
use crate::scratch::{discard_partial, safe_extension, Scratch};
use crate::tool::{push_args, ToolRunner};

pub const SUCCESS_MESSAGE: &str = "Watermark added successfully!";

/// Gap in pixels between the logo and the frame's right and bottom edges.
pub const MARGIN: u32 = 20;
pub const VIDEO_CODEC: &str = "libx264";
pub const PRESET: &str = "medium";
pub const CRF: u32 = 23;

/// Overlay placing input 1 at the bottom-right of input 0. `W`/`H` are the
/// main frame size and `w`/`h` the logo size, resolved by the tool.
pub fn overlay_filter(margin: u32) -> String {
    format!("[0:v][1:v] overlay=W-w-{margin}:H-h-{margin}")
}

pub fn watermark_args(video: &Path, logo: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), video.into(), "-i".into(), logo.into()];
    args.push("-filter_complex".into());
    args.push(overlay_filter(MARGIN).into());
    push_args(&mut args, ["-codec:a", "copy", "-c:v", VIDEO_CODEC, "-preset", PRESET]);
    args.push("-crf".into());
    args.push(CRF.to_string().into());
    args.push("-y".into());
    args.push(output.into());
    args
}

/// Frame size reported back to the caller: measured when the probe worked,
/// the fallback otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub resolution: Resolution,
    pub measured: bool,
}

/// Overlay `logo` onto `video` (both already on disk) and write `output`.
///
/// The probe only feeds the report; the overlay expression does not depend
/// on it.
pub async fn add_watermark(
    runner: &dyn ToolRunner,
    video: &Path,
    logo: &UploadedFile,
    output: &Path,
) -> ReelResult<OperationOutcome> {
    let scratch = Scratch::new()?;
    let logo_path = scratch.file("logo.png");
    let plan = prepare_logo(logo.data.clone(), &logo_path).await?;

    let frame = match probe_video(runner, video).await {
        Some(meta) => {
            info!(resolution = %meta.resolution(), duration = meta.duration_secs, "Video dimensions");
            FrameSize {
                resolution: meta.resolution(),
                measured: true,
            }
        }
        None => {
            warn!(
                assumed = %Resolution::FALLBACK,
                "Could not detect video dimensions, using adaptive positioning"
            );
            FrameSize {
                resolution: Resolution::FALLBACK,
                measured: false,
            }
        }
    };

    info!(
        video = %video.display(),
        logo = %plan.resized,
        output = %output.display(),
        "Adding watermark"
    );
    let result = runner
        .run(watermark_args(video, &logo_path, output))
        .await?
        .into_result();
    if let Err(e) = &result {
        warn!(error = %e, "Watermark failed");
        discard_partial(output).await;
    }
    result?;

    Ok(
        OperationOutcome::new(OperationKind::Watermark, output.to_path_buf(), SUCCESS_MESSAGE)
            .with_details(details(&plan, frame)),
    )
}

fn details(plan: &LogoPlan, frame: FrameSize) -> serde_json::Value {
    json!({
        "logo": plan,
        "video_resolution": frame.resolution,
        "resolution_measured": frame.measured,
    })
}

/// Write an uploaded video to a scratch file and watermark it.
pub async fn add_watermark_upload(
    runner: &dyn ToolRunner,
    video: &UploadedFile,
    logo: &UploadedFile,
    output: &Path,
) -> ReelResult<OperationOutcome> {
    let scratch = Scratch::new()?;
    let name = format!("source.{}", safe_extension(video));
    let video_path = scratch.persist(&name, &video.data).await?;
    let outcome = add_watermark(runner, &video_path, logo, output).await?;
    Ok(outcome.with_detail("video", json!(video.summary())))
}
