//! Best-effort metadata probe.
//!
//! Runs the tool with a null output and scrapes its stderr banner. The exit
//! status says nothing useful here and is ignored.

use std::ffi::OsString;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use reelforge_core::VideoMetadata;
use tracing::{debug, warn};

use crate::tool::{push_args, ToolRunner};

/// First `WIDTHxHEIGHT` pair anywhere in the text. Not anchored to the
/// video stream line, so an earlier `NxM` in metadata wins.
static RESOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").unwrap());

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration: (\d+):(\d+):(\d+\.\d+)").unwrap());

/// Arguments for `ffmpeg -i <video> -f null -`.
pub fn probe_args(video: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), video.into()];
    push_args(&mut args, ["-f", "null", "-"]);
    args
}

/// Extract width, height and duration from diagnostic text. Returns `None`
/// unless all three are found and non-zero.
pub fn parse_probe_output(stderr: &str) -> Option<VideoMetadata> {
    let caps = RESOLUTION_RE.captures(stderr)?;
    let width: u32 = caps[1].parse().ok()?;
    let height: u32 = caps[2].parse().ok()?;

    let caps = DURATION_RE.captures(stderr)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let duration_secs = hours * 3600.0 + minutes * 60.0 + seconds;

    if width == 0 || height == 0 || duration_secs <= 0.0 {
        return None;
    }
    Some(VideoMetadata {
        width,
        height,
        duration_secs,
    })
}

/// Probe `video`. Launch failures and unparseable output both yield `None`.
pub async fn probe_video(runner: &dyn ToolRunner, video: &Path) -> Option<VideoMetadata> {
    match runner.run(probe_args(video)).await {
        Ok(out) => {
            let meta = parse_probe_output(&out.stderr);
            debug!(video = %video.display(), found = meta.is_some(), "Probe finished");
            meta
        }
        Err(e) => {
            warn!(video = %video.display(), error = %e, "Probe could not run");
            None
        }
    }
}
