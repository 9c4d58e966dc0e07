//! Lossless concatenation through the concat demuxer.

use std::ffi::OsString;
use std::path::Path;

use reelforge_core::{OperationKind, OperationOutcome, ReelResult, UploadedFile};
use serde_json::json;
use tracing::{info, warn};

use crate::manifest::ConcatManifest;
use crate::scratch::{discard_partial, safe_extension, Scratch};
use crate::tool::{push_args, ToolRunner};

pub const SUCCESS_MESSAGE: &str = "Videos merged successfully!";

const MANIFEST_NAME: &str = "concat.txt";

/// Arguments for `ffmpeg -f concat -safe 0 -i <manifest> -c copy -y <output>`.
///
/// `-safe 0` is required because manifest entries are absolute paths.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    let mut args = Vec::new();
    push_args(&mut args, ["-f", "concat", "-safe", "0", "-i"]);
    args.push(manifest.into());
    push_args(&mut args, ["-c", "copy", "-y"]);
    args.push(output.into());
    args
}

/// Scratch file name for the `index`-th input, keeping a plain extension
/// from the upload so the demuxer can sniff the container.
fn input_name(index: usize, file: &UploadedFile) -> String {
    format!("input-{index:03}.{}", safe_extension(file))
}

/// Join `inputs`, in order, into `output` without re-encoding.
///
/// The caller enforces the minimum number of inputs. Every scratch file is
/// removed before this returns.
pub async fn concat_videos(
    runner: &dyn ToolRunner,
    inputs: &[UploadedFile],
    output: &Path,
) -> ReelResult<OperationOutcome> {
    let scratch = Scratch::new()?;

    let mut manifest = ConcatManifest::new();
    for (index, file) in inputs.iter().enumerate() {
        let path = scratch.persist(&input_name(index, file), &file.data).await?;
        manifest.push(path)?;
    }
    let manifest_path = scratch.file(MANIFEST_NAME);
    manifest.write_to(&manifest_path).await?;

    info!(
        inputs = manifest.len(),
        output = %output.display(),
        "Concatenating videos"
    );
    let result = runner
        .run(concat_args(&manifest_path, output))
        .await?
        .into_result();

    if let Err(e) = &result {
        warn!(error = %e, "Concat failed");
        discard_partial(output).await;
    }
    result?;

    let summaries: Vec<_> = inputs.iter().map(UploadedFile::summary).collect();
    Ok(
        OperationOutcome::new(OperationKind::Concat, output.to_path_buf(), SUCCESS_MESSAGE)
            .with_details(json!({ "inputs": summaries })),
    )
}
