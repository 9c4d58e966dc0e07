//! CLI concat, watermark and probe commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use media::{detect_mime_type, probe_video, FfmpegTool, ToolRunner};
use reelforge_core::{OperationKind, OperationOutcome, ReelResult, Resolution, UploadedFile};

use crate::operations;
use crate::terminal_output::{
    note_error, note_info, note_success, note_warn, render_table, upload_table, Column, SizeUnit,
};

/// Read a file from disk as an upload named after its file name.
pub async fn load_upload(path: &Path) -> Result<UploadedFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedFile::new(name, detect_mime_type(path), data))
}

pub async fn concat(tool: &FfmpegTool, inputs: &[PathBuf], output: &Path) -> Result<()> {
    let mut videos = Vec::with_capacity(inputs.len());
    for path in inputs {
        videos.push(load_upload(path).await?);
    }
    let summaries: Vec<_> = videos.iter().map(UploadedFile::summary).collect();
    note_info(&format!("Merging {} videos in this order:", videos.len()));
    print!("{}", upload_table(&summaries, SizeUnit::Mb));

    ensure_parent(output).await?;
    let result = operations::merge(tool, videos, None, output).await;
    report(OperationKind::Concat, result)
}

pub async fn watermark(tool: &FfmpegTool, video: &Path, logo: &Path, output: &Path) -> Result<()> {
    let logo = load_upload(logo).await?;
    print!("{}", upload_table(&[logo.summary()], SizeUnit::Kb));

    ensure_parent(output).await?;
    let result = operations::watermark_file(tool, video, logo, output).await;
    report(OperationKind::Watermark, result)
}

pub async fn probe(tool: &FfmpegTool, video: &Path) -> Result<()> {
    match probe_video(tool as &dyn ToolRunner, video).await {
        Some(meta) => {
            let columns = vec![Column::left("Video"), Column::right("Resolution"), Column::right("Duration (s)")];
            let rows = vec![vec![
                video.display().to_string(),
                meta.resolution().to_string(),
                format!("{:.2}", meta.duration_secs),
            ]];
            print!("{}", render_table(&columns, &rows));
        }
        None => {
            note_warn(&format!(
                "Could not detect dimensions of {}; watermarking would assume {}",
                video.display(),
                Resolution::FALLBACK
            ));
        }
    }
    Ok(())
}

async fn ensure_parent(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn report(kind: OperationKind, result: ReelResult<OperationOutcome>) -> Result<()> {
    match result {
        Ok(outcome) => {
            note_success(&outcome.message);
            note_info(&format!("Output written to {}", outcome.output_path.display()));
            Ok(())
        }
        Err(err) => {
            note_error(&operations::failure_message(kind, &err));
            Err(anyhow::anyhow!("{kind} failed ({:?})", err.class()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_upload_uses_file_name_and_detected_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Clip.MOV");
        std::fs::write(&path, b"data").unwrap();

        let upload = load_upload(&path).await.unwrap();

        assert_eq!(upload.name, "Clip.MOV");
        assert_eq!(upload.mime_type, "video/quicktime");
        assert_eq!(upload.size(), 4);
    }

    #[tokio::test]
    async fn load_upload_reports_missing_file() {
        let err = load_upload(Path::new("/nonexistent/clip.mp4")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/clip.mp4"));
    }

    #[tokio::test]
    async fn ensure_parent_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a/b/out.mp4");
        ensure_parent(&output).await.unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
