//! CLI Doctor Command
//!
//! Checks that ffmpeg can be launched and that the output and log
//! directories are writable.

use std::path::Path;

use anyhow::Result;

use media::FfmpegTool;

use crate::config::Config;
use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Executes the full doctor diagnosis.
pub async fn run(config: &Config) -> Result<()> {
    note_info("Running ReelForge doctor...");

    let ffmpeg_ok = check_ffmpeg(&config.ffmpeg_path).await;
    let outputs_ok = check_writable("Output directory", &config.output_dir).await;
    let logs_ok = check_writable("Log directory", &config.log_dir).await;

    println!();
    if ffmpeg_ok && outputs_ok && logs_ok {
        note_success("All checks passed! ReelForge is ready.");
        Ok(())
    } else {
        anyhow::bail!("some checks failed, fix the errors above")
    }
}

async fn check_ffmpeg(program: &Path) -> bool {
    let tool = FfmpegTool::new(program);
    match tool.version().await {
        Ok(version) => {
            note_success(&format!("ffmpeg found at {}: {version}", program.display()));
            true
        }
        Err(e) => {
            note_error(&format!("ffmpeg is not usable ({e})"));
            note_warn(&format!(
                "Install ffmpeg or point {} at the executable",
                media::tool::FFMPEG_ENV
            ));
            false
        }
    }
}

async fn check_writable(label: &str, dir: &Path) -> bool {
    let probe = dir.join(".reelforge-doctor");
    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await
    }
    .await;

    match result {
        Ok(()) => {
            note_success(&format!("{label} {} is writable", dir.display()));
            true
        }
        Err(e) => {
            note_error(&format!("{label} {} is not writable: {e}", dir.display()));
            false
        }
    }
}
