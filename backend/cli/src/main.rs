mod api;
mod config;
mod doctor_cmd;
mod media_cmd;
mod operations;
mod status_cmd;
mod terminal_output;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use media::FfmpegTool;

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "reelforge")]
#[command(about = "ReelForge: merge videos and stamp logos with ffmpeg")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Merge two or more videos, in the order given
    Concat {
        /// Input videos
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,
        /// Where to write the merged video
        #[arg(short, long, default_value = "merged_video.mp4")]
        output: PathBuf,
    },
    /// Overlay a logo in the bottom-right corner of a video
    Watermark {
        video: PathBuf,
        logo: PathBuf,
        /// Where to write the watermarked video
        #[arg(short, long, default_value = "watermarked_video.mp4")]
        output: PathBuf,
    },
    /// Print a video's resolution and duration
    Probe { video: PathBuf },
    /// Check that ffmpeg and the configured directories are usable
    Doctor,
    /// Show whether a server is running
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { .. } => logging::init_logger(&config.log_dir, &config.log_level)?,
        _ => logging::init_console_logger(&config.log_level),
    }
    let tool = FfmpegTool::new(&config.ffmpeg_path);

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config, tool).await?;
        }
        Commands::Concat { inputs, output } => media_cmd::concat(&tool, &inputs, &output).await?,
        Commands::Watermark { video, logo, output } => {
            media_cmd::watermark(&tool, &video, &logo, &output).await?
        }
        Commands::Probe { video } => media_cmd::probe(&tool, &video).await?,
        Commands::Doctor => doctor_cmd::run(&config).await?,
        Commands::Status { port } => status_cmd::run(port.unwrap_or(config.port)).await?,
    }

    Ok(())
}

async fn run_server(config: Config, tool: FfmpegTool) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        output_dir = %config.output_dir.display(),
        ffmpeg = %config.ffmpeg_path.display(),
        "Starting ReelForge server"
    );

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let app_state = Arc::new(AppState {
        tool: Arc::new(tool),
        output_dir: config.output_dir.clone(),
    });

    let app = api::build_router(app_state, config.max_upload_bytes()).layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
