use std::path::PathBuf;

/// ReelForge runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Where produced videos are stored and served from
    pub output_dir: PathBuf,
    /// Directory for rolling JSON logs
    pub log_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Request body cap for uploads, in MiB
    pub max_upload_mb: usize,
    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            output_dir: PathBuf::from("outputs"),
            log_dir: PathBuf::from("logs"),
            log_level: "info".to_string(),
            max_upload_mb: 1024,
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("REELFORGE_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("REELFORGE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            output_dir: std::env::var_os("REELFORGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            log_dir: std::env::var_os("REELFORGE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            max_upload_mb: std::env::var("REELFORGE_MAX_UPLOAD_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_mb),
            ffmpeg_path: media::locate_ffmpeg(),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
