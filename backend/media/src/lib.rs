//! Video concatenation and watermarking on top of ffmpeg.
//!
//! Every frame-level operation is delegated to the external tool; this crate
//! prepares inputs, builds argument lists and interprets the results.

pub mod arrange;
pub mod concat;
pub mod logo;
pub mod manifest;
pub mod media_server;
pub mod mime_detect;
pub mod probe;
pub mod scratch;
pub mod tool;
pub mod watermark;

pub use arrange::{apply_order, ensure_min_videos, parse_order, validate_logo, validate_video};
pub use concat::concat_videos;
pub use logo::{plan_logo, LogoPlan, MAX_LOGO_WIDTH};
pub use media_server::media_router;
pub use mime_detect::{declared_or_detected, detect_mime_type, is_image, is_video};
pub use probe::{parse_probe_output, probe_video};
pub use tool::{locate_ffmpeg, FfmpegTool, ToolOutput, ToolRunner};
pub use watermark::{add_watermark, add_watermark_upload};
