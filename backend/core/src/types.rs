use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file received from the user: raw bytes plus the name and MIME type
/// the client declared for it.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased extension of the declared file name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            name: self.name.clone(),
            size_bytes: self.data.len() as u64,
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Name, size and declared type of an upload, as shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl UploadSummary {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Assumed frame size when the probe cannot read the real one.
    pub const FALLBACK: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Video properties scraped from the tool's diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

impl VideoMetadata {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Which flow produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Concat,
    Watermark,
}

impl OperationKind {
    /// Suffix appended to stored output names.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            OperationKind::Concat => "_merged.mp4",
            OperationKind::Watermark => "_watermarked.mp4",
        }
    }

    /// File name offered to the user on download.
    pub fn download_name(&self) -> &'static str {
        match self {
            OperationKind::Concat => "merged_video.mp4",
            OperationKind::Watermark => "watermarked_video.mp4",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Concat => write!(f, "concat"),
            OperationKind::Watermark => write!(f, "watermark"),
        }
    }
}

/// Result of one successful request. Replaces any notion of a shared
/// "last output" slot: every caller receives its own value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub id: Uuid,
    pub kind: OperationKind,
    pub output_path: PathBuf,
    pub message: String,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl OperationOutcome {
    pub fn new(kind: OperationKind, output_path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            output_path,
            message: message.into(),
            finished_at: Utc::now(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add one key to an object-valued `details`, creating it if unset.
    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        if self.details.is_null() {
            self.details = serde_json::Value::Object(Default::default());
        }
        if let Some(map) = self.details.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let file = UploadedFile::new("Clip.MOV", "video/quicktime", Vec::new());
        assert_eq!(file.extension().as_deref(), Some("mov"));
        let bare = UploadedFile::new("clip", "video/mp4", Vec::new());
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn summary_sizes() {
        let file = UploadedFile::new("a.mp4", "video/mp4", vec![0u8; 2 * 1024 * 1024]);
        let summary = file.summary();
        assert_eq!(summary.size_bytes, 2 * 1024 * 1024);
        assert!((summary.size_mb() - 2.0).abs() < f64::EPSILON);
        assert!((summary.size_kb() - 2048.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fallback_resolution_is_full_hd() {
        assert_eq!(Resolution::FALLBACK.to_string(), "1920x1080");
    }

    #[test]
    fn outcome_serializes_kind_snake_case() {
        let outcome = OperationOutcome::new(
            OperationKind::Watermark,
            PathBuf::from("outputs/x_watermarked.mp4"),
            "done",
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "watermark");
        assert_eq!(OperationKind::Concat.download_name(), "merged_video.mp4");
    }

    #[test]
    fn with_detail_builds_object() {
        let outcome = OperationOutcome::new(OperationKind::Concat, PathBuf::from("o.mp4"), "ok")
            .with_detail("inputs", serde_json::json!(3));
        assert_eq!(outcome.details["inputs"], 3);
    }
}
