//! MIME type detection for uploads and produced outputs.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        // Logos
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",

        // Videos
        "mp4"          => "video/mp4",
        "webm"         => "video/webm",
        "mkv"          => "video/x-matroska",
        "mov"          => "video/quicktime",
        "avi"          => "video/x-msvideo",
        "wmv"          => "video/x-ms-wmv",

        // Manifests
        "txt"          => "text/plain",

        _              => "application/octet-stream",
    }
}

/// MIME type the client declared, or one guessed from the file name when the
/// declaration is missing or generic.
pub fn declared_or_detected(file_name: &str, declared: Option<&str>) -> String {
    match declared {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => mime.to_string(),
        _ => detect_mime_type(Path::new(file_name)).to_string(),
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.starts_with("video/")
}
