//! Output download server: serves produced videos over HTTP.
//!
//! Files are addressed by their stored name and offered for download under
//! the friendly name of the flow that produced them.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use reelforge_core::OperationKind;
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::detect_mime_type;

/// State shared by download routes.
#[derive(Clone)]
pub struct MediaServerState {
    pub output_dir: Arc<PathBuf>,
}

/// Build the download router.
///
/// Mount at `/outputs`:
///   GET /outputs/:filename : download a produced file
pub fn media_router(output_dir: PathBuf) -> Router {
    let state = MediaServerState {
        output_dir: Arc::new(output_dir),
    };
    Router::new()
        .route("/:filename", get(serve_output))
        .with_state(state)
}

/// Friendly download name for a stored output.
pub fn download_name(stored: &str) -> String {
    [OperationKind::Concat, OperationKind::Watermark]
        .into_iter()
        .find(|kind| stored.ends_with(kind.output_suffix()))
        .map(|kind| kind.download_name().to_string())
        .unwrap_or_else(|| stored.to_string())
}

fn is_safe_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

/// GET /:filename: send a produced file.
async fn serve_output(
    Path(filename): Path<String>,
    State(state): State<MediaServerState>,
) -> Response {
    if !is_safe_name(&filename) {
        warn!(filename = %filename, "Rejected suspicious output path");
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    }

    let path = state.output_dir.join(&filename);
    debug!(path = %path.display(), "Serving output file");

    match fs::read(&path).await {
        Ok(bytes) => {
            let mime = detect_mime_type(&path);
            let name = download_name(&filename);
            let disposition = format!("attachment; filename=\"{name}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                    (header::CONTENT_LENGTH, bytes.len().to_string()),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Output file not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read output file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read output").into_response()
        }
    }
}
