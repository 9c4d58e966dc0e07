use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use media::{declared_or_detected, is_image, is_video, media_router, parse_order, ToolRunner};
use reelforge_core::{
    ErrorClass, OperationKind, OperationOutcome, ReelError, UploadSummary, UploadedFile,
};

use crate::operations;

/// Shared application state for API handlers.
pub struct AppState {
    pub tool: Arc<dyn ToolRunner>,
    pub output_dir: PathBuf,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let outputs = media_router(state.output_dir.clone());
    Router::new()
        .route("/api/health", get(health))
        .route("/api/concat", post(concat))
        .route("/api/watermark", post(watermark))
        .route("/api/logo/preview", post(logo_preview))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .nest("/outputs", outputs)
        .layer(TraceLayer::new_for_http())
}

/// Error rendered as `{ ok: false, class, error }`.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body.
    BadRequest(String),
    /// A concat or watermark request failed.
    Operation { kind: OperationKind, err: ReelError },
    /// Logo preview failed.
    Preview(ReelError),
}

impl ApiError {
    fn status_and_class(&self) -> (StatusCode, ErrorClass) {
        let class = match self {
            ApiError::BadRequest(_) => ErrorClass::Precondition,
            ApiError::Operation { err, .. } | ApiError::Preview(err) => err.class(),
        };
        let status = match class {
            ErrorClass::Precondition => StatusCode::BAD_REQUEST,
            ErrorClass::Tool => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, class)
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Operation { kind, err } => operations::failure_message(*kind, err),
            ApiError::Preview(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, class) = self.status_and_class();
        let body = json!({
            "ok": false,
            "class": class,
            "error": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Successful concat or watermark response.
#[derive(Debug, Serialize)]
struct OutcomeResponse {
    ok: bool,
    message: String,
    download_url: String,
    download_name: &'static str,
    outcome: OperationOutcome,
}

impl OutcomeResponse {
    fn new(outcome: OperationOutcome) -> Self {
        let stored = outcome
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            ok: true,
            message: outcome.message.clone(),
            download_url: format!("/outputs/{stored}"),
            download_name: outcome.kind.download_name(),
            outcome,
        }
    }
}

/// Files and fields collected from one multipart body.
#[derive(Debug, Default)]
struct UploadForm {
    videos: Vec<UploadedFile>,
    logo: Option<UploadedFile>,
    /// File names from every `order` field, one per line.
    order: Vec<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "order" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid order field: {e}")))?;
                form.order.extend(parse_order(&text));
            }
            "video" | "logo" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime = declared_or_detected(&file_name, field.content_type());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read {file_name}: {e}")))?;
                let file = UploadedFile::new(file_name, mime, data);
                if field_name == "video" {
                    if !is_video(&file.mime_type) {
                        warn!(name = %file.name, mime = %file.mime_type, "Video upload has non-video type");
                    }
                    form.videos.push(file);
                } else {
                    if !is_image(&file.mime_type) {
                        warn!(name = %file.name, mime = %file.mime_type, "Logo upload has non-image type");
                    }
                    form.logo = Some(file);
                }
            }
            other => debug!(field = %other, "Ignoring multipart field"),
        }
    }
    Ok(form)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "reelforge",
        "version": env!("CARGO_PKG_VERSION"),
        "ffmpeg": state.tool.program().display().to_string(),
    }))
}

/// Merge two or more uploaded videos.
async fn concat(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let UploadForm { videos, order, .. } = read_form(multipart).await?;
    let order = (!order.is_empty()).then_some(order);
    let output = prepare_output(&state.output_dir, OperationKind::Concat).await?;

    let tool = state.tool.clone();
    let outcome = operations::detached(async move {
        operations::merge(tool.as_ref(), videos, order.as_deref(), &output).await
    })
    .await
    .map_err(|err| ApiError::Operation {
        kind: OperationKind::Concat,
        err,
    })?;
    Ok(Json(OutcomeResponse::new(outcome)))
}

/// Overlay an uploaded logo onto an uploaded video.
async fn watermark(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let kind = OperationKind::Watermark;
    let form = read_form(multipart).await?;
    let precondition = |err| ApiError::Operation { kind, err };

    let video = form
        .videos
        .into_iter()
        .next()
        .ok_or_else(|| precondition(ReelError::MissingField("video")))?;
    let logo = form
        .logo
        .ok_or_else(|| precondition(ReelError::MissingField("logo")))?;
    let output = prepare_output(&state.output_dir, kind).await?;

    let tool = state.tool.clone();
    let outcome = operations::detached(async move {
        operations::watermark(tool.as_ref(), video, logo, &output).await
    })
    .await
    .map_err(|err| ApiError::Operation { kind, err })?;
    Ok(Json(OutcomeResponse::new(outcome)))
}

/// Report the logo's size and the size it will be overlaid at.
async fn logo_preview(multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let form = read_form(multipart).await?;
    let logo = form
        .logo
        .ok_or(ApiError::Preview(ReelError::MissingField("logo")))?;
    media::validate_logo(&logo).map_err(ApiError::Preview)?;

    let data = logo.data.clone();
    let plan = tokio::task::spawn_blocking(move || media::plan_logo(&data))
        .await
        .map_err(|e| ApiError::Preview(ReelError::Other(e.into())))?
        .map_err(ApiError::Preview)?;

    let summary: UploadSummary = logo.summary();
    Ok(Json(json!({
        "ok": true,
        "logo": summary,
        "size_kb": summary.size_kb(),
        "plan": plan,
        "resized": plan.is_resized(),
    })))
}

async fn prepare_output(dir: &Path, kind: OperationKind) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Operation {
            kind,
            err: ReelError::Io(e),
        })?;
    Ok(operations::output_path(dir, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTool;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "reelforge-test-boundary";

    /// Hand-built multipart/form-data body.
    #[derive(Default)]
    struct Form {
        body: Vec<u8>,
    }

    impl Form {
        fn file(mut self, field: &str, name: &str, mime: &str, data: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(data);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        fn video(self, name: &str, data: &[u8]) -> Self {
            self.file("video", name, "video/mp4", data)
        }

        fn text(mut self, field: &str, value: &str) -> Self {
            self.body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
            self
        }

        fn post(mut self, uri: &str) -> Request<Body> {
            self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(self.body))
                .unwrap()
        }
    }

    fn app(tool: Arc<RecordingTool>, output_dir: &Path) -> Router {
        let state = Arc::new(AppState {
            tool,
            output_dir: output_dir.to_path_buf(),
        });
        build_router(state, 1 << 20)
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn stored_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn precondition_errors_are_bad_requests() {
        let response = ApiError::Operation {
            kind: OperationKind::Concat,
            err: ReelError::NotEnoughVideos { got: 1 },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["class"], "precondition");
    }

    #[tokio::test]
    async fn tool_failures_carry_diagnostics() {
        let response = ApiError::Operation {
            kind: OperationKind::Concat,
            err: ReelError::ToolFailed {
                exit_code: Some(1),
                stderr: "Impossible to open 'input-000.mp4'".into(),
            },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["class"], "tool");
        assert_eq!(body["error"], "Impossible to open 'input-000.mp4'");
    }

    #[tokio::test]
    async fn internal_errors_are_server_errors() {
        let response = ApiError::Preview(ReelError::Image("truncated".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn outcome_response_links_stored_output() {
        let outcome = OperationOutcome::new(
            OperationKind::Concat,
            PathBuf::from("outputs/abc_merged.mp4"),
            "Videos merged successfully!",
        );
        let response = OutcomeResponse::new(outcome);
        assert_eq!(response.download_url, "/outputs/abc_merged.mp4");
        assert_eq!(response.download_name, "merged_video.mp4");
        assert_eq!(response.message, "Videos merged successfully!");
    }

    #[tokio::test]
    async fn concat_follows_order_and_serves_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());
        let router = app(tool.clone(), dir.path());

        let request = Form::default()
            .video("A.mp4", b"a")
            .video("B.mp4", b"b")
            .video("C.mp4", b"c")
            .text("order", "B.mp4\nA.mp4\nC.mp4")
            .post("/api/concat");
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["download_name"], "merged_video.mp4");
        let runs = tool.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(
            runs[0].inputs,
            vec![Some(b"b".to_vec()), Some(b"a".to_vec()), Some(b"c".to_vec())]
        );

        let url = body["download_url"].as_str().unwrap();
        let download = router
            .oneshot(Request::get(url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(download.status(), StatusCode::OK);
        let disposition = download.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("merged_video.mp4"));
        let bytes = to_bytes(download.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"rendered");
    }

    #[tokio::test]
    async fn repeated_order_fields_keep_commas_in_names() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());

        let request = Form::default()
            .video("intro, part 1.mp4", b"intro")
            .video("outro.mp4", b"outro")
            .text("order", "outro.mp4")
            .text("order", "intro, part 1.mp4")
            .post("/api/concat");
        let response = app(tool.clone(), dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            tool.runs()[0].inputs,
            vec![Some(b"outro".to_vec()), Some(b"intro".to_vec())]
        );
    }

    #[tokio::test]
    async fn concat_of_one_video_is_rejected_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());

        let request = Form::default().video("A.mp4", b"a").post("/api/concat");
        let response = app(tool.clone(), dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["class"], "precondition");
        assert!(tool.runs().is_empty());
    }

    #[tokio::test]
    async fn watermark_uses_the_first_video() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());

        let request = Form::default()
            .video("first.mp4", b"first")
            .video("second.mp4", b"second")
            .file("logo", "logo.png", "image/png", &png(40, 20))
            .post("/api/watermark");
        let response = app(tool.clone(), dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["download_name"], "watermarked_video.mp4");
        let runs = tool.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].inputs, vec![Some(b"first".to_vec())]);
    }

    #[tokio::test]
    async fn watermark_without_logo_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());

        let request = Form::default().video("clip.mp4", b"clip").post("/api/watermark");
        let response = app(tool.clone(), dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["class"], "precondition");
        assert!(tool.runs().is_empty());
    }

    #[tokio::test]
    async fn logo_preview_reports_the_overlay_size() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(RecordingTool::succeeding());

        let request = Form::default()
            .file("logo", "wide.png", "image/png", &png(300, 120))
            .post("/api/logo/preview");
        let response = app(tool, dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resized"], true);
        assert_eq!(body["plan"]["original"]["width"], 300);
        assert_eq!(body["plan"]["resized"]["width"], 150);
        assert_eq!(body["plan"]["resized"]["height"], 60);
    }

    #[tokio::test]
    async fn tool_failure_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = dir.path().join("outputs");
        let tool = Arc::new(RecordingTool::new(1, "Invalid data found when processing input"));

        let request = Form::default()
            .video("clip.mp4", b"clip")
            .file("logo", "logo.png", "image/png", &png(40, 20))
            .post("/api/watermark");
        let response = app(tool, &outputs).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["class"], "tool");
        assert_eq!(body["error"], "FFmpeg error: Invalid data found when processing input");
        assert_eq!(stored_files(&outputs), 0);
    }
}
