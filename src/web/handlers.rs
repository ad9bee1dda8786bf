use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use crate::core::config;
use crate::core::error::AppError;
use crate::download::MediaMetadata;
use crate::web::AppState;

/// Body of `POST /info`
#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub url: String,
}

/// Body of `POST /download`
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
}

/// POST /info - metadata and downloadable formats for a URL
pub async fn handle_info(
    State(state): State<AppState>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<MediaMetadata>, AppError> {
    let Json(req) = payload?;
    let metadata = state.service.lookup_metadata(&req.url).await?;
    Ok(Json(metadata))
}

/// POST /download - download the chosen format and stream the file back
pub async fn handle_download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let stored = state
        .service
        .execute_download(&req.url, &req.format_id, None, CancellationToken::new())
        .await?;

    let file = tokio::fs::File::open(&stored.path).await?;
    let length = file.metadata().await?.len();
    let body = Body::from_stream(ReaderStream::new(file));

    let disposition = format!("attachment; filename=\"{}\"", config::download::CLIENT_FILENAME);

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(config::download::CLIENT_MEDIA_TYPE));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// GET /health - simple health check
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mediafetch",
        "version": env!("CARGO_PKG_VERSION"),
        "extractor": state.service.extractor_name(),
        "armed_expiries": state.service.scheduler().armed_count(),
    }))
}
