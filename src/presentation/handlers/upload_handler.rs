use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    domain::services::media_store::MediaStore, infrastructure::http_image_uploader::IMAGE_FIELD,
};

/// Room left for multipart boundaries and headers on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// Response

/// json for both outcomes of an upload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = UploadResponse {
            message: self.message,
            image_url: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/* Router Function and Handler Function */

#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Destination folder inside the media store
    pub folder: String,
    pub max_bytes: usize,
}

pub struct UploadState<S: MediaStore> {
    pub store: Arc<S>,
    pub settings: UploadSettings,
}

impl<S: MediaStore> Clone for UploadState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

/// function return Router object
/// Suppose to be nested by main router
pub fn create_upload_router<S: MediaStore + Send + Sync + 'static>(
    store: S,
    settings: UploadSettings,
) -> Router {
    let body_limit = settings.max_bytes + MULTIPART_OVERHEAD;
    let state = UploadState {
        store: Arc::new(store),
        settings,
    };

    Router::new()
        .route("/upload-image", post(upload_image::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// `<epoch-millis>-<original file name without directories>`
pub fn storage_name(original: &str, epoch_millis: i64) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    format!("{epoch_millis}-{base}")
}

/// handler function for image upload
async fn upload_image<S: MediaStore + Send + Sync>(
    State(state): State<UploadState<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(e.status(), format!("Error processing the file: {}", e.body_text()))
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::new(e.status(), format!("Error processing the file: {}", e.body_text()))
        })?;
        if file_name.is_empty() || bytes.is_empty() {
            break;
        }
        if bytes.len() > state.settings.max_bytes {
            return Err(ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "The image exceeds the maximum allowed size.",
            ));
        }

        let key = format!(
            "{}/{}",
            state.settings.folder,
            storage_name(&file_name, Utc::now().timestamp_millis())
        );
        let image_url = state
            .store
            .store(&key, &content_type, &bytes)
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "storing upload failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Image upload failed.")
            })?;

        info!(image_url = %image_url, "upload stored");
        return Ok(Json(UploadResponse {
            message: "Upload completed successfully!".to_string(),
            image_url: Some(image_url),
        }));
    }

    Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded."))
}
