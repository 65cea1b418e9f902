use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    error::UploadError,
    models::{draft::ImageFile, registration::ImageUrl},
    services::image_uploader::ImageUploader,
};

/// Multipart field the gateway reads the image from
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// Talks to the upload gateway over HTTP
#[derive(Clone)]
pub struct HttpImageUploader {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpImageUploader {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, image: &ImageFile) -> Result<ImageUrl, UploadError> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        debug!(endpoint = %self.endpoint, file = image.file_name(), "uploading image");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let parsed = serde_json::from_slice::<UploadResponse>(&body);

        if !status.is_success() {
            let message = parsed.ok().and_then(|r| r.message).unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parsed
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?
            .image_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| UploadError::MalformedResponse("missing imageUrl".to_string()))
    }
}
