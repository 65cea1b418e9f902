use async_trait::async_trait;

use crate::domain::{
    error::UploadError,
    models::{draft::ImageFile, registration::ImageUrl},
};

/// Client side of the upload gateway
#[async_trait]
pub trait ImageUploader {
    /// Send the image and return the public URL the gateway assigned to it
    async fn upload(&self, image: &ImageFile) -> Result<ImageUrl, UploadError>;
}
