use async_trait::async_trait;

use crate::domain::error::MediaStoreError;

/// Storage behind the upload gateway
#[async_trait]
pub trait MediaStore {
    /// Persist `bytes` under `key` (`<folder>/<name>`) and return its public URL
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, MediaStoreError>;
}
