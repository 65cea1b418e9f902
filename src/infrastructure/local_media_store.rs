use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{error::MediaStoreError, services::media_store::MediaStore};

/// Keeps uploads on the local disk; they are served back under `public_url_base`
#[derive(Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_url_base: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, public_url_base: String) -> Self {
        Self {
            root,
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(
        &self,
        key: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<String, MediaStoreError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaStoreError(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaStoreError(e.to_string()))?;
        debug!(path = %path.display(), size = bytes.len(), "stored upload");

        Ok(format!("{}/{}", self.public_url_base, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_writes_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080/media/".to_string(),
        );

        let url = store
            .store("registrations/1-me.jpg", "image/jpeg", b"jpeg")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8080/media/registrations/1-me.jpg");
        let written = std::fs::read(dir.path().join("registrations/1-me.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }
}
