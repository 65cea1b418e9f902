use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Empty full name")]
    EmptyFullName,

    #[error("Invalid national ID")]
    InvalidNationalId,

    #[error("Image too large ({size} bytes, maximum {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("Form is busy with a submission")]
    FormBusy,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("National ID already registered")]
    Conflict,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// The gateway answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Upload transport error: {0}")]
    Transport(String),

    #[error("Malformed upload response: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    /// Message worth showing to the person filling the form, if the gateway sent one
    pub fn gateway_message(&self) -> Option<&str> {
        match self {
            UploadError::Rejected { message, .. } if !message.trim().is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("Media storage error: {0}")]
pub struct MediaStoreError(pub String);
