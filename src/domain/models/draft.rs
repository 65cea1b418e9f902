use crate::domain::{
    error::DomainError,
    models::{national_id, registration::Employer},
};

/// 10 MiB
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image picked by the registrant, held in memory until submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: String, content_type: String, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let is_image = content_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(DomainError::UnsupportedImageType(content_type));
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Field values as typed into the form. Nothing here is validated beyond the ID mask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    full_name: String,
    national_id: String,
    employer: Option<Employer>,
    image: Option<ImageFile>,
}

impl RegistrationDraft {
    pub fn set_full_name(&mut self, value: &str) {
        self.full_name = value.to_string();
    }

    /// Stores the masked form of whatever was typed
    pub fn set_national_id(&mut self, raw: &str) {
        self.national_id = national_id::format(raw);
    }

    pub fn select_employer(&mut self, employer: Option<Employer>) {
        self.employer = employer;
    }

    /// Oversized images are refused and leave no file selected
    pub fn attach_image(&mut self, image: ImageFile, max_bytes: usize) -> Result<(), DomainError> {
        if image.size() > max_bytes {
            self.image = None;
            return Err(DomainError::ImageTooLarge {
                size: image.size(),
                max: max_bytes,
            });
        }
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Clears every field including the selected file
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Required fields are filled; says nothing about the ID checksum
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.national_id.is_empty()
            && self.employer.is_some()
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
    pub fn national_id(&self) -> &str {
        &self.national_id
    }
    pub fn employer(&self) -> Option<Employer> {
        self.employer
    }
    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }
}
