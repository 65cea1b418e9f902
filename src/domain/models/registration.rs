use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{error::DomainError, models::national_id::NationalId};

pub type ImageUrl = String;

/// Employers a registrant can pick from; the list is fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Employer {
    #[serde(rename = "Simetria")]
    Simetria,
    #[serde(rename = "GC")]
    Gc,
}

impl Employer {
    pub const ALL: [Employer; 2] = [Employer::Simetria, Employer::Gc];

    /// Stored identifier
    pub fn value(&self) -> &'static str {
        match self {
            Employer::Simetria => "Simetria",
            Employer::Gc => "GC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Employer::Simetria => "Simetria Brasil",
            Employer::Gc => "GCpromotora",
        }
    }
}

/// A persisted registration. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    id: Uuid,
    full_name: String,
    national_id: NationalId,
    employer: Employer,
    has_bonus: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<ImageUrl>,
    registered_at: DateTime<Utc>,
}

impl Registration {
    /// Compose a new record. The bonus flag follows the image URL.
    pub fn new(
        full_name: &str,
        national_id: NationalId,
        employer: Employer,
        image_url: Option<ImageUrl>,
        registered_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(DomainError::EmptyFullName);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            national_id,
            employer,
            has_bonus: image_url.is_some(),
            image_url,
            registered_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
    pub fn national_id(&self) -> &NationalId {
        &self.national_id
    }
    pub fn employer(&self) -> Employer {
        self.employer
    }
    pub fn has_bonus(&self) -> bool {
        self.has_bonus
    }
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}
