use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{national_id::NationalId, registration::Registration},
};

/// Store of persisted registrations
#[async_trait]
pub trait RegistrationRepository {
    /// Whether any record already holds `national_id`. Always a live query.
    async fn exists_by_national_id(&self, national_id: &NationalId)
    -> Result<bool, RepositoryError>;

    /// Insert a new record; a unique-key clash is reported as `RepositoryError::Conflict`
    async fn insert(&self, registration: &Registration) -> Result<(), RepositoryError>;
}
