use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QuerySelect, Schema, SqlErr,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::{
        error::RepositoryError,
        models::{national_id::NationalId, registration::Registration},
        repositories::registration_repository::RegistrationRepository,
    },
    infrastructure::entity::registrations,
};

pub struct SqlRegistrationRepository {
    db: DatabaseConnection,
}

impl SqlRegistrationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Create the `registrations` table (with its unique national ID index) if missing
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), RepositoryError> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(registrations::Entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement))
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
    Ok(())
}

/// Only the key of a matching row is read, so stored values that no longer
/// decode still count as a match
#[derive(Debug, FromQueryResult)]
struct MatchingRow {
    id: Uuid,
}

fn map_insert_error(error: DbErr) -> RepositoryError {
    match error.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Conflict,
        _ => RepositoryError::DatabaseError(error.to_string()),
    }
}

#[async_trait]
impl RegistrationRepository for SqlRegistrationRepository {
    async fn exists_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<bool, RepositoryError> {
        let found = registrations::Entity::find()
            .select_only()
            .column(registrations::Column::Id)
            .filter(registrations::Column::NationalId.eq(national_id.as_str()))
            .into_model::<MatchingRow>()
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        debug!(existing = ?found.as_ref().map(|row| row.id), "duplicate lookup");

        Ok(found.is_some())
    }

    async fn insert(&self, registration: &Registration) -> Result<(), RepositoryError> {
        let model = registrations::ActiveModel {
            id: Set(registration.id()),
            full_name: Set(registration.full_name().to_string()),
            national_id: Set(registration.national_id().as_str().to_string()),
            employer: Set(registration.employer().value().to_string()),
            has_bonus: Set(registration.has_bonus()),
            image_url: Set(registration.image_url().map(str::to_string)),
            registered_at: Set(registration.registered_at().fixed_offset()),
        };

        registrations::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(map_insert_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::domain::models::registration::Employer;

    fn stored(employer: &str, image_url: Option<&str>) -> registrations::Model {
        registrations::Model {
            id: Uuid::new_v4(),
            full_name: "Maria Silva".to_string(),
            national_id: "52998224725".to_string(),
            employer: employer.to_string(),
            has_bonus: image_url.is_some(),
            image_url: image_url.map(str::to_string),
            registered_at: Utc::now().fixed_offset(),
        }
    }

    fn national_id() -> NationalId {
        NationalId::parse("52998224725").unwrap()
    }

    #[tokio::test]
    async fn test_exists_by_national_id_finds_row() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![stored("GC", Some("https://host/x.jpg"))]])
            .into_connection();
        let repository = SqlRegistrationRepository::new(db);

        assert!(repository.exists_by_national_id(&national_id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_national_id_empty() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<registrations::Model>::new()])
            .into_connection();
        let repository = SqlRegistrationRepository::new(db);

        assert!(!repository.exists_by_national_id(&national_id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_row_still_counts_as_existing() {
        let mut row = stored("Acme", None);
        row.has_bonus = true;
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![row]])
            .into_connection();
        let repository = SqlRegistrationRepository::new(db);

        let result = repository.exists_by_national_id(&national_id()).await;

        assert!(matches!(result, Ok(true)));
    }

    #[tokio::test]
    async fn test_lookup_error_is_database_error() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_errors([DbErr::Custom("connection lost".to_string())])
            .into_connection();
        let repository = SqlRegistrationRepository::new(db);

        let result = repository.exists_by_national_id(&national_id()).await;

        assert!(matches!(result, Err(RepositoryError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_insert_executes_one_statement() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repository = SqlRegistrationRepository::new(db);
        let registration =
            Registration::new("Maria", national_id(), Employer::Simetria, None, Utc::now())
                .unwrap();

        repository.insert(&registration).await.unwrap();

        assert_eq!(repository.db.into_transaction_log().len(), 1);
    }

    #[test]
    fn test_generic_insert_error_is_database_error() {
        let error = map_insert_error(DbErr::Custom("boom".to_string()));
        assert!(matches!(error, RepositoryError::DatabaseError(_)));
    }
}
