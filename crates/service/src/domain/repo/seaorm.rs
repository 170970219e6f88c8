use async_trait::async_trait;
use models::domain::{self, DomainPatch, Model, NewDomain};
use models::errors::ModelError;
use sea_orm::DatabaseConnection;

use crate::domain::repository::DomainRepository;
use crate::errors::ServiceError;

/// Unique index violations surface as conflicts so callers can answer them
/// like a failed name check.
fn write_err(e: ModelError) -> ServiceError {
    match e {
        ModelError::Conflict(msg) => ServiceError::Conflict(msg),
        other => ServiceError::Model(other),
    }
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmDomainRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl DomainRepository for SeaOrmDomainRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Model>, ServiceError> {
        Ok(domain::find_by_id(&self.db, id).await?)
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
        Ok(domain::name_taken(&self.db, name, exclude_id).await?)
    }

    async fn create(&self, input: NewDomain) -> Result<Model, ServiceError> {
        domain::create(&self.db, input).await.map_err(write_err)
    }

    async fn update_fields(&self, id: i32, patch: DomainPatch) -> Result<u64, ServiceError> {
        domain::update_fields(&self.db, id, patch).await.map_err(write_err)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(domain::count(&self.db).await?)
    }

    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<Model>, ServiceError> {
        Ok(domain::page(&self.db, offset, limit).await?)
    }
}
