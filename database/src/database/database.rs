use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::person::Person,
    persistence::storage::{memory::MemoryStorage, Storage, StorageError},
};

use super::{
    options::DatabaseOptions,
    table::{row::UpdatePersonData, table::ApplyErrors},
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Not found, record does not exist: {0}")]
    NotFound(EntityId),

    #[error("Cannot set field to null: {0}")]
    NotNullConstraintViolation(String),

    #[error("Cannot create, record already exists: {0}")]
    AlreadyExists(EntityId),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(StorageError),
}

impl From<StorageError> for DatabaseError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::DuplicateRecord(id) => DatabaseError::AlreadyExists(id),
            other => DatabaseError::StorageUnavailable(other),
        }
    }
}

impl From<ApplyErrors> for DatabaseError {
    fn from(error: ApplyErrors) -> Self {
        match error {
            ApplyErrors::CannotGetDoesNotExist(id)
            | ApplyErrors::CannotUpdateDoesNotExist(id)
            | ApplyErrors::CannotDeleteDoesNotExist(id) => DatabaseError::NotFound(id),
            ApplyErrors::NotNullConstraintViolation(field) => {
                DatabaseError::NotNullConstraintViolation(field)
            }
            ApplyErrors::CannotCreateWhenAlreadyExists(id) => DatabaseError::AlreadyExists(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub engine: &'static str,
    pub checked_at: DateTime<Utc>,
}

/// Entry point for every person operation.
///
/// Each operation maps to one storage call, concurrent requests for the same id rely on the
/// backing store's single statement atomicity. Storage failures are returned as they are, never
/// retried.
#[derive(Clone)]
pub struct Database {
    storage: Arc<dyn Storage>,
}

impl Database {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn connect(options: DatabaseOptions) -> Result<Self, DatabaseError> {
        let storage = options.storage_engine.connect().await?;

        if options.init_schema {
            storage.init().await?;
        }

        log::info!(
            "Connected to storage [Engine: {}, Rows: {}]",
            storage.engine_name(),
            storage.count().await?
        );

        Ok(Self::new(storage))
    }

    /// Database backed by an empty in-memory table
    pub fn new_test() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn engine_name(&self) -> &'static str {
        self.storage.engine_name()
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        name: String,
        age: i32,
        email: String,
    ) -> Result<Person, DatabaseError> {
        let person = Person::new(name, age, email);

        self.storage.insert(&person).await?;

        log::info!("Created person [id: {}]", person.id);

        Ok(person)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &EntityId) -> Result<Person, DatabaseError> {
        self.storage
            .get(id)
            .await?
            .ok_or(DatabaseError::NotFound(id.clone()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Person>, DatabaseError> {
        Ok(self.storage.list().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: &EntityId,
        update: UpdatePersonData,
    ) -> Result<Person, DatabaseError> {
        update.check_not_null()?;

        // Nothing to apply, skip the write but still report a missing row
        if update.is_empty() {
            return self.get(id).await;
        }

        let person = self
            .storage
            .update(id, &update)
            .await?
            .ok_or(DatabaseError::NotFound(id.clone()))?;

        log::info!("Updated person [id: {}]", id);

        Ok(person)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &EntityId) -> Result<(), DatabaseError> {
        if !self.storage.delete(id).await? {
            return Err(DatabaseError::NotFound(id.clone()));
        }

        log::info!("Deleted person [id: {}]", id);

        Ok(())
    }

    /// Releases the storage connections once no more requests will be served
    pub async fn close(&self) {
        self.storage.close().await;

        log::info!("Closed storage [Engine: {}]", self.storage.engine_name());
    }

    /// Performs a trivial read against the storage
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthReport, DatabaseError> {
        self.storage.ping().await.map_err(|e| {
            log::error!("Health check failed: {}", e);
            e
        })?;

        Ok(HealthReport {
            engine: self.storage.engine_name(),
            checked_at: Utc::now(),
        })
    }
}
