use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::{
    consts::consts::EntityId,
    database::table::{
        row::UpdatePersonData,
        table::{ApplyErrors, PersonTable},
    },
    model::person::Person,
};

use super::{Storage, StorageError, StorageResult};

pub const ENGINE_NAME: &str = "memory";

/// Keeps the table in process, nothing survives a restart
#[derive(Default)]
pub struct MemoryStorage {
    table: RwLock<PersonTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(PersonTable::new()),
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, PersonTable>> {
        self.table.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, PersonTable>> {
        self.table.write().map_err(|_| StorageError::LockPoisoned)
    }
}

impl From<ApplyErrors> for StorageError {
    fn from(error: ApplyErrors) -> Self {
        match error {
            ApplyErrors::CannotCreateWhenAlreadyExists(id) => StorageError::DuplicateRecord(id),
            ApplyErrors::NotNullConstraintViolation(field) => {
                StorageError::ConstraintViolation(format!("{} cannot be null", field))
            }
            other => StorageError::UnableToWriteRecord(other.to_string()),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    async fn init(&self) -> StorageResult<()> {
        // Table exists as soon as the storage does
        Ok(())
    }

    async fn reset_database(&self) -> StorageResult<()> {
        let dropped = self.write()?.reset();

        log::info!("Reset in-memory table, dropped {} rows", dropped);

        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        self.read().map(|_| ())
    }

    async fn insert(&self, person: &Person) -> StorageResult<()> {
        self.write()?.apply_add(person.clone())?;

        Ok(())
    }

    async fn insert_batch(&self, people: &[Person]) -> StorageResult<()> {
        let mut table = self.write()?;

        // Check the whole batch before applying so a failure leaves the table untouched
        for (index, person) in people.iter().enumerate() {
            let duplicate_in_batch = people[..index].iter().any(|p| p.id == person.id);

            if duplicate_in_batch || table.get(&person.id).is_ok() {
                return Err(StorageError::DuplicateRecord(person.id.clone()));
            }
        }

        for person in people {
            table.apply_add(person.clone())?;
        }

        Ok(())
    }

    async fn get(&self, id: &EntityId) -> StorageResult<Option<Person>> {
        Ok(self.read()?.get(id).ok())
    }

    async fn list(&self) -> StorageResult<Vec<Person>> {
        Ok(self.read()?.list())
    }

    async fn update(
        &self,
        id: &EntityId,
        update: &UpdatePersonData,
    ) -> StorageResult<Option<Person>> {
        match self.write()?.apply_update(id, update) {
            Ok(person) => Ok(Some(person)),
            Err(ApplyErrors::CannotUpdateDoesNotExist(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &EntityId) -> StorageResult<bool> {
        match self.write()?.apply_delete(id) {
            Ok(_) => Ok(true),
            Err(ApplyErrors::CannotDeleteDoesNotExist(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.read()?.person_rows.len())
    }
}
