use std::collections::HashMap;
use thiserror::Error;

use crate::{consts::consts::EntityId, model::person::Person};

use super::row::{PersonRow, UpdatePersonData};

#[derive(Error, Debug, PartialEq)]
pub enum ApplyErrors {
    // CRUD - GET
    #[error("Not found, record does not exist: {0}")]
    CannotGetDoesNotExist(EntityId),

    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    // CRUD - UPDATE
    #[error("Cannot Update, record does not exist: {0}")]
    CannotUpdateDoesNotExist(EntityId),

    // CRUD - DELETE
    #[error("Cannot delete, record does not exist: {0}")]
    CannotDeleteDoesNotExist(EntityId),

    // Constraints
    #[error("Cannot set field to null: {0}")]
    NotNullConstraintViolation(String),
}

type RowPrimaryKey = String;

/// Rows keyed by id, the in-process stand-in for the `persons` table
#[derive(Default)]
pub struct PersonTable {
    pub person_rows: HashMap<RowPrimaryKey, PersonRow>,
    next_sequence: u64,
}

impl PersonTable {
    pub fn new() -> Self {
        Self {
            person_rows: HashMap::<RowPrimaryKey, PersonRow>::new(),
            next_sequence: 0,
        }
    }

    pub fn apply_add(&mut self, person: Person) -> Result<(), ApplyErrors> {
        if self.person_rows.contains_key(person.id.as_str()) {
            return Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id));
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.person_rows
            .insert(person.id.to_string(), PersonRow::new(person, sequence));

        Ok(())
    }

    pub fn apply_update(
        &mut self,
        id: &EntityId,
        update: &UpdatePersonData,
    ) -> Result<Person, ApplyErrors> {
        let person_row = self
            .person_rows
            .get_mut(id.as_str())
            .ok_or(ApplyErrors::CannotUpdateDoesNotExist(id.clone()))?;

        person_row.apply_update(update)
    }

    /// Returns the removed person
    pub fn apply_delete(&mut self, id: &EntityId) -> Result<Person, ApplyErrors> {
        self.person_rows
            .remove(id.as_str())
            .map(PersonRow::into_person)
            .ok_or(ApplyErrors::CannotDeleteDoesNotExist(id.clone()))
    }

    pub fn get(&self, id: &EntityId) -> Result<Person, ApplyErrors> {
        self.person_rows
            .get(id.as_str())
            .map(|row| row.current_state().clone())
            .ok_or(ApplyErrors::CannotGetDoesNotExist(id.clone()))
    }

    /// All rows in insertion order
    pub fn list(&self) -> Vec<Person> {
        let mut rows: Vec<&PersonRow> = self.person_rows.values().collect();

        rows.sort_by_key(|row| row.sequence);

        rows.into_iter()
            .map(|row| row.current_state().clone())
            .collect()
    }

    /// Drops every row, returns how many were dropped
    pub fn reset(&mut self) -> usize {
        let dropped = self.person_rows.len();

        self.person_rows.clear();
        self.next_sequence = 0;

        dropped
    }
}
