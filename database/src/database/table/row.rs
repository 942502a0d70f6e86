use serde::{Deserialize, Deserializer};

use crate::model::person::Person;

use super::table::ApplyErrors;

/// A single field change within an update.
///
/// When deserialized (with `#[serde(default)]` on the containing field) an omitted field becomes
/// `NoChanges`, an explicit `null` becomes `Unset` and any other value becomes `Set`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UpdateStatement<T> {
    Set(T),
    Unset,
    #[default]
    NoChanges,
}

impl<T> UpdateStatement<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            UpdateStatement::Set(value) => Some(value),
            UpdateStatement::Unset | UpdateStatement::NoChanges => None,
        }
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, UpdateStatement::NoChanges)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for UpdateStatement<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the field is present, omitted fields use `Default`
        match Option::<T>::deserialize(deserializer)? {
            Some(value) => Ok(UpdateStatement::Set(value)),
            None => Ok(UpdateStatement::Unset),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdatePersonData {
    pub name: UpdateStatement<String>,
    pub age: UpdateStatement<i32>,
    pub email: UpdateStatement<String>,
}

impl UpdatePersonData {
    /// True when no field was supplied, applying it must not change the record
    pub fn is_empty(&self) -> bool {
        self.name.is_no_changes() && self.age.is_no_changes() && self.email.is_no_changes()
    }

    /// Every person column is NOT NULL, an `Unset` can never be applied
    pub fn check_not_null(&self) -> Result<(), ApplyErrors> {
        let unset_field = [
            ("name", matches!(self.name, UpdateStatement::Unset)),
            ("age", matches!(self.age, UpdateStatement::Unset)),
            ("email", matches!(self.email, UpdateStatement::Unset)),
        ]
        .into_iter()
        .find(|(_, unset)| *unset);

        match unset_field {
            Some((field, _)) => Err(ApplyErrors::NotNullConstraintViolation(field.to_string())),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, person: &Person) -> Result<Person, ApplyErrors> {
        self.check_not_null()?;

        let mut updated = person.clone();

        if let Some(name) = self.name.as_set() {
            updated.name = name.clone();
        }

        if let Some(age) = self.age.as_set() {
            updated.age = *age;
        }

        if let Some(email) = self.email.as_set() {
            updated.email = email.clone();
        }

        Ok(updated)
    }
}

#[derive(Clone, Debug)]
pub struct PersonRow {
    /// Position in which the row was inserted, used to keep list output stable
    pub sequence: u64,
    person: Person,
}

impl PersonRow {
    pub fn new(person: Person, sequence: u64) -> Self {
        PersonRow { sequence, person }
    }

    /// Replaces the stored person, returns the new state
    pub fn apply_update(&mut self, update: &UpdatePersonData) -> Result<Person, ApplyErrors> {
        let current = update.apply_to(&self.person)?;

        self.person = current.clone();

        Ok(current)
    }

    pub fn current_state(&self) -> &Person {
        &self.person
    }

    pub fn into_person(self) -> Person {
        self.person
    }
}
