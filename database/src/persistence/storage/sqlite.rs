use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};

use crate::{
    consts::consts::EntityId, database::table::row::UpdatePersonData, model::person::Person,
};

use super::{to_generic_error, Storage, StorageError, StorageResult};

pub const ENGINE_NAME: &str = "sqlite";

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Accepts `sqlite://path/to/file.db` or `sqlite::memory:`, the file is created if missing
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::UnableToConnect(to_generic_error(e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // A single connection serializes writers, which is what SQLite does anyway. It also keeps
        //  `sqlite::memory:` databases alive, every new connection would otherwise start empty
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::UnableToConnect(to_generic_error(e)))?;

        Ok(Self { pool })
    }
}

fn person_from_row(row: &SqliteRow) -> StorageResult<Person> {
    let read = |e: sqlx::Error| StorageError::UnableToReadRecord(to_generic_error(e));

    Ok(Person {
        id: EntityId(row.try_get("id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
        age: row.try_get("age").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
    })
}

fn write_error(person: &Person, error: sqlx::Error) -> StorageError {
    let unique_violation = error
        .as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false);

    if unique_violation {
        return StorageError::DuplicateRecord(person.id.clone());
    }

    StorageError::UnableToWriteRecord(to_generic_error(error))
}

const INSERT_PERSON: &str = r#"
    INSERT INTO persons (id, name, age, email)
    VALUES (?, ?, ?, ?)
"#;

#[async_trait]
impl Storage for SqliteStorage {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    async fn init(&self) -> StorageResult<()> {
        let persons_table = r#"
            CREATE TABLE IF NOT EXISTS persons (
                id    TEXT    NOT NULL PRIMARY KEY,
                name  TEXT    NOT NULL,
                age   INTEGER NOT NULL,
                email TEXT    NOT NULL
            )
        "#;

        sqlx::query(persons_table)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToInitializePersistence(to_generic_error(e)))?;

        Ok(())
    }

    async fn reset_database(&self) -> StorageResult<()> {
        sqlx::query("DELETE FROM persons")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToWriteRecord(to_generic_error(e)))?;

        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToReadRecord(to_generic_error(e)))?;

        Ok(())
    }

    async fn insert(&self, person: &Person) -> StorageResult<()> {
        sqlx::query(INSERT_PERSON)
            .bind(person.id.as_str())
            .bind(&person.name)
            .bind(person.age)
            .bind(&person.email)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(person, e))?;

        Ok(())
    }

    async fn insert_batch(&self, people: &[Person]) -> StorageResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::UnableToWriteRecord(to_generic_error(e)))?;

        for person in people {
            sqlx::query(INSERT_PERSON)
                .bind(person.id.as_str())
                .bind(&person.name)
                .bind(person.age)
                .bind(&person.email)
                .execute(&mut *transaction)
                .await
                .map_err(|e| write_error(person, e))?;
        }

        // Dropping the transaction on an early return rolls it back
        transaction
            .commit()
            .await
            .map_err(|e| StorageError::UnableToWriteRecord(to_generic_error(e)))
    }

    async fn get(&self, id: &EntityId) -> StorageResult<Option<Person>> {
        let row = sqlx::query("SELECT id, name, age, email FROM persons WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToReadRecord(to_generic_error(e)))?;

        row.as_ref().map(person_from_row).transpose()
    }

    async fn list(&self) -> StorageResult<Vec<Person>> {
        let rows = sqlx::query("SELECT id, name, age, email FROM persons ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToReadRecord(to_generic_error(e)))?;

        rows.iter().map(person_from_row).collect()
    }

    async fn update(
        &self,
        id: &EntityId,
        update: &UpdatePersonData,
    ) -> StorageResult<Option<Person>> {
        update
            .check_not_null()
            .map_err(|e| StorageError::ConstraintViolation(e.to_string()))?;

        // NULL parameters keep the stored value
        let update_person = r#"
            UPDATE persons
            SET name  = COALESCE(?, name),
                age   = COALESCE(?, age),
                email = COALESCE(?, email)
            WHERE id = ?
            RETURNING id, name, age, email
        "#;

        let row = sqlx::query(update_person)
            .bind(update.name.as_set().map(String::as_str))
            .bind(update.age.as_set().copied())
            .bind(update.email.as_set().map(String::as_str))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToWriteRecord(to_generic_error(e)))?;

        row.as_ref().map(person_from_row).transpose()
    }

    async fn delete(&self, id: &EntityId) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM persons WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToWriteRecord(to_generic_error(e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StorageResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM persons")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::UnableToReadRecord(to_generic_error(e)))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| StorageError::UnableToReadRecord(to_generic_error(e)))?;

        Ok(count as usize)
    }

    async fn close(&self) {
        self.pool.close().await
    }
}

#[cfg(test)]
mod tests {
    use crate::database::table::row::UpdateStatement;

    use super::*;

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::connect("sqlite::memory:").await.unwrap();
        storage.init().await.unwrap();
        storage
    }

    fn person(name: &str) -> Person {
        Person::new(name.to_string(), 25, format!("{}@example.com", name))
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let storage = storage().await;

        storage.init().await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_then_get() {
        let storage = storage().await;
        let jane = person("jane");

        storage.insert(&jane).await.unwrap();

        assert_eq!(storage.get(&jane.id).await.unwrap(), Some(jane));
    }

    #[tokio::test]
    async fn insert_duplicate_id() {
        let storage = storage().await;
        let jane = person("jane");

        storage.insert(&jane).await.unwrap();

        assert!(matches!(
            storage.insert(&jane).await,
            Err(StorageError::DuplicateRecord(id)) if id == jane.id
        ));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let storage = storage().await;
        let people: Vec<Person> = ["c", "a", "b"].into_iter().map(person).collect();

        storage.insert_batch(&people).await.unwrap();

        assert_eq!(storage.list().await.unwrap(), people);
    }

    #[tokio::test]
    async fn insert_batch_rolls_back() {
        let storage = storage().await;
        let jane = person("jane");
        storage.insert(&jane).await.unwrap();

        let result = storage.insert_batch(&[person("john"), jane]).await;

        assert!(matches!(result, Err(StorageError::DuplicateRecord(_))));
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_only_supplied_fields() {
        let storage = storage().await;
        let jane = person("jane");
        storage.insert(&jane).await.unwrap();

        let update = UpdatePersonData {
            age: UpdateStatement::Set(31),
            ..Default::default()
        };

        let updated = storage.update(&jane.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.age, 31);
        assert_eq!(updated.name, jane.name);
        assert_eq!(updated.email, jane.email);
    }

    #[tokio::test]
    async fn update_missing_row() {
        let storage = storage().await;

        let update = UpdatePersonData {
            age: UpdateStatement::Set(31),
            ..Default::default()
        };

        assert_eq!(
            storage.update(&EntityId::new(), &update).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn delete_then_reset() {
        let storage = storage().await;
        let jane = person("jane");
        storage.insert(&jane).await.unwrap();
        storage.insert(&person("john")).await.unwrap();

        assert!(storage.delete(&jane.id).await.unwrap());
        assert!(!storage.delete(&jane.id).await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 1);

        storage.reset_database().await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ping_fails_after_close() {
        let storage = storage().await;

        storage.ping().await.unwrap();
        storage.close().await;

        assert!(storage.ping().await.is_err());
    }
}
