use crate::persistence::storage::{StorageEngine, StorageResult};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub storage_engine: StorageEngine,
    pub init_schema: bool,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    /// Parses a connection string such as `sqlite://persons.db` or `postgres://host/db`
    pub fn set_database_url(self, url: &str) -> StorageResult<Self> {
        Ok(self.set_storage_engine(StorageEngine::from_url(url)?))
    }

    /// Defines whether the `persons` table should be created (if missing) on start-up
    pub fn set_init_schema(mut self, init_schema: bool) -> Self {
        self.init_schema = init_schema;
        self
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            storage_engine: StorageEngine::Memory,
            init_schema: true,
        }
    }
}
