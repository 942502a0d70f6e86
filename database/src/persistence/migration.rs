use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use super::storage::{Storage, StorageError};

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Batch size must be greater than 0")]
    InvalidBatchSize,

    #[error("Storage error during migration: {0}")]
    Storage(#[from] StorageError),

    #[error("Source and destination are the same store")]
    SameStore,

    #[error("Row count mismatch after migration, expected {expected} found {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub source_rows: usize,
    pub migrated_rows: usize,
    pub destination_rows: usize,
    pub batches: usize,
}

/// Copies every person from `source` into `destination`.
///
/// The source is read in full before the destination is touched. The destination is then reset,
/// rows are committed `batch_size` at a time and finally the destination row count is checked
/// against what was read from the source. The source schema is never created here, a missing
/// source table is an error.
pub async fn migrate(
    source: &dyn Storage,
    destination: &dyn Storage,
    batch_size: usize,
) -> Result<MigrationReport, MigrationError> {
    if batch_size == 0 {
        return Err(MigrationError::InvalidBatchSize);
    }

    if std::ptr::eq(
        source as *const _ as *const (),
        destination as *const _ as *const (),
    ) {
        return Err(MigrationError::SameStore);
    }

    let people = source.list().await?;

    log::info!(
        "Found {} records in source [Engine: {}]",
        people.len().to_formatted_string(&Locale::en),
        source.engine_name()
    );

    log::info!(
        "Preparing destination [Engine: {}]",
        destination.engine_name()
    );

    destination.init().await?;
    destination.reset_database().await?;

    let mut migrated_rows = 0;
    let mut batches = 0;

    for batch in people.chunks(batch_size) {
        destination.insert_batch(batch).await?;

        migrated_rows += batch.len();
        batches += 1;

        log::info!(
            "Migrated {} records...",
            migrated_rows.to_formatted_string(&Locale::en)
        );
    }

    let destination_rows = destination.count().await?;

    if destination_rows != people.len() {
        return Err(MigrationError::CountMismatch {
            expected: people.len(),
            actual: destination_rows,
        });
    }

    log::info!(
        "✅ Successfully migrated {} records in {} batches",
        migrated_rows.to_formatted_string(&Locale::en),
        batches
    );

    Ok(MigrationReport {
        source_rows: people.len(),
        migrated_rows,
        destination_rows,
        batches,
    })
}
