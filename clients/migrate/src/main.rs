use anyhow::Context;
use clap::Parser;
use database::{
    consts::consts::DEFAULT_MIGRATION_BATCH_SIZE,
    persistence::{migration::migrate, storage::StorageEngine},
};

/// 🚚 Copies every person from one store into another, e.g. from SQLite into PostgreSQL.
///
/// The destination is emptied before the copy starts.
#[derive(Parser, Debug)]
struct Cli {
    /// Store to read from
    #[clap(short, long, env = "SOURCE_DATABASE_URL", default_value = "sqlite://persons.db")]
    source: String,

    /// Store to write to, its `persons` table is created if missing and then cleared
    #[clap(short, long, env = "DESTINATION_DATABASE_URL")]
    destination: String,

    /// Rows committed per batch
    #[clap(short, long, default_value_t = DEFAULT_MIGRATION_BATCH_SIZE)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let source_engine = StorageEngine::from_url(&args.source)?;
    let destination_engine = StorageEngine::from_url(&args.destination)?;

    if source_engine.is_same_store(&destination_engine) {
        anyhow::bail!(
            "Source and destination point at the same store: {}",
            args.source
        );
    }

    // The source is only read, its table is expected to exist already
    let source = source_engine
        .connect()
        .await
        .context("Unable to open source store")?;

    let destination = destination_engine
        .connect()
        .await
        .context("Unable to open destination store")?;

    let report = migrate(source.as_ref(), destination.as_ref(), args.batch_size).await;

    source.close().await;
    destination.close().await;

    let report = report?;

    log::info!(
        "🎉 Migration completed [Source rows: {}, Destination rows: {}, Batches: {}]",
        report.source_rows,
        report.destination_rows,
        report.batches
    );

    Ok(())
}
