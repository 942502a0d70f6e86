use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Installs the global subscriber. Defaults to `info`, `RUST_LOG` overrides it.
///
/// `log` records (from the database crate and actix's access logger) are forwarded into the same
/// subscriber.
pub fn init_tracing_subscriber() {
    let default_level = LevelFilter::from_level(Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
