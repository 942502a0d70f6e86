use std::io;

use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web, App, HttpServer,
};
use clap::Parser;
use database::database::{database::Database, options::DatabaseOptions};

mod errors;
mod routes;
mod schema;
mod tracers;

/// 👤 Person API, a JSON HTTP interface to create, read, update and delete people
#[derive(Parser, Debug)]
struct Cli {
    /// Port the http server will run on
    #[clap(short, long, default_value = "8000")]
    port: u16,

    /// Address the http server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Backing store, one of `memory`, `sqlite://<path>` or `postgres://<user>:<password>@<host>/<db>`
    #[clap(short, long, env = "DATABASE_URL", default_value = "sqlite://persons.db")]
    database_url: String,

    /// Logs every http request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracers::init_tracing_subscriber();

    let args = Cli::parse();

    let database_options = DatabaseOptions::default()
        .set_database_url(&args.database_url)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let database = Database::connect(database_options)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    log::info!(
        "starting HTTP server on {}:{} [Engine: {}]",
        args.address,
        args.port,
        database.engine_name()
    );

    let app_database = web::Data::new(database.clone());

    HttpServer::new(move || {
        App::new()
            .app_data(app_database.clone())
            .configure(routes::configure)
            .wrap(Cors::permissive())
            .wrap(Condition::new(args.log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await?;

    database.close().await;

    Ok(())
}
