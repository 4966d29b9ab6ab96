//! SaludPlus migration service
//!
//! Main entry point: configuration, store bootstrap, HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use saludplus::api::{self, AppState};
use saludplus::config::Settings;
use saludplus::db::{MongoHistoryStore, MySqlClinicStore};
use saludplus::metrics::Metrics;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("failed to load configuration")?;

    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(&settings.mysql.url)
        .await
        .context("failed to connect to the relational store")?;
    let clinic = Arc::new(MySqlClinicStore::new(pool));
    clinic
        .ensure_schema()
        .await
        .context("failed to initialize the relational schema")?;

    let history = Arc::new(
        MongoHistoryStore::connect(&settings.mongo)
            .await
            .context("failed to connect to the document store")?,
    );

    tokio::fs::create_dir_all(&settings.uploads.dir)
        .await
        .context("failed to create the uploads directory")?;

    let metrics = Metrics::new().context("failed to register metrics")?;
    let state = web::Data::new(AppState {
        clinic,
        history,
        metrics,
        uploads_dir: PathBuf::from(&settings.uploads.dir),
    });

    info!(
        "SaludPlus API listening on {}:{}",
        settings.server.host, settings.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(api::configure)
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await?;

    Ok(())
}
