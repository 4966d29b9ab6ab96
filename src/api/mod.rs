//! HTTP surface of the SaludPlus service.

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::{MongoHistoryStore, MySqlClinicStore};
use crate::metrics::Metrics;

pub mod handlers;
pub mod routes;

pub use routes::configure;

/// Shared application state; store handles are injected here rather than
/// held as globals so handlers and the pipeline stay testable.
pub struct AppState {
    pub clinic: Arc<MySqlClinicStore>,
    pub history: Arc<MongoHistoryStore>,
    pub metrics: Metrics,
    pub uploads_dir: PathBuf,
}
