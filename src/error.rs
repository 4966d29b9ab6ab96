//! Error types for the migration pipeline and the HTTP surface.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Spreadsheet decoding failures, surfaced before any row is processed.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no worksheets")]
    NoWorksheet,
}

/// Failures from either persistent store.
///
/// Missing required fields (e.g. a row with no doctor email) are not
/// validated up front; they surface here as constraint violations from the
/// store, which is the contract the migration relies on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("relational store: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("document store: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("document encoding: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Outcome of a failed migration batch.
///
/// `Row` carries the 1-based index of the first failing row and how many
/// rows were fully committed before it. Rows committed before the failure
/// stay committed; callers must treat a failed migration as possibly
/// partially applied.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Decode(#[from] SheetError),
    #[error("row {row} failed ({rows_committed} rows committed before it): {source}")]
    Row {
        row: usize,
        rows_committed: usize,
        source: StoreError,
    },
}

/// HTTP-facing error; every variant renders as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file was uploaded")]
    MissingFile,
    #[error("upload failed: {0}")]
    Upload(#[from] actix_multipart::MultipartError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] SheetError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("{0}")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
