//! Request handlers.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::ApiError;
use crate::migration::MigrationRunner;
use crate::sheet;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("SaludPlus API running")
}

/// Accept a spreadsheet upload and run it through the migration pipeline.
pub async fn migrate(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let path = save_upload(payload, &state.uploads_dir).await?;
    info!(path = %path.display(), "spreadsheet received");

    // calamine is synchronous; keep the decode off the executor threads.
    let rows = web::block(move || sheet::read_workbook(&path)).await??;

    let runner = MigrationRunner::new(state.clinic.clone(), state.history.clone());
    match runner.migrate(rows).await {
        Ok(report) => {
            state
                .metrics
                .rows_migrated
                .with_label_values(&["succeeded"])
                .inc_by(report.rows_submitted as u64);
            Ok(HttpResponse::Ok().json(report))
        }
        Err(err) => {
            state
                .metrics
                .rows_migrated
                .with_label_values(&["failed"])
                .inc();
            Err(err.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DoctorQuery {
    pub specialty: Option<String>,
}

pub async fn list_doctors(
    state: web::Data<AppState>,
    query: web::Query<DoctorQuery>,
) -> Result<HttpResponse, ApiError> {
    let doctors = state
        .clinic
        .doctors_by_specialty(query.specialty.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(doctors))
}

pub async fn revenue_report(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let report = state.clinic.revenue_report().await?;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn patient_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    match state.history.find_by_email(&email).await? {
        Some(history) => Ok(HttpResponse::Ok().json(history)),
        None => Err(ApiError::NotFound(format!(
            "no history found for patient {email}"
        ))),
    }
}

pub async fn metrics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let body = state.metrics.encode()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

/// Persist the first file part under the uploads directory with a
/// UUID-prefixed name, mirroring how the upstream system staged uploads.
async fn save_upload(mut payload: Multipart, dir: &Path) -> Result<PathBuf, ApiError> {
    while let Some(mut field) = payload.try_next().await? {
        let filename = field
            .content_disposition()
            .get_filename()
            .map(sanitize_filename)
            .unwrap_or_else(|| "upload.xlsx".to_string());
        let path = dir.join(format!("{}-{}", Uuid::new_v4(), filename));

        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = field.try_next().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        return Ok(path);
    }
    Err(ApiError::MissingFile)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("citas 2021.xlsx"), "citas_2021.xlsx");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }
}
