//! The migration pipeline: Normalizer → Relational Upsert Resolver →
//! Document Aggregator, driven row by row by [`MigrationRunner`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::db::{ClinicStore, HistoryStore};
use crate::error::{MigrationError, StoreError};
use crate::sheet::SheetRow;

pub mod history;
pub mod normalize;
pub mod resolver;

pub use normalize::{normalize, CanonicalRow};

use history::HistoryAggregator;
use resolver::AppointmentResolver;

/// Success acknowledgment for a completed batch.
#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub rows_submitted: usize,
}

/// Drives a full spreadsheet through the pipeline.
///
/// Rows are processed strictly sequentially: both stores must finish (or
/// fail) for row N before row N+1 starts. That ordering is what keeps two
/// rows for the same new doctor from racing each other through the
/// lookup-then-insert pairs. The first error aborts the batch; rows already
/// committed stay committed.
pub struct MigrationRunner<S, H> {
    resolver: AppointmentResolver<S>,
    aggregator: HistoryAggregator<H>,
}

impl<S: ClinicStore, H: HistoryStore> MigrationRunner<S, H> {
    pub fn new(clinic: Arc<S>, history: Arc<H>) -> Self {
        Self {
            resolver: AppointmentResolver::new(clinic),
            aggregator: HistoryAggregator::new(history),
        }
    }

    pub async fn migrate(&self, rows: Vec<SheetRow>) -> Result<MigrationReport, MigrationError> {
        info!("starting migration of {} rows", rows.len());

        for (index, raw) in rows.iter().enumerate() {
            let row = normalize(raw);
            if let Err(source) = self.process_row(&row).await {
                error!(row = index + 1, %source, "migration aborted");
                return Err(MigrationError::Row {
                    row: index + 1,
                    rows_committed: index,
                    source,
                });
            }
        }

        info!("migration completed, {} rows submitted", rows.len());
        Ok(MigrationReport {
            rows_submitted: rows.len(),
        })
    }

    async fn process_row(&self, row: &CanonicalRow) -> Result<(), StoreError> {
        self.resolver.resolve_and_insert(row).await?;
        self.aggregator.upsert(row).await
    }
}
