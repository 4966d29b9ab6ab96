//! Store abstractions and their MySQL / MongoDB implementations.
//!
//! The migration pipeline talks to both stores through these traits only;
//! handles are injected into the pipeline's constructors, which keeps the
//! row-processing logic runnable against in-memory doubles in tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AppointmentRecord, AppointmentSummary};

pub mod mongo;
pub mod mysql;

pub use mongo::MongoHistoryStore;
pub use mysql::MySqlClinicStore;

/// Relational store operations used by the upsert resolver.
///
/// Every `find_*` / `insert_*` pair is a two-step lookup-then-create; the
/// UNIQUE constraints on the natural keys are the backstop if two
/// migrations race each other. `find` calls taking an `Option` return
/// `None` for a missing field (SQL `=` never matches NULL), and inserts
/// with missing required fields fail with a constraint violation rather
/// than being rejected up front.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn find_insurance_id(&self, name: &str) -> Result<Option<i64>, StoreError>;
    async fn insert_insurance(
        &self,
        name: &str,
        coverage_percentage: Option<f64>,
    ) -> Result<i64, StoreError>;

    async fn find_doctor_id(&self, email: Option<&str>) -> Result<Option<i64>, StoreError>;
    async fn insert_doctor(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<i64, StoreError>;

    async fn find_patient_id(&self, email: Option<&str>) -> Result<Option<i64>, StoreError>;
    async fn insert_patient(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<i64, StoreError>;

    async fn find_appointment_id(
        &self,
        external_id: Option<&str>,
    ) -> Result<Option<i64>, StoreError>;
    async fn insert_appointment(
        &self,
        record: &AppointmentRecord<'_>,
    ) -> Result<i64, StoreError>;
}

/// Document store operations used by the history aggregator.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Atomic find-and-upsert keyed by patient email: creates the aggregate
    /// with `patient_name` on insert only, and adds `entry` to the
    /// appointment collection only if no deeply-equal entry exists.
    async fn upsert_history(
        &self,
        patient_email: Option<&str>,
        patient_name: Option<&str>,
        entry: &AppointmentSummary,
    ) -> Result<(), StoreError>;
}
