//! Relational upsert resolution: find-or-create across the four entities,
//! in dependency order, inside one logical row-processing step.

use std::sync::Arc;

use tracing::debug;

use crate::db::ClinicStore;
use crate::error::StoreError;
use crate::migration::CanonicalRow;
use crate::models::AppointmentRecord;
use crate::NO_INSURANCE_SENTINEL;

pub struct AppointmentResolver<S> {
    store: Arc<S>,
}

impl<S: ClinicStore> AppointmentResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve-or-create insurance, doctor and patient, then insert the
    /// appointment unless its external id already exists. Idempotent at
    /// each natural key; steps already committed stay committed if a later
    /// step fails.
    pub async fn resolve_and_insert(&self, row: &CanonicalRow) -> Result<(), StoreError> {
        let insurance_id = self.resolve_insurance(row).await?;
        let doctor_id = self.resolve_doctor(row).await?;
        let patient_id = self.resolve_patient(row).await?;

        if self
            .store
            .find_appointment_id(row.appointment_id.as_deref())
            .await?
            .is_some()
        {
            // Duplicate external id: the rest of the row's relational data
            // is discarded.
            debug!(appointment_id = ?row.appointment_id, "appointment already present, skipping");
            return Ok(());
        }

        self.store
            .insert_appointment(&AppointmentRecord {
                external_id: row.appointment_id.as_deref(),
                date: row.appointment_date.as_deref(),
                patient_id,
                doctor_id,
                insurance_id,
                treatment_code: row.treatment_code.as_deref(),
                treatment_description: row.treatment_description.as_deref(),
                treatment_cost: row.treatment_cost,
                amount_paid: row.amount_paid,
            })
            .await?;
        Ok(())
    }

    /// Uninsured rows (empty provider or the sentinel) resolve to no link
    /// at all; no insurance record is created for them.
    async fn resolve_insurance(&self, row: &CanonicalRow) -> Result<Option<i64>, StoreError> {
        let provider = match row.insurance_provider.as_deref() {
            Some(p) if !p.is_empty() && p != NO_INSURANCE_SENTINEL => p,
            _ => return Ok(None),
        };

        if let Some(id) = self.store.find_insurance_id(provider).await? {
            return Ok(Some(id));
        }
        let id = self
            .store
            .insert_insurance(provider, row.coverage_percentage)
            .await?;
        Ok(Some(id))
    }

    async fn resolve_doctor(&self, row: &CanonicalRow) -> Result<i64, StoreError> {
        if let Some(id) = self.store.find_doctor_id(row.doctor_email.as_deref()).await? {
            return Ok(id);
        }
        self.store
            .insert_doctor(
                row.doctor_name.as_deref(),
                row.doctor_email.as_deref(),
                row.specialty.as_deref(),
            )
            .await
    }

    async fn resolve_patient(&self, row: &CanonicalRow) -> Result<i64, StoreError> {
        if let Some(id) = self.store.find_patient_id(row.patient_email.as_deref()).await? {
            return Ok(id);
        }
        self.store
            .insert_patient(
                row.patient_name.as_deref(),
                row.patient_email.as_deref(),
                row.patient_phone.as_deref(),
                row.patient_address.as_deref(),
            )
            .await
    }
}
