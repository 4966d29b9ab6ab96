//! Projection of canonical rows into the per-patient history aggregate.

use std::sync::Arc;

use crate::db::HistoryStore;
use crate::error::StoreError;
use crate::migration::CanonicalRow;
use crate::models::AppointmentSummary;

/// The summary tuple that set-add dedup operates over.
pub fn summary_for(row: &CanonicalRow) -> AppointmentSummary {
    AppointmentSummary {
        appointment_id: row.appointment_id.clone(),
        date: row.appointment_date.clone(),
        doctor_name: row.doctor_name.clone(),
        specialty: row.specialty.clone(),
        treatment_description: row.treatment_description.clone(),
        amount_paid: row.amount_paid,
    }
}

pub struct HistoryAggregator<H> {
    store: Arc<H>,
}

impl<H: HistoryStore> HistoryAggregator<H> {
    pub fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    pub async fn upsert(&self, row: &CanonicalRow) -> Result<(), StoreError> {
        let entry = summary_for(row);
        self.store
            .upsert_history(
                row.patient_email.as_deref(),
                row.patient_name.as_deref(),
                &entry,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_carries_the_dedup_tuple() {
        let row = CanonicalRow {
            appointment_id: Some("A1".into()),
            appointment_date: Some("2021-01-01".into()),
            doctor_name: Some("Dr X".into()),
            specialty: Some("Cardio".into()),
            treatment_description: Some("Checkup".into()),
            amount_paid: Some(80.0),
            ..Default::default()
        };
        let summary = summary_for(&row);
        assert_eq!(summary.appointment_id.as_deref(), Some("A1"));
        assert_eq!(summary.date.as_deref(), Some("2021-01-01"));
        assert_eq!(summary.amount_paid, Some(80.0));

        // A tuple differing in a single field is a distinct entry.
        let mut other = summary.clone();
        other.amount_paid = Some(95.0);
        assert_ne!(summary, other);
    }
}
