//! Data models for the relational entities, the patient history aggregate
//! and the reporting responses.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Insurance provider, keyed naturally by name. Created on first encounter,
/// never updated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Insurance {
    pub id_insurance: i64,
    pub name: String,
    pub coverage_percentage: Option<f64>,
}

/// Doctor, keyed naturally by email. Create-once, reuse-on-match: later rows
/// with the same email reuse the record even if name or specialty differ.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Doctor {
    pub id_doctor: i64,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
}

/// Patient, keyed naturally by email. Same create-once policy as [`Doctor`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id_patient: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Fields of a new appointment row, with the three foreign keys already
/// resolved. The insurance reference is null for uninsured rows.
#[derive(Debug, Clone)]
pub struct AppointmentRecord<'a> {
    pub external_id: Option<&'a str>,
    pub date: Option<&'a str>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub insurance_id: Option<i64>,
    pub treatment_code: Option<&'a str>,
    pub treatment_description: Option<&'a str>,
    pub treatment_cost: Option<f64>,
    pub amount_paid: Option<f64>,
}

/// One entry of a patient's appointment history. Field names follow the
/// document store's camelCase wire format. Dedup in the aggregate is by
/// full-tuple equality: a re-scraped row differing in any field (even just
/// `amountPaid`) lands as a second entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub appointment_id: Option<String>,
    pub date: Option<String>,
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
    pub treatment_description: Option<String>,
    pub amount_paid: Option<f64>,
}

/// Per-patient aggregate document, keyed uniquely by `patientEmail`.
/// `patientName` is set only at creation; `appointments` is append-only
/// with set-add semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientHistory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub patient_email: Option<String>,
    pub patient_name: Option<String>,
    #[serde(default)]
    pub appointments: Vec<AppointmentSummary>,
}

/// Revenue aggregated over one insurer; the uninsured bucket reports under
/// the "SinSeguro" label.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InsuranceRevenue {
    pub insurance: String,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub total: Option<f64>,
    pub by_insurance: Vec<InsuranceRevenue>,
}
