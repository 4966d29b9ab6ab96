//! MySQL implementation of the relational store, plus the reporting queries
//! consumed by the read endpoints.

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::{info, instrument};

use crate::db::ClinicStore;
use crate::error::StoreError;
use crate::models::{AppointmentRecord, Doctor, InsuranceRevenue, RevenueReport};
use crate::NO_INSURANCE_SENTINEL;

pub struct MySqlClinicStore {
    pool: MySqlPool,
}

impl MySqlClinicStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the four tables if they do not exist. The UNIQUE constraints
    /// on the natural keys (insurance name, doctor/patient email, external
    /// appointment id) enforce the resolver's no-duplicates invariant.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS insurances (
                id_insurance BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE,
                coverage_percentage DOUBLE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doctors (
                id_doctor BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                specialty VARCHAR(120)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS patients (
                id_patient BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                phone VARCHAR(64),
                address VARCHAR(255)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointments (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                appointment_id VARCHAR(64) NOT NULL UNIQUE,
                appointment_date DATE,
                id_patient BIGINT NOT NULL,
                id_doctor BIGINT NOT NULL,
                id_insurance BIGINT,
                treatment_code VARCHAR(64),
                treatment_description VARCHAR(255),
                treatment_cost DOUBLE,
                amount_paid DOUBLE,
                FOREIGN KEY (id_patient) REFERENCES patients(id_patient),
                FOREIGN KEY (id_doctor) REFERENCES doctors(id_doctor),
                FOREIGN KEY (id_insurance) REFERENCES insurances(id_insurance)
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("relational schema ready");
        Ok(())
    }

    // ===== Reporting =====

    pub async fn doctors_by_specialty(
        &self,
        specialty: Option<&str>,
    ) -> Result<Vec<Doctor>, StoreError> {
        let doctors = match specialty {
            Some(specialty) => {
                sqlx::query_as::<_, Doctor>(
                    "SELECT id_doctor, name, email, specialty FROM doctors WHERE specialty = ?",
                )
                .bind(specialty)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Doctor>(
                    "SELECT id_doctor, name, email, specialty FROM doctors",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(doctors)
    }

    pub async fn revenue_report(&self) -> Result<RevenueReport, StoreError> {
        let total: Option<f64> = sqlx::query("SELECT SUM(amount_paid) FROM appointments")
            .fetch_one(&self.pool)
            .await?
            .get(0);

        let by_insurance = sqlx::query_as::<_, InsuranceRevenue>(&format!(
            "SELECT IFNULL(i.name, '{NO_INSURANCE_SENTINEL}') AS insurance,
                    SUM(a.amount_paid) AS total
             FROM appointments a
             LEFT JOIN insurances i ON a.id_insurance = i.id_insurance
             GROUP BY i.id_insurance, i.name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(RevenueReport { total, by_insurance })
    }
}

#[async_trait]
impl ClinicStore for MySqlClinicStore {
    async fn find_insurance_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id_insurance FROM insurances WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    #[instrument(skip(self))]
    async fn insert_insurance(
        &self,
        name: &str,
        coverage_percentage: Option<f64>,
    ) -> Result<i64, StoreError> {
        let result =
            sqlx::query("INSERT INTO insurances (name, coverage_percentage) VALUES (?, ?)")
                .bind(name)
                .bind(coverage_percentage)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn find_doctor_id(&self, email: Option<&str>) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id_doctor FROM doctors WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    #[instrument(skip(self, name, specialty))]
    async fn insert_doctor(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO doctors (name, email, specialty) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(specialty)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn find_patient_id(&self, email: Option<&str>) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id_patient FROM patients WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    #[instrument(skip(self, name, phone, address))]
    async fn insert_patient(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<i64, StoreError> {
        let result =
            sqlx::query("INSERT INTO patients (name, email, phone, address) VALUES (?, ?, ?, ?)")
                .bind(name)
                .bind(email)
                .bind(phone)
                .bind(address)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn find_appointment_id(
        &self,
        external_id: Option<&str>,
    ) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id FROM appointments WHERE appointment_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    #[instrument(skip(self, record), fields(appointment_id = ?record.external_id))]
    async fn insert_appointment(
        &self,
        record: &AppointmentRecord<'_>,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO appointments (appointment_id, appointment_date, id_patient, id_doctor,
                id_insurance, treatment_code, treatment_description, treatment_cost, amount_paid)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.external_id)
        .bind(record.date)
        .bind(record.patient_id)
        .bind(record.doctor_id)
        .bind(record.insurance_id)
        .bind(record.treatment_code)
        .bind(record.treatment_description)
        .bind(record.treatment_cost)
        .bind(record.amount_paid)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id() as i64)
    }
}
