//! Row normalization: dynamically-typed sheet rows become typed canonical
//! rows, with the appointment date resolved to its `YYYY-MM-DD` form.

use chrono::{DateTime, Utc};

use crate::sheet::{CellValue, SheetRow};

/// Days between the spreadsheet serial epoch (1899-12-30) and the Unix
/// epoch. Serial date D maps to `(D - 25569) * 86400` seconds.
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// A row ready for store operations. Every field is optional: missing or
/// malformed cells are carried as `None` and surface as constraint
/// violations in the store, not as normalization errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRow {
    pub appointment_id: Option<String>,
    pub appointment_date: Option<String>,
    pub insurance_provider: Option<String>,
    pub coverage_percentage: Option<f64>,
    pub doctor_email: Option<String>,
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
    pub patient_email: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_address: Option<String>,
    pub treatment_code: Option<String>,
    pub treatment_description: Option<String>,
    pub treatment_cost: Option<f64>,
    pub amount_paid: Option<f64>,
}

/// Convert one raw sheet row into its canonical form. Never fails.
pub fn normalize(row: &SheetRow) -> CanonicalRow {
    CanonicalRow {
        appointment_id: text(row, "appointment_id"),
        appointment_date: canonical_date(row.get("appointment_date")),
        insurance_provider: text(row, "insurance_provider"),
        coverage_percentage: number(row, "coverage_percentage"),
        doctor_email: text(row, "doctor_email"),
        doctor_name: text(row, "doctor_name"),
        specialty: text(row, "specialty"),
        patient_email: text(row, "patient_email"),
        patient_name: text(row, "patient_name"),
        patient_phone: text(row, "patient_phone"),
        patient_address: text(row, "patient_address"),
        treatment_code: text(row, "treatment_code"),
        treatment_description: text(row, "treatment_description"),
        treatment_cost: number(row, "treatment_cost"),
        amount_paid: number(row, "amount_paid"),
    }
}

fn text(row: &SheetRow, key: &str) -> Option<String> {
    row.get(key).and_then(CellValue::as_text)
}

fn number(row: &SheetRow, key: &str) -> Option<f64> {
    row.get(key).and_then(CellValue::as_number)
}

/// Resolve the date cell's representation:
/// numeric → spreadsheet serial date, native date → calendar date, string →
/// passed through unchanged. Time-of-day is discarded in the date-like
/// cases.
fn canonical_date(cell: Option<&CellValue>) -> Option<String> {
    match cell? {
        CellValue::Number(serial) => serial_to_date(*serial),
        CellValue::Date(dt) => Some(dt.format("%Y-%m-%d").to_string()),
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Empty => None,
    }
}

fn serial_to_date(serial: f64) -> Option<String> {
    let seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY).trunc() as i64;
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date_cell(y: i32, m: u32, d: u32, h: u32, min: u32) -> CellValue {
        CellValue::Date(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn serial_dates_convert_to_calendar_dates() {
        let row = SheetRow::from([("appointment_date".into(), CellValue::Number(44197.0))]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("2021-01-01"));

        let row = SheetRow::from([("appointment_date".into(), CellValue::Number(25569.0))]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn serial_time_of_day_is_discarded() {
        // 44197.73 is late in the day on 2021-01-01
        let row = SheetRow::from([("appointment_date".into(), CellValue::Number(44197.73))]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn pre_unix_epoch_serials_still_resolve() {
        // serial 1 is 1899-12-31
        let row = SheetRow::from([("appointment_date".into(), CellValue::Number(1.0))]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("1899-12-31"));
    }

    #[test]
    fn native_date_cells_format_directly() {
        let row = SheetRow::from([("appointment_date".into(), date_cell(2021, 1, 1, 14, 30))]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn string_dates_pass_through_unchanged() {
        let row = SheetRow::from([(
            "appointment_date".into(),
            CellValue::Text("01/02/2021".into()),
        )]);
        assert_eq!(normalize(&row).appointment_date.as_deref(), Some("01/02/2021"));
    }

    #[test]
    fn missing_fields_become_none() {
        let row = SheetRow::new();
        let canonical = normalize(&row);
        assert_eq!(canonical.appointment_date, None);
        assert_eq!(canonical.doctor_email, None);
        assert_eq!(canonical.amount_paid, None);
    }

    #[test]
    fn other_fields_are_untouched_by_date_handling() {
        let row = SheetRow::from([
            ("appointment_id".into(), CellValue::Text("A1".into())),
            ("appointment_date".into(), CellValue::Number(44197.0)),
            ("doctor_email".into(), CellValue::Text("d@x.com".into())),
            ("treatment_cost".into(), CellValue::Number(100.0)),
            ("amount_paid".into(), CellValue::Text("80".into())),
        ]);
        let canonical = normalize(&row);
        assert_eq!(canonical.appointment_id.as_deref(), Some("A1"));
        assert_eq!(canonical.doctor_email.as_deref(), Some("d@x.com"));
        assert_eq!(canonical.treatment_cost, Some(100.0));
        assert_eq!(canonical.amount_paid, Some(80.0));
    }
}
