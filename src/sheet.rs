//! Spreadsheet decoding.
//!
//! Opens a workbook, reads the first worksheet and turns each data row into
//! a map from header name to [`CellValue`]. Cells arrive as strings, numbers
//! or native date values depending on how the source file was formatted, so
//! the dynamic typing is kept until the normalizer resolves it.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SheetError;

/// A spreadsheet cell as decoded from the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// Text coercion: numbers render without a trailing `.0` so numeric
    /// identifier columns round-trip the way the source system wrote them.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(dt) => Some(dt.format("%Y-%m-%d").to_string()),
            CellValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Float(v) => CellValue::Number(*v),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(dt) => CellValue::Date(dt),
                None => CellValue::Empty,
            },
            Data::DateTimeIso(s) => parse_iso(s),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

fn parse_iso(s: &str) -> CellValue {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return CellValue::Date(dt);
    }
    if let Ok(d) = s.parse::<NaiveDate>() {
        return CellValue::Date(d.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
    CellValue::Text(s.to_string())
}

/// One decoded row: header name to cell value. Empty cells are omitted, so
/// a blank cell and a missing column are indistinguishable downstream.
pub type SheetRow = HashMap<String, CellValue>;

/// Decode the first worksheet of the workbook at `path` into rows.
pub fn read_workbook(path: &Path) -> Result<Vec<SheetRow>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet)?;
    Ok(rows_from_range(&range))
}

/// The first row is the header; every following row is zipped against it.
pub fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Vec::new(),
    };

    rows.map(|cells| {
        headers
            .iter()
            .zip(cells)
            .filter(|(_, cell)| !matches!(cell, Data::Empty))
            .map(|(name, cell)| (name.clone(), CellValue::from(cell)))
            .collect()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_coerce_to_clean_text() {
        assert_eq!(CellValue::Number(1001.0).as_text().as_deref(), Some("1001"));
        assert_eq!(CellValue::Number(12.5).as_text().as_deref(), Some("12.5"));
    }

    #[test]
    fn text_cells_parse_as_numbers_when_numeric() {
        assert_eq!(CellValue::Text(" 80 ".into()).as_number(), Some(80.0));
        assert_eq!(CellValue::Text("n/a".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn range_rows_are_keyed_by_header_and_skip_blanks() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("appointment_id".into()));
        range.set_value((0, 1), Data::String("amount_paid".into()));
        range.set_value((0, 2), Data::String("specialty".into()));
        range.set_value((1, 0), Data::String("A1".into()));
        range.set_value((1, 1), Data::Float(80.0));
        // (1, 2) left empty

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("appointment_id"),
            Some(&CellValue::Text("A1".into()))
        );
        assert_eq!(rows[0].get("amount_paid"), Some(&CellValue::Number(80.0)));
        assert!(!rows[0].contains_key("specialty"));
    }
}
