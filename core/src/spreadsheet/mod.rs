//! Eyeplan dose spreadsheet reader
//!
//! The export holds the patient name in A1 and the patient ID in A2. Row 3
//! is the header of the sample table, which starts on row 4 and has at least
//! the `X`, `Y`, `Z` and `Dose` columns.

use crate::error::{ConvertError, Result};
use crate::types::{DoseSample, PatientInfo, SampleTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info, warn};
use std::path::Path;

/// Zero-based sheet row holding the column names
const HEADER_ROW: u32 = 2;

const COLUMN_NAMES: [&str; 4] = ["X", "Y", "Z", "Dose"];

/// Contents of an Eyeplan dose export
#[derive(Debug, Clone, PartialEq)]
pub struct EyeplanSheet {
    pub patient: PatientInfo,
    pub samples: SampleTable,
}

/// Reads the first worksheet of an Eyeplan export
///
/// Accepts every workbook format calamine recognises (xlsx, xlsm, xls, ods).
pub fn read_spreadsheet(path: &Path) -> Result<EyeplanSheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        ConvertError::SpreadsheetError(format!("{} has no worksheets", path.display()))
    })??;

    let sheet = parse_sheet(&range)?;
    info!(
        "Read {} dose samples from {}",
        sheet.samples.len(),
        path.display()
    );
    Ok(sheet)
}

/// Parses the patient header and sample table of a worksheet
///
/// # Errors
///
/// Returns [`ConvertError::SpreadsheetError`] if the header row or one of
/// the required columns is missing, or a coordinate cell is empty or not
/// numeric. An empty Dose cell is read as NaN.
pub fn parse_sheet(range: &Range<Data>) -> Result<EyeplanSheet> {
    let patient = PatientInfo::new(header_cell(range, 0, "name"), header_cell(range, 1, "ID"));
    debug!("Patient: {} ({})", patient.name, patient.id);

    let (start_row, _) = range.start().ok_or_else(|| {
        ConvertError::SpreadsheetError("the worksheet is empty".to_string())
    })?;
    if start_row > HEADER_ROW {
        return Err(ConvertError::SpreadsheetError(format!(
            "header row {} not found",
            HEADER_ROW + 1
        )));
    }

    let mut rows = range
        .rows()
        .enumerate()
        .map(|(i, row)| (start_row + i as u32, row))
        .skip_while(|(index, _)| *index < HEADER_ROW);

    let (_, header) = rows.next().ok_or_else(|| {
        ConvertError::SpreadsheetError(format!("header row {} not found", HEADER_ROW + 1))
    })?;
    let columns = locate_columns(header)?;

    let mut samples = SampleTable::default();
    for (index, row) in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let value = |column: usize, name: &str| -> Result<Option<f64>> {
            numeric_cell(row.get(column).unwrap_or(&Data::Empty)).map_err(|detail| {
                ConvertError::SpreadsheetError(format!(
                    "row {}, column {}: {}",
                    index + 1,
                    name,
                    detail
                ))
            })
        };
        let required = |column: usize, name: &str| -> Result<f64> {
            value(column, name)?.ok_or_else(|| {
                ConvertError::SpreadsheetError(format!(
                    "row {}, column {}: empty cell",
                    index + 1,
                    name
                ))
            })
        };

        samples.push(DoseSample::new(
            required(columns[0], COLUMN_NAMES[0])?,
            required(columns[1], COLUMN_NAMES[1])?,
            required(columns[2], COLUMN_NAMES[2])?,
            value(columns[3], COLUMN_NAMES[3])?.unwrap_or(f64::NAN),
        ));
    }

    Ok(EyeplanSheet { patient, samples })
}

/// Text of a patient header cell in column A
fn header_cell(range: &Range<Data>, row: u32, label: &str) -> String {
    let text = range
        .get_value((row, 0))
        .map(cell_text)
        .unwrap_or_default();
    if text.is_empty() {
        warn!("Patient {} cell A{} is empty", label, row + 1);
    }
    text
}

/// Positions of the X, Y, Z and Dose columns within a row
fn locate_columns(header: &[Data]) -> Result<[usize; 4]> {
    let names: Vec<String> = header.iter().map(cell_text).collect();
    let mut positions = [0; 4];
    let mut missing = Vec::new();

    for (slot, wanted) in positions.iter_mut().zip(COLUMN_NAMES) {
        match names.iter().position(|name| name == wanted) {
            Some(index) => *slot = index,
            None => missing.push(wanted),
        }
    }

    if !missing.is_empty() {
        return Err(ConvertError::SpreadsheetError(format!(
            "missing column(s) {} in header row {} (found {:?})",
            missing.join(", "),
            HEADER_ROW + 1,
            names
        )));
    }
    Ok(positions)
}

/// Cell rendered as text, integral numbers without a fractional part
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Numeric value of a cell, `None` for an empty cell
fn numeric_cell(cell: &Data) -> std::result::Result<Option<f64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("'{}' is not a number", s)),
        other => Err(format!("'{}' is not a number", other)),
    }
}
