//! CSV roster parsing.
//!
//! One `name,grade` record per line. Blank lines, a `name` header row,
//! and rows with fewer than two fields are skipped. Fields are trimmed.

use fairgroup_core::GradeRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("line {line}: grade {value:?} is not a number")]
    InvalidGrade { line: u64, value: String },
}

/// Parse CSV text into records, in file order. Grades are returned as
/// written; range checks and rounding happen when the roster admits them.
pub fn parse_records(body: &str) -> Result<Vec<GradeRecord>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() < 2 {
            continue;
        }
        let name = &record[0];
        if name.eq_ignore_ascii_case("name") {
            continue;
        }

        let raw_grade = &record[1];
        let grade: f64 = raw_grade.parse().map_err(|_| CsvError::InvalidGrade {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            value: raw_grade.to_string(),
        })?;
        records.push(GradeRecord::new(name, grade));
    }
    Ok(records)
}
