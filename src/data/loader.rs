// ============================================================
// Layer 4 — Tabular Loader
// ============================================================
// Reads the student CSV and turns it into typed Records.
//
// Format:
//   line 1      header row of field names
//   line 2..N   comma-separated values, no quoting
//
// Each cell is trimmed, then coerced to a number when it is
// non-empty and parses as a finite float; anything else is
// kept as text (e.g. the `gender` column).
//
// A row with a different number of fields than the header
// is rejected with its line number instead of producing a
// half-filled record. Blank lines (including a trailing
// newline at the end of the file) are skipped.
//
// Reference: Rust Book §8 (Strings), §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::error::PipelineError;
use crate::domain::record::{FieldValue, Record};
use crate::domain::schema::Schema;
use crate::domain::traits::RecordSource;

/// Parse delimited text into records.
pub fn parse_csv(text: &str) -> Result<Vec<Record>, PipelineError> {
    // 1-based line numbers so errors point at the file as a user sees it
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(PipelineError::MissingHeader)?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() != headers.len() {
            return Err(PipelineError::MalformedRow {
                line: line_no,
                expected: headers.len(),
                found: cells.len(),
            });
        }

        let record: Record = headers
            .iter()
            .zip(cells)
            .map(|(h, cell)| (h.clone(), FieldValue::from_cell(cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Header names of a CSV text, used to validate against a Schema
/// before the whole file is parsed.
pub fn header_of(text: &str) -> Result<Vec<String>, PipelineError> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .find(|l| !l.trim().is_empty())
        .map(|l| l.split(',').map(|h| h.trim().to_string()).collect())
        .ok_or(PipelineError::MissingHeader)
}

/// Loads the training corpus from a CSV file on disk.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvSource {
    path: PathBuf,
    schema: Schema,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self { path: path.into(), schema }
    }
}

impl RecordSource for CsvSource {
    fn load_all(&self) -> Result<Vec<Record>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;

        self.schema
            .check_header(&header_of(&text)?)
            .with_context(|| format!("'{}' does not match the schema", self.path.display()))?;

        let records = parse_csv(&text)
            .with_context(|| format!("Cannot parse '{}'", self.path.display()))?;

        tracing::info!("Loaded {} records from '{}'", records.len(), self.path.display());
        Ok(records)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_numbers_and_text() {
        let records = parse_csv("age,gender,score\n21,Male,60.5\n19, Female ,40\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("age"), Some(&FieldValue::Number(21.0)));
        assert_eq!(records[0].get("gender"), Some(&FieldValue::Text("Male".into())));
        assert_eq!(records[1].get("gender"), Some(&FieldValue::Text("Female".into())));
        assert_eq!(records[1].get("score"), Some(&FieldValue::Number(40.0)));
    }

    #[test]
    fn test_short_row_is_rejected_with_line_number() {
        let err = parse_csv("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedRow { line: 3, expected: 3, found: 2 }
        );
    }

    #[test]
    fn test_long_row_is_rejected() {
        let err = parse_csv("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let records = parse_csv("a,b\r\n1,x\r\n\r\n2,y\r\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("b"), Some(&FieldValue::Text("y".into())));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert_eq!(parse_csv("").unwrap_err(), PipelineError::MissingHeader);
        assert_eq!(parse_csv("\n\n").unwrap_err(), PipelineError::MissingHeader);
    }

    #[test]
    fn test_header_only_gives_no_records() {
        assert!(parse_csv("a,b,c\n").unwrap().is_empty());
    }

    #[test]
    fn test_csv_source_checks_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "feat,score").unwrap();
        writeln!(file, "1,2").unwrap();

        let source = CsvSource::new(file.path(), Schema::new(["feat"], "kind", "score"));
        let err = source.load_all().unwrap_err();
        assert!(format!("{err:#}").contains("column 'kind' is missing"));

        let source = CsvSource::new(file.path(), Schema::new(Vec::<String>::new(), "feat", "score"));
        assert_eq!(source.load_all().unwrap().len(), 1);
    }
}
