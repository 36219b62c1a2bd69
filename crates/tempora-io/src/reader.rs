//! CSV table reader with full input validation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tempora_match::{TimeIndex, TimeTable, Timestamp};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a time-indexed table from a CSV file.
///
/// Expected CSV format:
/// - Header row required; the first column holds timestamps, remaining
///   columns are named `f64` payload. A file with only a timestamp column is
///   a bare axis and is accepted.
/// - Timestamps parse as RFC 3339 (zone-aware) or as naive
///   `%Y-%m-%dT%H:%M:%S`, `%Y-%m-%d %H:%M:%S` (fractional seconds allowed),
///   or `%Y-%m-%d` (midnight). One file must stay in one family.
/// - Payload cells: empty parses as NaN, `true`/`false` as 1/0, anything
///   else as `f64` (which itself accepts `nan` and `inf` spellings).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyTable`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::BadTimestamp`] | Timestamp cell matches no accepted format |
/// | [`IoError::BadNumber`] | Payload cell is not a float, boolean, or empty |
/// | [`IoError::InvalidTable`] | Mixed timestamp kinds or duplicate column names |
pub struct TableReader {
    path: PathBuf,
}

impl TableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`TimeTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TimeTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets rows with varying column counts through so that
        // our own InconsistentRowLength check fires instead of a low-level
        // CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let expected_cols = header.len();
        let names: Vec<String> = header.iter().skip(1).map(str::to_owned).collect();
        debug!(expected_cols, "read CSV header");

        let mut stamps: Vec<Timestamp> = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let raw_stamp = record.get(0).unwrap_or("");
            let stamp = parse_timestamp(raw_stamp).ok_or_else(|| IoError::BadTimestamp {
                path: self.path.clone(),
                row_index,
                raw: raw_stamp.to_string(),
            })?;
            stamps.push(stamp);

            for (c, column) in columns.iter_mut().enumerate() {
                let raw = record.get(c + 1).unwrap_or("");
                let value = parse_cell(raw).ok_or_else(|| IoError::BadNumber {
                    path: self.path.clone(),
                    row_index,
                    column: names[c].clone(),
                    raw: raw.to_string(),
                })?;
                column.push(value);
            }
        }

        if stamps.is_empty() {
            return Err(IoError::EmptyTable {
                path: self.path.clone(),
            });
        }

        let index = TimeIndex::new(stamps).map_err(|source| IoError::InvalidTable {
            path: self.path.clone(),
            source,
        })?;
        let table =
            TimeTable::new(index, names, columns).map_err(|source| IoError::InvalidTable {
                path: self.path.clone(),
                source,
            })?;

        info!(
            n_rows = table.n_rows(),
            n_columns = table.n_columns(),
            kind = ?table.index().kind(),
            "table loaded"
        );
        Ok(table)
    }
}

/// Parse one timestamp cell. RFC 3339 first (it requires an offset, so naive
/// spellings cannot shadow it), then the naive formats.
fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Timestamp::Zoned(dt));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Timestamp::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| Timestamp::Naive(d.and_time(NaiveTime::MIN)))
}

/// Parse one payload cell.
fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(f64::NAN);
    }
    match trimmed {
        "true" | "True" | "TRUE" => return Some(1.0),
        "false" | "False" | "FALSE" => return Some(0.0),
        _ => {}
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tempora_match::{InputError, TzKind};

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_naive_datetimes() {
        let csv = "timestamp,sm,temp\n2007-01-01T00:00:00,0.25,281.4\n2007-01-02T00:00:00,0.30,282.0\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.names(), ["sm", "temp"]);
        assert_eq!(table.index().kind(), TzKind::Naive);
        assert_eq!(table.column("sm").unwrap(), &[0.25, 0.30]);
    }

    #[test]
    fn read_rfc3339_zoned() {
        let csv = "timestamp,sm\n2007-01-01T09:00:00+05:00,0.1\n2007-01-01T10:00:00+05:00,0.2\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.index().kind(), TzKind::Zoned);
        assert_eq!(table.column("sm").unwrap(), &[0.1, 0.2]);
    }

    #[test]
    fn read_date_only_as_midnight() {
        let csv = "date,sm\n2007-01-01,1.0\n2007-01-02,2.0\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        let expected = NaiveDate::from_ymd_opt(2007, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(table.index().stamps()[0], Timestamp::Naive(expected));
    }

    #[test]
    fn read_space_separated_with_fraction() {
        let csv = "timestamp,sm\n2007-01-01 09:30:15.250,1.0\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.index().kind(), TzKind::Naive);
    }

    #[test]
    fn bare_axis_without_payload() {
        let csv = "timestamp\n2007-01-01T00:00:00\n2007-01-02T00:00:00\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 0);
    }

    #[test]
    fn payload_booleans_and_blanks() {
        let csv = "timestamp,flag,sm\n2007-01-01T00:00:00,true,0.5\n2007-01-02T00:00:00,false,\n2007-01-03T00:00:00,0,nan\n";
        let f = write_csv(csv);
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.column("flag").unwrap(), &[1.0, 0.0, 0.0]);
        let sm = table.column("sm").unwrap();
        assert_eq!(sm[0], 0.5);
        assert!(sm[1].is_nan(), "blank cell should read as NaN");
        assert!(sm[2].is_nan(), "nan spelling should read as NaN");
    }

    #[test]
    fn error_mixed_timestamp_kinds() {
        let csv = "timestamp,sm\n2007-01-01T00:00:00,1.0\n2007-01-02T00:00:00+05:00,2.0\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InvalidTable {
                source: InputError::MixedTimezoneKinds { position: 1 },
                ..
            })
        ));
    }

    #[test]
    fn error_bad_timestamp() {
        let csv = "timestamp,sm\nJanuary 1st,1.0\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::BadTimestamp { row_index: 0, .. })
        ));
    }

    #[test]
    fn error_bad_number() {
        let csv = "timestamp,sm\n2007-01-01T00:00:00,wet\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::BadNumber { row_index: 0, ref column, .. }) if column == "sm"
        ));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let csv = "timestamp,a,b\n2007-01-01T00:00:00,1.0,2.0\n2007-01-02T00:00:00,1.0\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, .. })
        ));
    }

    #[test]
    fn error_empty_table() {
        let csv = "timestamp,sm\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyTable { .. })));
    }

    #[test]
    fn error_duplicate_column_names() {
        let csv = "timestamp,sm,sm\n2007-01-01T00:00:00,1.0,2.0\n";
        let f = write_csv(csv);
        let result = TableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InvalidTable {
                source: InputError::DuplicateColumn { .. },
                ..
            })
        ));
    }

    #[test]
    fn error_file_not_found() {
        let result = TableReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
