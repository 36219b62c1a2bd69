//! Writes collocation results and run summaries to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempora_match::Collocated;
use tracing::{info, instrument};

use crate::{IoError, RunName};

/// Per-table record carried into the run summary JSON.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Label of the candidate table (usually the input file stem).
    pub label: String,
    /// Rows in the reference table as read.
    pub n_reference: usize,
    /// Rows in the candidate table before matching.
    pub n_candidates: usize,
    /// Reference rows that found an in-window partner.
    pub n_matched: usize,
    /// Rows written to the output table.
    pub n_rows: usize,
    /// Path of the written CSV.
    pub output: String,
}

/// Writes collocation artifacts into an output directory, with all file
/// names prefixed by the run name.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a writer rooted at `output_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be
    /// created.
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Write one collocated table as `<run>_<label>.csv`.
    ///
    /// Columns: `timestamp`, the payload columns, then `index_other` and
    /// `distance_other_secs` when the result carries them, then `matched`.
    /// Unmatched rows leave the extra columns empty; NaN payload is written
    /// as `NaN`.
    #[instrument(skip(self, result), fields(run = %self.run, label))]
    pub fn write_collocated(&self, label: &str, result: &Collocated) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{}.csv", self.run.as_str(), label));

        let mut wtr = csv::Writer::from_path(&path).map_err(|source| IoError::CsvWrite {
            path: path.clone(),
            source,
        })?;

        let mut header: Vec<String> = Vec::with_capacity(result.names().len() + 4);
        header.push("timestamp".to_string());
        header.extend(result.names().iter().cloned());
        if result.index_other().is_some() {
            header.push("index_other".to_string());
        }
        if result.distance_other().is_some() {
            header.push("distance_other_secs".to_string());
        }
        header.push("matched".to_string());
        wtr.write_record(&header).map_err(|source| IoError::CsvWrite {
            path: path.clone(),
            source,
        })?;

        for row in 0..result.n_rows() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            record.push(result.index()[row].to_string());
            for column in result.columns() {
                record.push(column[row].to_string());
            }
            if let Some(stamps) = result.index_other() {
                record.push(stamps[row].map(|s| s.to_string()).unwrap_or_default());
            }
            if let Some(distances) = result.distance_other() {
                // In-window distances always fit i64 nanoseconds.
                let cell = distances[row]
                    .and_then(|d| d.num_nanoseconds())
                    .map(|n| (n as f64 / 1e9).to_string())
                    .unwrap_or_default();
                record.push(cell);
            }
            record.push(result.is_matched(row).to_string());
            wtr.write_record(&record).map_err(|source| IoError::CsvWrite {
                path: path.clone(),
                source,
            })?;
        }

        wtr.flush().map_err(|source| IoError::WriteFile {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), n_rows = result.n_rows(), "collocated table written");
        Ok(path)
    }

    /// Write the run summary as `<run>_summary.json`.
    #[instrument(skip(self, tables), fields(run = %self.run, n_tables = tables.len()))]
    pub fn write_summary(&self, tables: &[TableSummary]) -> Result<PathBuf, IoError> {
        #[derive(Serialize)]
        struct SummaryArtifact<'a> {
            run: &'a str,
            n_tables: usize,
            tables: &'a [TableSummary],
        }

        let artifact = SummaryArtifact {
            run: self.run.as_str(),
            n_tables: tables.len(),
            tables,
        };

        let path = self
            .output_dir
            .join(format!("{}_summary.json", self.run.as_str()));
        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        fs::write(&path, json).map_err(|source| IoError::WriteFile {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), "summary written");
        Ok(path)
    }
}
