//! File I/O for temporal collocation runs.
//!
//! Reads time-indexed CSV tables into [`tempora_match::TimeTable`] values
//! and writes collocated tables plus a JSON run summary. All parsing and
//! validation failures surface as [`IoError`] with file and row context.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::RunName;
pub use error::IoError;
pub use reader::TableReader;
pub use writer::{ResultWriter, TableSummary};
