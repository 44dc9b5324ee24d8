//! JSON output formatter for duplicate reports.
//!
//! The report is serialized as-is, with the exit code appended so scripts
//! can branch on a single document.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "scan_date": "2024-05-01T12:00:00Z",
//!   "stats": { "total_files": 100, "processed_files": 40, "error_count": 0, ... },
//!   "total_wasted_space": 51200,
//!   "groups": [
//!     { "id": 1, "count": 2, "size": 51200, "wasted_space": 51200,
//!       "hash": "af13...", "files": ["/a/x.bin", "/b/x.bin"] }
//!   ],
//!   "interrupted": false,
//!   "exit_code": 0,
//!   "exit_code_name": "DS000"
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::DuplicateReport;
use crate::error::ExitCode;

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// The report itself
    #[serde(flatten)]
    pub report: &'a DuplicateReport,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: &'static str,
}

impl<'a> JsonOutput<'a> {
    /// Wrap a report for serialization.
    #[must_use]
    pub fn new(report: &'a DuplicateReport) -> Self {
        let exit_code = ExitCode::for_report(report);
        Self {
            report,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur while rendering a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}
