//! Output formatters for duplicate reports.
//!
//! - [`text`]: human-readable listing with a summary block
//! - [`json`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupescout::duplicates::{DuplicateFinder, SizeBuckets, Stats};
//! use dupescout::output::{write_report, OutputFormat};
//!
//! let report = DuplicateFinder::with_defaults()
//!     .find(SizeBuckets::new(), &Stats::new())
//!     .unwrap();
//! write_report(&report, OutputFormat::Json, &mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

use std::io::Write;

use clap::ValueEnum;

use crate::duplicates::DuplicateReport;

pub use json::{JsonOutput, OutputError};
pub use text::TextOutput;

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render `report` in `format` to `writer`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(
    report: &DuplicateReport,
    format: OutputFormat,
    writer: &mut W,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report).write_to(writer)?,
        OutputFormat::Json => JsonOutput::new(report).write_to(writer, true)?,
    }
    writer.flush()?;
    Ok(())
}
