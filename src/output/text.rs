//! Human-readable text report.
//!
//! ```text
//! Group 1: 3 files, 42 B each, 84 B reclaimable
//!   hash: 6f1ed002ab5595859014ebf0951522d9...
//!   /data/a/report.txt
//!   /data/b/report.txt
//!   /data/c/report.txt
//!
//! Summary
//!   Files scanned:     12
//!   ...
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::DuplicateReport;

/// Format a byte count with binary units.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Text renderer for a [`DuplicateReport`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a DuplicateReport,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(report: &'a DuplicateReport) -> Self {
        Self { report }
    }

    /// Write groups followed by the summary block.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let report = self.report;

        if report.interrupted {
            writeln!(writer, "Scan interrupted; no duplicate groups were confirmed.")?;
            writeln!(writer)?;
        } else if report.groups.is_empty() {
            writeln!(writer, "No duplicates found.")?;
            writeln!(writer)?;
        }

        for group in &report.groups {
            writeln!(
                writer,
                "Group {}: {} files, {} each, {} reclaimable",
                group.id,
                group.count,
                format_size(group.size),
                format_size(group.wasted_space)
            )?;
            writeln!(writer, "  hash: {}", group.hash)?;
            for file in &group.files {
                writeln!(writer, "  {}", file.display())?;
            }
            writeln!(writer)?;
        }

        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let stats = &self.report.stats;
        writeln!(writer, "Summary")?;
        writeln!(writer, "  Files scanned:     {}", stats.total_files)?;
        writeln!(writer, "  Files hashed:      {}", stats.processed_files)?;
        writeln!(writer, "  Skipped files:     {}", stats.skipped_files)?;
        writeln!(writer, "  Skipped dirs:      {}", stats.skipped_dirs)?;
        writeln!(writer, "  Errors:            {}", stats.error_count)?;
        writeln!(writer, "  Duplicate groups:  {}", stats.duplicate_groups)?;
        writeln!(writer, "  Duplicate files:   {}", stats.duplicate_files)?;
        writeln!(
            writer,
            "  Reclaimable space: {}",
            format_size(self.report.total_wasted_space)
        )?;
        writeln!(
            writer,
            "  Started:           {}",
            stats.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(writer, "  Duration:          {} ms", stats.duration_ms)?;
        Ok(())
    }
}
