use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::ExportError;
use crate::report::Report;
use crate::stats::AnalysisReport;
use crate::stats::format::format_fixed;

// ---------------------------------------------------------------------------
// Report export
// ---------------------------------------------------------------------------

/// Write any serialisable value as pretty JSON, full precision.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ExportError> {
    let file = create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the whole analysis as pretty JSON.
pub fn write_report_json(report: &AnalysisReport, path: &Path) -> Result<(), ExportError> {
    write_json(report, path)?;
    log::info!("wrote analysis report to {}", path.display());
    Ok(())
}

/// Download a saved report: title, description, chart and analysis.
pub fn write_saved_report(report: &Report, path: &Path) -> Result<(), ExportError> {
    write_json(report, path)?;
    log::info!("wrote report '{}' to {}", report.title, path.display());
    Ok(())
}

/// Write the statistics table as CSV, values rounded to `precision` places.
pub fn write_statistics_csv(
    report: &AnalysisReport,
    path: &Path,
    precision: u32,
) -> Result<(), ExportError> {
    let file = create(path)?;
    write_statistics(report, file, precision)?;
    log::info!("wrote statistics table to {}", path.display());
    Ok(())
}

/// CSV body of [`write_statistics_csv`] over any writer.
pub fn write_statistics<W: Write>(
    report: &AnalysisReport,
    out: W,
    precision: u32,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["column", "count", "mean", "median", "min", "max", "std_dev"])?;
    for entry in report.statistics.iter() {
        let s = &entry.stats;
        writer.write_record([
            entry.column.clone(),
            s.count.to_string(),
            format_fixed(s.mean, precision),
            format_fixed(s.median, precision),
            format_fixed(s.min, precision),
            format_fixed(s.max, precision),
            format_fixed(s.std_dev, precision),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
