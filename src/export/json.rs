use std::io::Write;

use crate::error::ExportError;
use crate::models::ActivityRecord;
use crate::summary::TypeSummary;

/// Transformed activities as a pretty-printed JSON array; missing values are null
pub fn write_activities<W: Write>(
    rows: &[ActivityRecord],
    mut writer: W,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_summaries<W: Write>(
    summaries: &[TypeSummary],
    mut writer: W,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, summaries)?;
    writeln!(writer)?;
    Ok(())
}
