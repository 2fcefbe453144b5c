use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::models::ActivityTable;
use crate::summary::TypeSummary;

pub mod csv;
pub mod json;
pub mod text;

/// Output formats for the transformed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Terminal table
    Table,
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" | "txt" => Ok(ExportFormat::Table),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Table => write!(f, "table"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Write the table in `format`; `limit` keeps only the most recent rows.
/// `styled` adds terminal colours to the table format and is ignored otherwise.
pub fn export_table<W: Write>(
    table: &ActivityTable,
    format: ExportFormat,
    limit: Option<usize>,
    styled: bool,
    writer: W,
) -> Result<(), ExportError> {
    let rows = match limit {
        Some(limit) => &table.records()[..limit.min(table.len())],
        None => table.records(),
    };

    match format {
        ExportFormat::Table => text::write_activity_table(rows, styled, writer),
        ExportFormat::Csv => csv::write_activities(rows, writer),
        ExportFormat::Json => json::write_activities(rows, writer),
    }
}

/// Write per-type summaries in `format`
pub fn export_summary<W: Write>(
    summaries: &[TypeSummary],
    format: ExportFormat,
    styled: bool,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Table => text::write_summary_table(summaries, styled, writer),
        ExportFormat::Csv => csv::write_summaries(summaries, writer),
        ExportFormat::Json => json::write_summaries(summaries, writer),
    }
}

/// Export the table to a file, creating parent directories as needed.
/// Files never carry terminal colours.
pub fn export_table_to_path<P: AsRef<Path>>(
    table: &ActivityTable,
    format: ExportFormat,
    limit: Option<usize>,
    output_path: P,
) -> Result<(), ExportError> {
    if let Some(parent) = output_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(&output_path)?);
    export_table(table, format, limit, false, &mut writer)?;
    writer.flush()?;

    tracing::info!(
        path = %output_path.as_ref().display(),
        format = %format,
        "Exported activity table"
    );
    Ok(())
}
