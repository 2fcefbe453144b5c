use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::ImportFormat;
use crate::measure::Measure;
use crate::models::{ActivityRecord, ActivityTable, ActivityType};

/// Column order of the header-less activity export
pub const EXPORT_COLUMNS: [&str; 14] = [
    "id",
    "type",
    "datetime",
    "moving_time",
    "elapsed_time",
    "distance",
    "speed",
    "power",
    "w_power",
    "device_power",
    "hr",
    "cadence",
    "elevation_gain",
    "trainer",
];

/// Importer for the fixed 14-column activity export
#[derive(Debug, Default)]
pub struct CsvImporter;

impl CsvImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse an export from any reader
    pub fn read_table<R: Read>(&self, reader: R) -> Result<ActivityTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(ImportError::from)?;
            let line = row.position().map_or(0, |p| p.line());
            records.push(Self::parse_row(&row, line)?);
        }

        Ok(ActivityTable::new(records))
    }

    fn parse_row(
        row: &StringRecord,
        line: u64,
    ) -> std::result::Result<ActivityRecord, ImportError> {
        if row.len() != EXPORT_COLUMNS.len() {
            return Err(ImportError::ColumnCount {
                line,
                expected: EXPORT_COLUMNS.len(),
                found: row.len(),
            });
        }

        let cell = |index: usize| row.get(index).unwrap_or("");
        let measure = |index: usize| parse_measure(cell(index), EXPORT_COLUMNS[index], line);
        let flag = |index: usize| parse_flag(cell(index), EXPORT_COLUMNS[index], line);

        let id = cell(0).parse::<i64>().map_err(|e| ImportError::InvalidField {
            line,
            column: EXPORT_COLUMNS[0],
            value: cell(0).to_string(),
            reason: e.to_string(),
        })?;

        let activity_type = match cell(1) {
            "" => {
                return Err(ImportError::InvalidField {
                    line,
                    column: EXPORT_COLUMNS[1],
                    value: String::new(),
                    reason: "activity type is empty".to_string(),
                })
            }
            name => ActivityType::from(name.to_string()),
        };

        let datetime = parse_datetime(cell(2)).ok_or_else(|| ImportError::InvalidField {
            line,
            column: EXPORT_COLUMNS[2],
            value: cell(2).to_string(),
            reason: "unrecognized timestamp".to_string(),
        })?;

        Ok(ActivityRecord {
            id,
            activity_type,
            datetime,
            moving_time: measure(3)?,
            elapsed_time: measure(4)?,
            distance: measure(5)?,
            speed: measure(6)?,
            power: measure(7)?,
            w_power: measure(8)?,
            device_power: flag(9)?,
            hr: measure(10)?,
            cadence: measure(11)?,
            elevation_gain: measure(12)?,
            trainer: flag(13)?,
            outdoor: None,
            norm_hr: Measure::MISSING,
            speed_eff: Measure::MISSING,
            power_eff: Measure::MISSING,
        })
    }
}

/// Parse a timestamp written by the exporter (RFC 3339) or a naive UTC form
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for format in &formats {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    None
}

fn parse_measure(
    value: &str,
    column: &'static str,
    line: u64,
) -> std::result::Result<Measure, ImportError> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(Measure::MISSING);
    }

    value
        .parse::<f64>()
        .map(Measure::new)
        .map_err(|e| ImportError::InvalidField {
            line,
            column,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(
    value: &str,
    column: &'static str,
    line: u64,
) -> std::result::Result<Option<bool>, ImportError> {
    match value.to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(ImportError::InvalidField {
            line,
            column,
            value: value.to_string(),
            reason: "expected True or False".to_string(),
        }),
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    fn import_file(&self, file_path: &Path) -> Result<ActivityTable> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let file = std::fs::File::open(file_path)?;
        let table = self.read_table(file)?;

        tracing::info!(
            path = %file_path.display(),
            rows = table.len(),
            "Loaded activity export"
        );

        Ok(table)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}
