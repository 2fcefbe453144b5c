use csv::WriterBuilder;
use std::io::Write;

use crate::error::ExportError;
use crate::measure::Measure;
use crate::models::ActivityRecord;
use crate::summary::{MetricStats, TypeSummary};

const ACTIVITY_HEADER: [&str; 18] = [
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
    "outdoor",
    "norm_hr",
    "speed_eff",
    "power_eff",
];

/// Booleans in the exporter's spelling, empty for missing
fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

fn cell(value: Measure) -> String {
    value.to_string()
}

fn optional(value: Option<f64>) -> String {
    value.map_or(String::new(), |v| v.to_string())
}

/// Transformed activities as CSV with a header row
pub fn write_activities<W: Write>(rows: &[ActivityRecord], writer: W) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(ACTIVITY_HEADER)?;

    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.activity_type.to_string(),
            r.timestamp(),
            cell(r.moving_time),
            cell(r.elapsed_time),
            cell(r.distance),
            cell(r.speed),
            cell(r.power),
            cell(r.w_power),
            flag(r.device_power),
            cell(r.hr),
            cell(r.cadence),
            cell(r.elevation_gain),
            flag(r.trainer),
            flag(r.outdoor),
            cell(r.norm_hr),
            cell(r.speed_eff),
            cell(r.power_eff),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Per-type summaries as CSV, one row per type
pub fn write_summaries<W: Write>(summaries: &[TypeSummary], writer: W) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    let mut header = vec!["type".to_string(), "activities".to_string(), "outdoor".to_string()];
    for metric in ["hr", "norm_hr", "speed_eff", "power_eff"] {
        header.push(format!("{}_count", metric));
        header.push(format!("{}_mean", metric));
        header.push(format!("{}_std_dev", metric));
    }
    writer.write_record(&header)?;

    for s in summaries {
        let mut record = vec![
            s.activity_type.to_string(),
            s.activities.to_string(),
            s.outdoor.to_string(),
        ];
        for stats in [&s.hr, &s.norm_hr, &s.speed_eff, &s.power_eff] {
            push_stats(&mut record, stats);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn push_stats(record: &mut Vec<String>, stats: &MetricStats) {
    record.push(stats.count.to_string());
    record.push(optional(stats.mean));
    record.push(optional(stats.std_dev));
}
