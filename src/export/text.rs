use colored::Colorize;
use std::io::Write;
use tabled::{settings::Style, Table, Tabled};

use crate::error::ExportError;
use crate::measure::Measure;
use crate::models::ActivityRecord;
use crate::summary::{MetricStats, TypeSummary};

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Type")]
    activity_type: String,
    #[tabled(rename = "Outdoor")]
    outdoor: String,
    #[tabled(rename = "HR")]
    hr: String,
    #[tabled(rename = "Norm HR")]
    norm_hr: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Speed Eff")]
    speed_eff: String,
    #[tabled(rename = "W Power")]
    w_power: String,
    #[tabled(rename = "Power Eff")]
    power_eff: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Type")]
    activity_type: String,
    #[tabled(rename = "Activities")]
    activities: usize,
    #[tabled(rename = "Outdoor")]
    outdoor: usize,
    #[tabled(rename = "Mean HR")]
    mean_hr: String,
    #[tabled(rename = "Mean Norm HR")]
    mean_norm_hr: String,
    #[tabled(rename = "Speed Eff")]
    speed_eff: String,
    #[tabled(rename = "Power Eff")]
    power_eff: String,
}

fn fixed(value: Measure, precision: usize) -> String {
    match value.value() {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

/// Mean with spread, e.g. `2.31 ± 0.20 (n=14)`
fn mean_with_spread(stats: &MetricStats) -> String {
    match (stats.mean, stats.std_dev) {
        (Some(mean), Some(sd)) => format!("{:.2} ± {:.2} (n={})", mean, sd, stats.count),
        (Some(mean), None) => format!("{:.2} (n={})", mean, stats.count),
        _ => "-".to_string(),
    }
}

impl From<&ActivityRecord> for ActivityRow {
    fn from(r: &ActivityRecord) -> Self {
        ActivityRow {
            date: r.datetime.format("%Y-%m-%d %H:%M").to_string(),
            id: r.id,
            activity_type: r.activity_type.to_string(),
            outdoor: match r.outdoor {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
            hr: fixed(r.hr, 0),
            norm_hr: fixed(r.norm_hr, 3),
            speed: fixed(r.speed, 2),
            speed_eff: fixed(r.speed_eff, 2),
            w_power: fixed(r.w_power, 0),
            power_eff: fixed(r.power_eff, 1),
        }
    }
}

/// Bold only when writing to a terminal; files get plain text
fn heading(text: &str, styled: bool) -> String {
    if styled {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Activities as a terminal table
pub fn write_activity_table<W: Write>(
    rows: &[ActivityRecord],
    styled: bool,
    mut writer: W,
) -> Result<(), ExportError> {
    writeln!(writer, "{}", heading(&format!("{} activities", rows.len()), styled))?;

    if rows.is_empty() {
        return Ok(());
    }

    let table_rows: Vec<ActivityRow> = rows.iter().map(ActivityRow::from).collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    writeln!(writer, "{}", table)?;
    Ok(())
}

/// Per-type summaries as a terminal table
pub fn write_summary_table<W: Write>(
    summaries: &[TypeSummary],
    styled: bool,
    mut writer: W,
) -> Result<(), ExportError> {
    writeln!(writer, "{}", heading("Efficiency by activity type", styled))?;

    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            activity_type: s.activity_type.to_string(),
            activities: s.activities,
            outdoor: s.outdoor,
            mean_hr: s.hr.mean.map_or("-".to_string(), |m| format!("{:.1}", m)),
            mean_norm_hr: mean_with_spread(&s.norm_hr),
            speed_eff: mean_with_spread(&s.speed_eff),
            power_eff: mean_with_spread(&s.power_eff),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(writer, "{}", table)?;
    Ok(())
}
