use serde::{Deserialize, Serialize};

use crate::measure::Measure;
use crate::models::ActivityTable;

/// How many rows ended up with each efficiency figure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub speed_eff_rows: usize,
    pub power_eff_rows: usize,
    /// Rows whose power efficiency was dropped for estimated power
    pub power_eff_suppressed: usize,
}

/// Speed and weighted power per normalized heart-rate unit
///
/// Power efficiency is only kept for rows whose power came from a device sensor.
pub fn derive_efficiency(table: ActivityTable) -> (ActivityTable, EfficiencyReport) {
    let mut report = EfficiencyReport::default();
    let mut table = table;

    for record in table.iter_mut() {
        record.speed_eff = record.speed / record.norm_hr;
        record.power_eff = record.w_power / record.norm_hr;

        if !record.has_device_power() {
            if record.power_eff.is_present() {
                report.power_eff_suppressed += 1;
            }
            record.power_eff = Measure::MISSING;
        }

        report.speed_eff_rows += usize::from(record.speed_eff.is_present());
        report.power_eff_rows += usize::from(record.power_eff.is_present());
    }

    tracing::debug!(
        speed_eff = report.speed_eff_rows,
        power_eff = report.power_eff_rows,
        suppressed = report.power_eff_suppressed,
        "Derived efficiency ratios"
    );

    (table, report)
}
