//! Data-quality overrides
//!
//! Each rule nulls one field on every row matching its predicate. Rules run in a
//! fixed order: run speed, run heart rate, then the known-bad activity ids.

use serde::{Deserialize, Serialize};

use crate::config::ScrubSettings;
use crate::measure::Measure;
use crate::models::{ActivityTable, ActivityType};

/// Counts of readings discarded by each rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubReport {
    pub run_speed_cleared: usize,
    pub run_hr_cleared: usize,
    pub bad_id_hr_cleared: usize,
}

impl ScrubReport {
    pub fn total(&self) -> usize {
        self.run_speed_cleared + self.run_hr_cleared + self.bad_id_hr_cleared
    }
}

/// Apply every scrub rule to the table
pub fn scrub(table: ActivityTable, settings: &ScrubSettings) -> (ActivityTable, ScrubReport) {
    let mut report = ScrubReport::default();
    let mut table = table;

    for record in table.iter_mut() {
        if record.activity_type == ActivityType::Run && record.speed.gt(settings.run_max_speed) {
            tracing::debug!(
                id = record.id,
                speed = %record.speed,
                "Clearing implausible run speed"
            );
            record.speed = Measure::MISSING;
            report.run_speed_cleared += 1;
        }
    }

    for record in table.iter_mut() {
        if record.activity_type == ActivityType::Run && record.hr.lt(settings.run_min_hr) {
            tracing::debug!(id = record.id, hr = %record.hr, "Clearing implausible run heart rate");
            record.hr = Measure::MISSING;
            report.run_hr_cleared += 1;
        }
    }

    for &bad_id in &settings.bad_hr_activity_ids {
        let mut matched = false;
        for record in table.iter_mut().filter(|r| r.id == bad_id) {
            matched = true;
            if record.hr.is_present() {
                report.bad_id_hr_cleared += 1;
            }
            record.hr = Measure::MISSING;
        }
        if !matched {
            tracing::debug!(id = bad_id, "Known-bad activity not present in export");
        }
    }

    tracing::info!(
        run_speed = report.run_speed_cleared,
        run_hr = report.run_hr_cleared,
        bad_ids = report.bad_id_hr_cleared,
        "Scrubbed implausible readings"
    );

    (table, report)
}
