//! Pipeline orchestration
//!
//! Stages, each taking the table by value and handing back the updated table:
//! 1. Load - parse the fixed-schema export
//! 2. Normalize - device power, outdoor flag, type remap, sort newest first
//! 3. Scrub - discard implausible readings
//! 4. Heart rate - per-type normalized heart rate
//! 5. Efficiency - speed and power per normalized heart-rate unit

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use crate::config::AnalysisConfig;
use crate::efficiency::{derive_efficiency, EfficiencyReport};
use crate::error::Result;
use crate::heart_rate::{derive_norm_hr, HeartRateBaselines};
use crate::import::load_activities;
use crate::models::ActivityTable;
use crate::normalize::{normalize_fields, NormalizeReport};
use crate::scrub::{scrub, ScrubReport};

/// What each stage did to the table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub rows: usize,
    pub normalize: NormalizeReport,
    pub scrub: ScrubReport,
    pub baselines: HeartRateBaselines,
    pub efficiency: EfficiencyReport,
}

/// Transformed table together with its stage report
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: ActivityTable,
    pub report: PipelineReport,
}

/// Runs the activity transformation with one configuration
#[derive(Debug, Clone, Default)]
pub struct ActivityPipeline {
    config: AnalysisConfig,
}

impl ActivityPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured export and transform it
    pub fn run(&self) -> Result<PipelineOutput> {
        self.run_file(&self.config.input.path)
    }

    /// Load an export from `path` and transform it
    pub fn run_file(&self, path: &Path) -> Result<PipelineOutput> {
        let span = tracing::info_span!("pipeline", path = %path.display());
        let _enter = span.enter();

        let table = load_activities(path)?;
        Ok(self.transform(table))
    }

    /// Apply every stage after load to an already loaded table
    pub fn transform(&self, table: ActivityTable) -> PipelineOutput {
        let started = Instant::now();
        let rows = table.len();

        let (table, normalize) = normalize_fields(table);
        let (table, scrub) = scrub(table, &self.config.scrub);
        let (table, baselines) = derive_norm_hr(table, self.config.normalization.resting_hr);
        let (table, efficiency) = derive_efficiency(table);

        tracing::info!(
            rows,
            groups = baselines.len(),
            scrubbed = scrub.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Activity table transformed"
        );

        PipelineOutput {
            table,
            report: PipelineReport {
                rows,
                normalize,
                scrub,
                baselines,
                efficiency,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Measure;
    use crate::models::test_support::record;
    use crate::models::ActivityType;

    #[test]
    fn test_run_scenario() {
        let mut bad_run = record(1, "Run", 1);
        bad_run.hr = Measure::new(90.0);
        bad_run.speed = Measure::new(6.0);
        bad_run.w_power = Measure::new(180.0);
        bad_run.device_power = Some(false);
        bad_run.trainer = Some(false);

        let mut good_run = record(2, "Run", 2);
        good_run.hr = Measure::new(150.0);
        good_run.speed = Measure::new(3.0);

        let output = ActivityPipeline::default()
            .transform(ActivityTable::new(vec![bad_run, good_run]));

        let row = output.table.find_by_id(1).unwrap();
        assert!(row.speed.is_missing());
        assert!(row.hr.is_missing());
        assert_eq!(row.outdoor, Some(true));
        assert!(row.norm_hr.is_missing());
        assert!(row.power_eff.is_missing());

        let good = output.table.find_by_id(2).unwrap();
        assert_eq!(good.norm_hr.value(), Some(1.0));
        assert_eq!(good.speed_eff.value(), Some(3.0));

        assert_eq!(output.report.rows, 2);
        assert_eq!(output.report.scrub.run_speed_cleared, 1);
        assert_eq!(output.report.baselines[&ActivityType::Run].samples, 1);
    }

    #[test]
    fn test_virtual_rides_share_ride_baseline() {
        let mut outside = record(1, "Ride", 1);
        outside.hr = Measure::new(120.0);
        let mut zwift = record(2, "VirtualRide", 2);
        zwift.hr = Measure::new(140.0);

        let output = ActivityPipeline::default()
            .transform(ActivityTable::new(vec![outside, zwift]));

        assert_eq!(output.report.baselines.len(), 1);
        assert_eq!(
            output.report.baselines[&ActivityType::Ride].mean_hr,
            Some(130.0)
        );
        assert_eq!(output.table.records()[0].id, 2);
    }

    #[test]
    fn test_resting_hr_is_configurable() {
        let mut config = AnalysisConfig::default();
        config.normalization.resting_hr = 50.0;

        let mut ride = record(1, "Ride", 1);
        ride.hr = Measure::new(120.0);
        let mut other = record(2, "Ride", 2);
        other.hr = Measure::new(140.0);

        let output = ActivityPipeline::new(config)
            .transform(ActivityTable::new(vec![ride, other]));

        let norm = output.table.find_by_id(1).unwrap().norm_hr.value().unwrap();
        assert!((norm - 70.0 / 80.0).abs() < 1e-9);
    }
}
