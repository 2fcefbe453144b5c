//! Field normalization stage
//!
//! Fills the power-source flag, computes `outdoor` from the raw activity type,
//! folds subtypes into their parent category and orders the table newest first.

use serde::{Deserialize, Serialize};

use crate::models::{ActivityTable, ActivityType};

/// Counts of what field normalization changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Rows whose missing `device_power` became false
    pub device_power_filled: usize,
    /// Rows remapped from VirtualRide to Ride
    pub virtual_rides_remapped: usize,
    /// Rows remapped from WeightTraining to Workout
    pub weight_training_remapped: usize,
}

/// Normalize fields of every row and sort the table by start time, descending
pub fn normalize_fields(table: ActivityTable) -> (ActivityTable, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut table = table;

    for record in table.iter_mut() {
        if record.device_power.is_none() {
            record.device_power = Some(false);
            report.device_power_filled += 1;
        }

        // must see the type before the remap below
        record.outdoor =
            Some(!record.is_trainer() && record.activity_type != ActivityType::VirtualRide);

        match record.activity_type {
            ActivityType::VirtualRide => report.virtual_rides_remapped += 1,
            ActivityType::WeightTraining => report.weight_training_remapped += 1,
            _ => {}
        }
        record.activity_type = record.activity_type.parent();
    }

    table.sort_by_datetime_desc();

    tracing::debug!(
        device_power_filled = report.device_power_filled,
        virtual_rides = report.virtual_rides_remapped,
        weight_training = report.weight_training_remapped,
        "Normalized activity fields"
    );

    (table, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::record;

    #[test]
    fn test_device_power_defaults_to_false() {
        let mut with_power = record(1, "Ride", 1);
        with_power.device_power = Some(true);
        let table = ActivityTable::new(vec![with_power, record(2, "Ride", 2)]);

        let (table, report) = normalize_fields(table);

        assert_eq!(report.device_power_filled, 1);
        assert_eq!(table.find_by_id(1).unwrap().device_power, Some(true));
        assert_eq!(table.find_by_id(2).unwrap().device_power, Some(false));
    }

    #[test]
    fn test_outdoor_uses_type_before_remap() {
        let mut trainer_ride = record(2, "Ride", 2);
        trainer_ride.trainer = Some(true);
        let table = ActivityTable::new(vec![
            record(1, "VirtualRide", 1),
            trainer_ride,
            record(3, "Ride", 3),
            record(4, "WeightTraining", 4),
        ]);

        let (table, report) = normalize_fields(table);

        let virtual_ride = table.find_by_id(1).unwrap();
        assert_eq!(virtual_ride.outdoor, Some(false));
        assert_eq!(virtual_ride.activity_type, ActivityType::Ride);
        assert_eq!(table.find_by_id(2).unwrap().outdoor, Some(false));
        assert_eq!(table.find_by_id(3).unwrap().outdoor, Some(true));

        let weights = table.find_by_id(4).unwrap();
        assert_eq!(weights.activity_type, ActivityType::Workout);
        assert_eq!(weights.outdoor, Some(true));

        assert_eq!(report.virtual_rides_remapped, 1);
        assert_eq!(report.weight_training_remapped, 1);
        assert!(table.iter().all(|r| !r.activity_type.is_subtype()));
    }

    #[test]
    fn test_missing_trainer_counts_as_outdoor() {
        let mut unknown = record(1, "Run", 1);
        unknown.trainer = None;

        let (table, _) = normalize_fields(ActivityTable::new(vec![unknown]));
        assert_eq!(table.records()[0].outdoor, Some(true));
    }

    #[test]
    fn test_sorted_newest_first() {
        let table = ActivityTable::new(vec![
            record(1, "Run", 3),
            record(2, "Run", 9),
            record(3, "Run", 1),
            record(4, "Run", 5),
        ]);

        let (table, _) = normalize_fields(table);

        let records = table.records();
        assert!(records.windows(2).all(|w| w[0].datetime > w[1].datetime));
        assert_eq!(records[0].id, 2);
    }
}
