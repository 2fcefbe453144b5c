//! Normalized heart rate
//!
//! `norm_hr = (hr - resting) / (type_mean_hr - resting)`, computed in two passes:
//! first the mean heart rate of every activity type, then each row against the
//! mean of its own type. A type whose mean equals the resting rate, or that has
//! no heart-rate readings at all, yields missing `norm_hr` for all of its rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::measure::{mean_present, Measure};
use crate::models::{ActivityTable, ActivityType};

/// Mean heart rate of one activity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateBaseline {
    /// Mean of the present `hr` values, if any
    pub mean_hr: Option<f64>,
    /// Rows in the group
    pub rows: usize,
    /// Rows with a heart-rate reading
    pub samples: usize,
}

impl HeartRateBaseline {
    /// Denominator of the normalization; missing when it would be zero
    pub fn reserve(&self, resting_hr: f64) -> Measure {
        match self.mean_hr {
            Some(mean) if mean != resting_hr => Measure::new(mean - resting_hr),
            _ => Measure::MISSING,
        }
    }
}

/// Per-type baselines, keyed by activity type
pub type HeartRateBaselines = BTreeMap<ActivityType, HeartRateBaseline>;

/// First pass: mean heart rate of each activity type present in the table
pub fn baselines(table: &ActivityTable) -> HeartRateBaselines {
    table
        .group_by_type()
        .into_iter()
        .map(|(activity_type, indices)| {
            let readings: Vec<Measure> =
                indices.iter().map(|&i| table.records()[i].hr).collect();
            let baseline = HeartRateBaseline {
                mean_hr: mean_present(readings.iter().copied()),
                rows: indices.len(),
                samples: readings.iter().filter(|m| m.is_present()).count(),
            };
            (activity_type, baseline)
        })
        .collect()
}

/// Scale a heart rate against the resting rate and a group baseline
pub fn normalize(hr: Measure, baseline: &HeartRateBaseline, resting_hr: f64) -> Measure {
    (hr - resting_hr) / baseline.reserve(resting_hr)
}

/// Second pass: assign `norm_hr` to every row from its type's baseline
pub fn derive_norm_hr(
    table: ActivityTable,
    resting_hr: f64,
) -> (ActivityTable, HeartRateBaselines) {
    let baselines = baselines(&table);
    let mut table = table;

    for (activity_type, baseline) in &baselines {
        if baseline.reserve(resting_hr).is_missing() {
            tracing::warn!(
                activity_type = %activity_type,
                mean_hr = ?baseline.mean_hr,
                samples = baseline.samples,
                "Degenerate heart-rate baseline, norm_hr left missing for this type"
            );
        } else {
            tracing::debug!(
                activity_type = %activity_type,
                mean_hr = ?baseline.mean_hr,
                samples = baseline.samples,
                "Heart-rate baseline"
            );
        }
    }

    for record in table.iter_mut() {
        record.norm_hr = match baselines.get(&record.activity_type) {
            Some(baseline) => normalize(record.hr, baseline, resting_hr),
            None => Measure::MISSING,
        };
    }

    (table, baselines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::record;
    use proptest::prelude::*;

    fn with_hr(id: i64, activity_type: &str, hr: Option<f64>) -> crate::models::ActivityRecord {
        let mut r = record(id, activity_type, 1);
        r.hr = Measure::from(hr);
        r
    }

    fn assert_close(actual: Measure, expected: f64) {
        let value = actual.value().expect("norm_hr should be present");
        assert!((value - expected).abs() < 1e-3, "{} != {}", value, expected);
    }

    #[test]
    fn test_two_ride_example() {
        let table = ActivityTable::new(vec![
            with_hr(1, "Ride", Some(120.0)),
            with_hr(2, "Ride", Some(140.0)),
        ]);

        let (table, baselines) = derive_norm_hr(table, 60.0);

        assert_eq!(baselines[&ActivityType::Ride].mean_hr, Some(130.0));
        assert_close(table.find_by_id(1).unwrap().norm_hr, 0.857);
        assert_close(table.find_by_id(2).unwrap().norm_hr, 1.143);
    }

    #[test]
    fn test_groups_are_independent() {
        let table = ActivityTable::new(vec![
            with_hr(1, "Ride", Some(130.0)),
            with_hr(2, "Run", Some(160.0)),
            with_hr(3, "Run", Some(140.0)),
        ]);

        let (table, baselines) = derive_norm_hr(table, 60.0);

        assert_eq!(baselines.len(), 2);
        assert_close(table.find_by_id(1).unwrap().norm_hr, 1.0);
        assert_close(table.find_by_id(2).unwrap().norm_hr, 100.0 / 90.0);
        assert_close(table.find_by_id(3).unwrap().norm_hr, 80.0 / 90.0);
    }

    #[test]
    fn test_missing_hr_stays_missing_and_is_ignored_in_mean() {
        let table = ActivityTable::new(vec![
            with_hr(1, "Walk", Some(100.0)),
            with_hr(2, "Walk", None),
        ]);

        let (table, baselines) = derive_norm_hr(table, 60.0);

        let walk = &baselines[&ActivityType::Walk];
        assert_eq!(walk.mean_hr, Some(100.0));
        assert_eq!(walk.rows, 2);
        assert_eq!(walk.samples, 1);
        assert_close(table.find_by_id(1).unwrap().norm_hr, 1.0);
        assert!(table.find_by_id(2).unwrap().norm_hr.is_missing());
    }

    #[test]
    fn test_degenerate_groups() {
        let table = ActivityTable::new(vec![
            with_hr(1, "Swim", Some(60.0)),
            with_hr(2, "Hike", None),
        ]);

        let (table, baselines) = derive_norm_hr(table, 60.0);

        assert!(table.find_by_id(1).unwrap().norm_hr.is_missing());
        assert!(table.find_by_id(2).unwrap().norm_hr.is_missing());
        assert_eq!(baselines[&ActivityType::Hike].mean_hr, None);
    }

    proptest! {
        #[test]
        fn test_normalization_round_trips_to_group_mean(
            readings in prop::collection::vec(prop::option::of(70.0f64..200.0), 1..30)
        ) {
            let table: ActivityTable = readings
                .iter()
                .enumerate()
                .map(|(i, hr)| with_hr(i as i64, "Ride", *hr))
                .collect();

            let (table, baselines) = derive_norm_hr(table, 60.0);
            let baseline = &baselines[&ActivityType::Ride];

            if let Some(mean) = baseline.mean_hr {
                let reserve = mean - 60.0;
                prop_assume!(reserve.abs() > 1e-6);
                let restored = mean_present(table.iter().map(|r| r.norm_hr * reserve + 60.0));
                prop_assert!((restored.unwrap() - mean).abs() < 1e-6);
            } else {
                prop_assert!(table.iter().all(|r| r.norm_hr.is_missing()));
            }
        }
    }
}
