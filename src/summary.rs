//! Per-type summary of a transformed activity table

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::measure::Measure;
use crate::models::{ActivityRecord, ActivityTable, ActivityType};

/// Mean and spread of one derived metric over the rows where it is present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl MetricStats {
    pub fn from_measures<I: IntoIterator<Item = Measure>>(values: I) -> Self {
        let values: Vec<f64> = values.into_iter().filter_map(Measure::value).collect();
        let finite = |v: f64| v.is_finite().then_some(v);

        Self {
            count: values.len(),
            mean: if values.is_empty() {
                None
            } else {
                finite(values.iter().mean())
            },
            // sample standard deviation, undefined below two values
            std_dev: if values.len() < 2 {
                None
            } else {
                finite(values.iter().std_dev())
            },
        }
    }
}

/// Summary of one activity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub activity_type: ActivityType,
    pub activities: usize,
    pub outdoor: usize,
    pub hr: MetricStats,
    pub norm_hr: MetricStats,
    pub speed_eff: MetricStats,
    pub power_eff: MetricStats,
}

impl TypeSummary {
    fn from_records(activity_type: ActivityType, records: &[&ActivityRecord]) -> Self {
        let stats = |field: fn(&ActivityRecord) -> Measure| {
            MetricStats::from_measures(records.iter().map(|r| field(*r)))
        };

        Self {
            activity_type,
            activities: records.len(),
            outdoor: records.iter().filter(|r| r.outdoor == Some(true)).count(),
            hr: stats(|r| r.hr),
            norm_hr: stats(|r| r.norm_hr),
            speed_eff: stats(|r| r.speed_eff),
            power_eff: stats(|r| r.power_eff),
        }
    }
}

/// Summarize every activity type present in the table, ordered by type
pub fn summarize(table: &ActivityTable) -> Vec<TypeSummary> {
    let mut groups: BTreeMap<ActivityType, Vec<&ActivityRecord>> = BTreeMap::new();
    for record in table.iter() {
        groups
            .entry(record.activity_type.clone())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|(activity_type, records)| TypeSummary::from_records(activity_type, &records))
        .collect()
}
