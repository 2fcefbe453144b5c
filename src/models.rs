use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::measure::Measure;

/// Activity categories as written by the Strava exporter
///
/// `VirtualRide` and `WeightTraining` only exist before field normalization;
/// afterwards they are folded into their parent category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ActivityType {
    Hike,
    NordicSki,
    Ride,
    Run,
    Swim,
    Walk,
    Workout,
    VirtualRide,
    WeightTraining,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Hike => "Hike",
            ActivityType::NordicSki => "NordicSki",
            ActivityType::Ride => "Ride",
            ActivityType::Run => "Run",
            ActivityType::Swim => "Swim",
            ActivityType::Walk => "Walk",
            ActivityType::Workout => "Workout",
            ActivityType::VirtualRide => "VirtualRide",
            ActivityType::WeightTraining => "WeightTraining",
            ActivityType::Other(name) => name,
        }
    }

    /// Parent category used for grouping
    pub fn parent(&self) -> ActivityType {
        match self {
            ActivityType::VirtualRide => ActivityType::Ride,
            ActivityType::WeightTraining => ActivityType::Workout,
            other => other.clone(),
        }
    }

    /// True for subtypes that are folded into a parent category
    pub fn is_subtype(&self) -> bool {
        matches!(self, ActivityType::VirtualRide | ActivityType::WeightTraining)
    }
}

impl FromStr for ActivityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Hike" => ActivityType::Hike,
            "NordicSki" => ActivityType::NordicSki,
            "Ride" => ActivityType::Ride,
            "Run" => ActivityType::Run,
            "Swim" => ActivityType::Swim,
            "Walk" => ActivityType::Walk,
            "Workout" => ActivityType::Workout,
            "VirtualRide" => ActivityType::VirtualRide,
            "WeightTraining" => ActivityType::WeightTraining,
            other => ActivityType::Other(other.to_string()),
        })
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(activity_type) => activity_type,
            Err(never) => match never {},
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exercise session from the activity export, plus its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Strava activity identifier
    pub id: i64,

    /// Activity category
    #[serde(rename = "type")]
    pub activity_type: ActivityType,

    /// Start time, the table's row key
    pub datetime: DateTime<Utc>,

    /// Moving time in seconds
    pub moving_time: Measure,

    /// Elapsed time in seconds
    pub elapsed_time: Measure,

    /// Distance in meters
    pub distance: Measure,

    /// Average speed in meters per second
    pub speed: Measure,

    /// Average power in watts
    pub power: Measure,

    /// Weighted average power in watts
    pub w_power: Measure,

    /// Whether power came from a physical sensor; missing until normalized
    pub device_power: Option<bool>,

    /// Average heart rate in beats per minute
    pub hr: Measure,

    /// Average cadence
    pub cadence: Measure,

    /// Total elevation gain in meters
    pub elevation_gain: Measure,

    /// Indoor trainer flag
    pub trainer: Option<bool>,

    /// Not on a trainer and not a virtual ride (derived)
    pub outdoor: Option<bool>,

    /// Heart rate relative to resting rate and the type's mean (derived)
    pub norm_hr: Measure,

    /// Speed per normalized heart-rate unit (derived)
    pub speed_eff: Measure,

    /// Weighted power per normalized heart-rate unit (derived)
    pub power_eff: Measure,
}

impl ActivityRecord {
    /// Power reading came from a device sensor; missing counts as false
    pub fn has_device_power(&self) -> bool {
        self.device_power.unwrap_or(false)
    }

    pub fn is_trainer(&self) -> bool {
        self.trainer.unwrap_or(false)
    }

    /// Start time in the exporter's form, e.g. `2020-06-02T06:00:00.000Z`
    pub fn timestamp(&self) -> String {
        self.datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// In-memory activity table, one record per row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTable {
    records: Vec<ActivityRecord>,
}

impl ActivityTable {
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActivityRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ActivityRecord> {
        self.records.iter_mut()
    }

    pub fn into_records(self) -> Vec<ActivityRecord> {
        self.records
    }

    /// First row carrying the given id
    pub fn find_by_id(&self, id: i64) -> Option<&ActivityRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Earliest activity by start time
    pub fn oldest(&self) -> Option<&ActivityRecord> {
        self.records.iter().min_by_key(|r| r.datetime)
    }

    /// Most recent activity by start time
    pub fn newest(&self) -> Option<&ActivityRecord> {
        self.records.iter().max_by_key(|r| r.datetime)
    }

    /// Sort rows by start time, most recent first
    pub fn sort_by_datetime_desc(&mut self) {
        self.records.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    }

    /// Row indices partitioned by activity type
    pub fn group_by_type(&self) -> BTreeMap<ActivityType, Vec<usize>> {
        let mut groups: BTreeMap<ActivityType, Vec<usize>> = BTreeMap::new();
        for (index, record) in self.records.iter().enumerate() {
            groups
                .entry(record.activity_type.clone())
                .or_default()
                .push(index);
        }
        groups
    }
}

impl IntoIterator for ActivityTable {
    type Item = ActivityRecord;
    type IntoIter = std::vec::IntoIter<ActivityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<ActivityRecord> for ActivityTable {
    fn from_iter<I: IntoIterator<Item = ActivityRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// Bare record with only identity fields populated
    pub fn record(id: i64, activity_type: &str, day: u32) -> ActivityRecord {
        ActivityRecord {
            id,
            activity_type: activity_type.parse().unwrap(),
            datetime: Utc.with_ymd_and_hms(2020, 6, day, 8, 0, 0).unwrap(),
            moving_time: Measure::new(3600.0),
            elapsed_time: Measure::new(3700.0),
            distance: Measure::new(10000.0),
            speed: Measure::MISSING,
            power: Measure::MISSING,
            w_power: Measure::MISSING,
            device_power: None,
            hr: Measure::MISSING,
            cadence: Measure::MISSING,
            elevation_gain: Measure::MISSING,
            trainer: Some(false),
            outdoor: None,
            norm_hr: Measure::MISSING,
            speed_eff: Measure::MISSING,
            power_eff: Measure::MISSING,
        }
    }
}
