use chrono::{DateTime, SubsecRound, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::util::round_to_tenth;

/// Route label attached to every run
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Category {
    #[default]
    Forest,
    Road,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Forest, Category::Road];

    /// Next category in declaration order, wrapping around
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

/// What a stopped stopwatch hands back before a category is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishedRun {
    pub duration_seconds: f64,
    pub finished_at: DateTime<Utc>,
}

impl FinishedRun {
    pub fn new(elapsed_ms: u64, finished_at: DateTime<Utc>) -> Self {
        Self {
            duration_seconds: round_to_tenth(elapsed_ms as f64 / 1000.0),
            finished_at: finished_at.trunc_subsecs(3),
        }
    }
}

/// A completed, persisted run.
///
/// Field names on disk are `date`, `duration` and `routeType`; existing data
/// files are written in that shape and must keep reading back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord {
    #[serde(rename = "date", with = "iso8601")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(rename = "routeType")]
    pub category: Category,
}

impl TimerRecord {
    pub fn new(timestamp: DateTime<Utc>, duration_seconds: f64, category: Category) -> Self {
        Self {
            timestamp,
            duration_seconds: round_to_tenth(duration_seconds.max(0.0)),
            category,
        }
    }

    pub fn from_run(run: FinishedRun, category: Category) -> Self {
        Self::new(run.finished_at, run.duration_seconds, category)
    }
}

mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
