use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored training row: raw feature mapping plus its label
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    /// Raw mapping, passed through the feature contract on load
    pub features: Value,
    pub label: f64,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl TrainingRecord {
    pub fn new(features: Value, label: f64) -> Self {
        Self {
            features,
            label,
            recorded_at: None,
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.recorded_at = Some(time);
        self
    }
}
