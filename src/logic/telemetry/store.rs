//! Store seams and the records that flow through them

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::logic::dataset::TrainingRecord;
use crate::logic::model::ModelVariant;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store connection unavailable")]
    Unavailable,
}

// ============================================================================
// RECORDS
// ============================================================================

/// One feature and its normalized weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub weight: f64,
}

/// A served prediction with its full post-processed output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub variant: ModelVariant,
    pub model_name: String,
    pub prediction_type: String,
    pub confidence: f64,
    pub input: Value,
    pub output: Value,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(variant: ModelVariant, input: Value, output: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            model_name: variant.display_name().to_string(),
            prediction_type: variant.prediction_type().to_string(),
            confidence: variant.reported_confidence(),
            input,
            output,
            created_at: Utc::now(),
        }
    }
}

/// Disruption window recorded for high-risk flood predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpactRecord {
    pub event_type: String,
    pub region: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Probability scaled to 0-10
    pub impact_score: f64,
    pub affected_routes: usize,
    pub delay_minutes: i64,
    /// Alternate-route availability plus affected areas
    pub alternate_routes: Value,
}

impl WeatherImpactRecord {
    pub fn flood(region: impl Into<String>, probability: f64, duration_hours: i64) -> Self {
        let start_time = Utc::now();
        Self {
            event_type: "flood".to_string(),
            region: region.into(),
            start_time,
            end_time: start_time + Duration::hours(duration_hours.max(0)),
            impact_score: probability * 10.0,
            affected_routes: 0,
            delay_minutes: 0,
            alternate_routes: Value::Null,
        }
    }
}

// ============================================================================
// STORE TRAITS
// ============================================================================

/// Source of labeled history for training
pub trait HistoricalStore: Send + Sync {
    /// Newest first; empty when nothing is stored
    fn query(&self, variant: ModelVariant) -> Result<Vec<TrainingRecord>, StoreError>;
}

/// Best-effort sink for predictions and model metadata
pub trait TelemetryStore: Send + Sync {
    fn record_prediction(&self, record: &PredictionRecord) -> Result<(), StoreError>;

    fn record_feature_importance(
        &self,
        variant: ModelVariant,
        importances: &[FeatureImportance],
    ) -> Result<(), StoreError>;

    fn record_weather_impact(&self, record: &WeatherImpactRecord) -> Result<(), StoreError>;
}

/// Telemetry disabled: accepts everything, stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl HistoricalStore for NullStore {
    fn query(&self, _variant: ModelVariant) -> Result<Vec<TrainingRecord>, StoreError> {
        Ok(Vec::new())
    }
}

impl TelemetryStore for NullStore {
    fn record_prediction(&self, _record: &PredictionRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn record_feature_importance(
        &self,
        _variant: ModelVariant,
        _importances: &[FeatureImportance],
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn record_weather_impact(&self, _record: &WeatherImpactRecord) -> Result<(), StoreError> {
        Ok(())
    }
}
