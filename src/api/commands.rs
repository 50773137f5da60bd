//! Commands - Caller-facing API over the risk engine
//!
//! Every command returns `Result<T, String>`; engine errors are flattened to
//! their display text at this boundary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::dataset::export::{
    write_json_array, FLOOD_EXPORT_FILE, ROUTE_EXPORT_FILE, SCENARIO_EXPORT_FILE,
};
use crate::logic::engine::{FloodForecast, RiskEngine, RouteForecast};
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::model::{ModelStatus, ModelVariant, TrainingReport};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction plus the time it was served
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEnvelope<T> {
    pub prediction: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> PredictionEnvelope<T> {
    fn now(prediction: T) -> Self {
        Self {
            prediction,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub status: String,
    /// Model slug, e.g. `flood_prediction`
    pub model: String,
    pub training_results: TrainingReport,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub models: Vec<ModelStatus>,
}

/// How many of each sample kind to export, and where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRequest {
    pub flood: usize,
    pub route: usize,
    pub scenarios: usize,
    pub output_dir: PathBuf,
}

/// Files written by `generate_samples`; `None` when the count was zero
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleExport {
    pub flood: Option<PathBuf>,
    pub route: Option<PathBuf>,
    pub scenarios: Option<PathBuf>,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn predict_flood(engine: &RiskEngine, raw: &Value) -> Result<PredictionEnvelope<FloodForecast>, String> {
    engine
        .predict_flood(raw)
        .map(PredictionEnvelope::now)
        .map_err(|e| e.to_string())
}

pub fn predict_route(engine: &RiskEngine, raw: &Value) -> Result<PredictionEnvelope<RouteForecast>, String> {
    engine
        .predict_route(raw)
        .map(PredictionEnvelope::now)
        .map_err(|e| e.to_string())
}

/// Train by name: `flood` / `route` (or the model slug)
pub fn train_model(engine: &RiskEngine, model_type: &str) -> Result<TrainResponse, String> {
    train_inner(engine, model_type).map_err(|e| e.to_string())
}

fn train_inner(engine: &RiskEngine, model_type: &str) -> EngineResult<TrainResponse> {
    let variant = ModelVariant::from_name(model_type)
        .ok_or_else(|| EngineError::UnknownModel(model_type.to_string()))?;
    let report = engine.train(variant)?;

    Ok(TrainResponse {
        status: "success".to_string(),
        model: variant.slug().to_string(),
        training_results: report,
        timestamp: Utc::now(),
    })
}

/// Generate and export sample predictions and scenarios
pub fn generate_samples(engine: &RiskEngine, request: &SampleRequest) -> Result<SampleExport, String> {
    samples_inner(engine, request).map_err(|e| e.to_string())
}

fn samples_inner(engine: &RiskEngine, request: &SampleRequest) -> EngineResult<SampleExport> {
    let dir = request.output_dir.as_path();
    let mut export = SampleExport::default();

    if request.flood > 0 {
        let samples = engine.flood_samples(request.flood)?;
        export.flood = Some(write_json_array(dir, FLOOD_EXPORT_FILE, &samples)?);
    }
    if request.route > 0 {
        let samples = engine.route_samples(request.route)?;
        export.route = Some(write_json_array(dir, ROUTE_EXPORT_FILE, &samples)?);
    }
    if request.scenarios > 0 {
        let scenarios = engine.scenarios(request.scenarios)?;
        export.scenarios = Some(write_json_array(dir, SCENARIO_EXPORT_FILE, &scenarios)?);
    }

    log::info!("Sample data generation complete");
    Ok(export)
}

pub fn get_status(engine: &RiskEngine) -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        models: engine.status(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::logic::config::TrainingConfig;
    use crate::logic::model::{MemoryArtifactStore, ModelRegistry, Stores};

    fn engine() -> RiskEngine {
        let stores = Stores::detached(Arc::new(MemoryArtifactStore::new()));
        let registry = ModelRegistry::new(&TrainingConfig::default(), &stores);
        RiskEngine::new(Arc::new(registry), stores.telemetry, Some(42))
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = train_model(&engine(), "weather").unwrap_err();
        assert_eq!(err, "unknown model type: weather");
    }

    #[test]
    fn test_train_by_short_name() {
        let response = train_model(&engine(), "route").unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(response.model, "route_optimization");
        assert_eq!(response.training_results.metrics.train_samples, 800);
    }

    #[test]
    fn test_predict_envelope() {
        let engine = engine();
        let envelope = predict_route(&engine, &json!({"distance_km": 10})).unwrap();
        assert!(envelope.prediction.travel_time_minutes >= 0.0);

        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("prediction").is_some());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_generate_samples_writes_requested_files() {
        let dir = tempfile::tempdir().unwrap();
        let request = SampleRequest {
            flood: 4,
            route: 0,
            scenarios: 2,
            output_dir: dir.path().join("out"),
        };

        let export = generate_samples(&engine(), &request).unwrap();
        assert!(export.route.is_none());

        let flood_path = export.flood.unwrap();
        let written: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&flood_path).unwrap()).unwrap();
        assert_eq!(written.len(), 4);
        assert!(written[0]["input"]["region"].is_string());
        assert!(written[0]["prediction"]["flood_probability"].is_number());

        let scenario_path = export.scenarios.unwrap();
        assert!(scenario_path.ends_with(SCENARIO_EXPORT_FILE));
        assert!(!dir.path().join("out").join(ROUTE_EXPORT_FILE).exists());
    }

    #[test]
    fn test_status_lists_both_models() {
        let status = get_status(&engine());
        assert_eq!(status.status, "healthy");
        assert_eq!(status.models.len(), 2);
    }
}
