//! Risk Engine - Request-level orchestration
//!
//! Feature filling → model → impact derivation → best-effort recording.
//! Owns the only RNG used after training (impact jitter and sample inputs),
//! seeded from config so a reproducible engine gives reproducible reports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants;
use crate::logic::config::EngineConfig;
use crate::logic::error::EngineResult;
use crate::logic::impact::{derive_impact, ImpactReport, RiskTier};
use crate::logic::model::{ModelOutput, ModelRegistry, ModelStatus, ModelVariant, Stores, TrainingReport};
use crate::logic::regions::Region;
use crate::logic::scenario::{self, FloodAssessment, RouteAssessment, Scenario};
use crate::logic::synthetic::samples;
use crate::logic::telemetry::{TelemetryStore, WeatherImpactRecord};

// ============================================================================
// FORECASTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodForecast {
    pub flood_probability: f64,
    pub flood_risk: RiskTier,
    pub logistics_impact: ImpactReport,
    pub features_used: Vec<String>,
    /// Fields that were missing or malformed and scored as 0
    pub defaulted_features: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteForecast {
    pub travel_time_minutes: f64,
    pub features_used: Vec<String>,
    pub defaulted_features: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

fn defaulted(output: &ModelOutput) -> Vec<String> {
    output.defaulted.iter().map(|name| name.to_string()).collect()
}

/// Catalog region named by the request, if any
fn request_region(raw: &Value) -> Option<Region> {
    raw.get("region").and_then(Value::as_str).and_then(Region::from_name)
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct RiskEngine {
    registry: Arc<ModelRegistry>,
    telemetry: Arc<dyn TelemetryStore>,
    rng: Mutex<ChaCha8Rng>,
}

impl RiskEngine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        telemetry: Arc<dyn TelemetryStore>,
        impact_seed: Option<u64>,
    ) -> Self {
        let rng = match impact_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            registry,
            telemetry,
            rng: Mutex::new(rng),
        }
    }

    /// Open stores, build the registry and load (or train) both models
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        log::info!("Starting risk engine v{} in {}", constants::APP_VERSION, config.data_dir.display());
        let stores = Stores::from_config(config)?;
        let registry = ModelRegistry::new(&config.training, &stores);
        registry.initialize()?;
        Ok(Self::new(Arc::new(registry), stores.telemetry, config.impact_seed))
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        self.registry.status()
    }

    pub fn train(&self, variant: ModelVariant) -> EngineResult<TrainingReport> {
        self.registry.train(variant)
    }

    // ------------------------------------------------------------------------
    // Single predictions
    // ------------------------------------------------------------------------

    pub fn predict_flood(&self, raw: &Value) -> EngineResult<FloodForecast> {
        let model = self.registry.flood();
        let output = model.predict(raw)?;
        let probability = output.value;
        let tier = RiskTier::from_probability(probability);

        let impact = {
            let mut rng = self.rng.lock();
            derive_impact(raw, probability, &mut *rng)
        };

        let forecast = FloodForecast {
            flood_probability: probability,
            flood_risk: tier,
            defaulted_features: defaulted(&output),
            features_used: output.feature_names,
            logistics_impact: impact,
            timestamp: Utc::now(),
        };

        if tier == RiskTier::High {
            self.record_weather_impact(raw, &forecast);
        }
        match serde_json::to_value(&forecast) {
            Ok(value) => model.record_prediction(raw, value),
            Err(e) => log::error!("Failed to serialize flood prediction: {}", e),
        }

        Ok(forecast)
    }

    pub fn predict_route(&self, raw: &Value) -> EngineResult<RouteForecast> {
        let model = self.registry.route();
        let output = model.predict(raw)?;

        let forecast = RouteForecast {
            travel_time_minutes: output.value,
            defaulted_features: defaulted(&output),
            features_used: output.feature_names,
            timestamp: Utc::now(),
        };

        model.record_prediction(raw, json!({ "travel_time_minutes": forecast.travel_time_minutes }));
        Ok(forecast)
    }

    fn record_weather_impact(&self, raw: &Value, forecast: &FloodForecast) {
        let impact = &forecast.logistics_impact;
        let region = request_region(raw)
            .map(|r| r.name())
            .unwrap_or(constants::DEFAULT_REGION_LABEL);

        let mut record =
            WeatherImpactRecord::flood(region, forecast.flood_probability, impact.risk_duration_hours);
        record.affected_routes = impact.affected_areas.len();
        record.delay_minutes = impact.route_delay_minutes;
        record.alternate_routes = json!({
            "availability": impact.alternate_routes.as_str(),
            "affected_areas": impact.affected_areas,
        });

        if let Err(e) = self.telemetry.record_weather_impact(&record) {
            log::error!("Failed to record weather impact for {}: {}", region, e);
        }
    }

    // ------------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------------

    /// Random flood requests, scored, highest probability first
    pub fn flood_samples(&self, count: usize) -> EngineResult<Vec<FloodAssessment>> {
        let inputs = {
            let mut rng = self.rng.lock();
            samples::flood_inputs(&mut *rng, count)
        };

        let mut assessed = inputs
            .into_iter()
            .map(|sample| {
                Ok(FloodAssessment {
                    region: sample.region,
                    prediction: self.predict_flood(&sample.features)?,
                    input: sample.features,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        assessed.sort_by(|a, b| {
            b.prediction
                .flood_probability
                .total_cmp(&a.prediction.flood_probability)
        });
        log::info!("Generated {} flood prediction samples", assessed.len());
        Ok(assessed)
    }

    /// Random route requests, scored, longest travel time first
    pub fn route_samples(&self, count: usize) -> EngineResult<Vec<RouteAssessment>> {
        let inputs = {
            let mut rng = self.rng.lock();
            samples::route_inputs(&mut *rng, count)
        };

        let mut assessed = inputs
            .into_iter()
            .map(|sample| {
                Ok(RouteAssessment {
                    region: sample.region,
                    time_period: sample.time_period,
                    prediction: self.predict_route(&sample.features)?,
                    input: sample.features,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        assessed.sort_by(|a, b| {
            b.prediction
                .travel_time_minutes
                .total_cmp(&a.prediction.travel_time_minutes)
        });
        log::info!("Generated {} route optimization samples", assessed.len());
        Ok(assessed)
    }

    /// Fused per-region scenarios from fresh sample batches
    pub fn scenarios(&self, count: usize) -> EngineResult<Vec<Scenario>> {
        let floods = self.flood_samples(count * 2)?;
        let routes = self.route_samples(count * 4)?;
        let scenarios = scenario::build_scenarios(&floods, &routes, count, Utc::now());
        log::info!("Generated {} combined scenarios", scenarios.len());
        Ok(scenarios)
    }
}

// ============================================================================
// TESTS
// ============================================================================
