//! Model Variants
//!
//! `ModelVariant` names the two prediction tasks. `ModelSpec` is the
//! capability interface the generic lifecycle is parameterized by:
//! feature schema, synthetic generator and estimator adapter.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::estimator::{ScoringError, ScoringModel};
use super::logistic::LogisticClassifier;
use super::peak_hour::PeakHourRegressor;
use crate::logic::dataset::Dataset;
use crate::logic::features::FeatureSchema;
use crate::logic::synthetic;

// ============================================================================
// MODEL VARIANT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Binary flood classifier, output is P(flood)
    FloodRisk,
    /// Travel-time regressor, output is minutes
    RouteTime,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::FloodRisk, ModelVariant::RouteTime];

    /// Stable key used for artifacts and stored rows
    pub fn slug(&self) -> &'static str {
        match self {
            ModelVariant::FloodRisk => "flood_prediction",
            ModelVariant::RouteTime => "route_optimization",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelVariant::FloodRisk => "Western Sydney Flood Prediction",
            ModelVariant::RouteTime => "Parramatta Route Optimization",
        }
    }

    /// Category used by the model catalog and prediction records
    pub fn prediction_type(&self) -> &'static str {
        match self {
            ModelVariant::FloodRisk => "weather",
            ModelVariant::RouteTime => "routing",
        }
    }

    /// Key of the label inside stored training rows
    pub fn label_name(&self) -> &'static str {
        match self {
            ModelVariant::FloodRisk => "flood_risk",
            ModelVariant::RouteTime => "travel_time_minutes",
        }
    }

    /// Confidence attached to persisted predictions (historical accuracy)
    pub fn reported_confidence(&self) -> f64 {
        match self {
            ModelVariant::FloodRisk => 0.942,
            ModelVariant::RouteTime => 0.89,
        }
    }

    /// Parse user-facing names: "flood", "route", slugs or snake_case names
    pub fn from_name(name: &str) -> Option<ModelVariant> {
        match name.trim().to_lowercase().as_str() {
            "flood" | "flood_risk" | "flood_prediction" => Some(ModelVariant::FloodRisk),
            "route" | "route_time" | "route_optimization" => Some(ModelVariant::RouteTime),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

// ============================================================================
// MODEL SPEC (capability interface)
// ============================================================================

/// Everything the lifecycle needs to know about one variant
pub trait ModelSpec: Send + Sync + 'static {
    type Estimator: ScoringModel;

    const VARIANT: ModelVariant;

    fn schema() -> &'static FeatureSchema {
        FeatureSchema::for_variant(Self::VARIANT)
    }

    /// Labeled training set used when no history exists
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Dataset;

    /// Fresh, unfitted estimator
    fn estimator() -> Self::Estimator;

    /// Scalar model output for one canonical feature row
    fn output(estimator: &Self::Estimator, row: &[f64]) -> Result<f64, ScoringError>;
}

/// Flood risk classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodRisk;

impl ModelSpec for FloodRisk {
    type Estimator = LogisticClassifier;

    const VARIANT: ModelVariant = ModelVariant::FloodRisk;

    fn synthesize<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Dataset {
        synthetic::flood::generate(rng, samples)
    }

    fn estimator() -> LogisticClassifier {
        LogisticClassifier::default()
    }

    /// Positive-class probability
    fn output(estimator: &LogisticClassifier, row: &[f64]) -> Result<f64, ScoringError> {
        estimator.predict_proba(row).map(|[_, flood]| flood)
    }
}

/// Route travel-time regressor
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTime;

impl ModelSpec for RouteTime {
    type Estimator = PeakHourRegressor;

    const VARIANT: ModelVariant = ModelVariant::RouteTime;

    fn synthesize<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Dataset {
        synthetic::route::generate(rng, samples)
    }

    fn estimator() -> PeakHourRegressor {
        PeakHourRegressor::default()
    }

    /// Minutes, never negative. Overflow on extreme inputs is an error.
    fn output(estimator: &PeakHourRegressor, row: &[f64]) -> Result<f64, ScoringError> {
        let minutes = estimator.predict(row)?;
        if !minutes.is_finite() {
            return Err(ScoringError::NonFinite);
        }
        Ok(minutes.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(ModelVariant::from_name("flood"), Some(ModelVariant::FloodRisk));
        assert_eq!(ModelVariant::from_name(" Route "), Some(ModelVariant::RouteTime));
        assert_eq!(ModelVariant::from_name("route_optimization"), Some(ModelVariant::RouteTime));
        assert_eq!(ModelVariant::from_name("traffic"), None);
    }

    #[test]
    fn test_schema_matches_variant() {
        assert_eq!(FloodRisk::schema().variant, ModelVariant::FloodRisk);
        assert_eq!(RouteTime::schema().variant, ModelVariant::RouteTime);
    }

    #[test]
    fn test_route_hour_column_is_time_of_day() {
        assert_eq!(RouteTime::schema().index_of("time_of_day"), Some(RouteTime::estimator().hour_column));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ModelVariant::RouteTime).unwrap();
        assert_eq!(json, "\"route_time\"");
    }
}
