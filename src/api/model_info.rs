//! Model catalog - static description of the available models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureSchema;
use crate::logic::model::ModelVariant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    /// `weather` or `routing`
    #[serde(rename = "type")]
    pub model_type: String,
    pub description: String,
    /// Advertised accuracy, percent
    pub accuracy: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub available_models: Vec<ModelInfo>,
    pub timestamp: DateTime<Utc>,
}

fn describe(variant: ModelVariant) -> ModelInfo {
    let (description, accuracy) = match variant {
        ModelVariant::FloodRisk => ("Predicts flood risks in Western Sydney areas", 94.2),
        ModelVariant::RouteTime => ("Optimizes delivery routes in the Parramatta area", 89.2),
    };

    ModelInfo {
        name: variant.display_name().to_string(),
        model_type: variant.prediction_type().to_string(),
        description: description.to_string(),
        accuracy,
        features: FeatureSchema::for_variant(variant).owned_names(),
    }
}

/// All models, or only those of `model_type`
pub fn model_info(model_type: Option<&str>) -> ModelCatalog {
    let available_models = ModelVariant::ALL
        .iter()
        .map(|&v| describe(v))
        .filter(|info| model_type.map_or(true, |t| info.model_type == t))
        .collect();

    ModelCatalog {
        available_models,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_catalog() {
        let catalog = model_info(None);
        assert_eq!(catalog.available_models.len(), 2);
        assert_eq!(catalog.available_models[0].name, "Western Sydney Flood Prediction");
        assert_eq!(catalog.available_models[0].features[0], "rainfall_mm_24h");
        assert_eq!(catalog.available_models[1].features.len(), 10);
    }

    #[test]
    fn test_filter_by_type() {
        let routing = model_info(Some("routing"));
        assert_eq!(routing.available_models.len(), 1);
        assert_eq!(routing.available_models[0].name, "Parramatta Route Optimization");

        assert!(model_info(Some("traffic")).available_models.is_empty());
    }

    #[test]
    fn test_type_field_name() {
        let value = serde_json::to_value(model_info(Some("weather"))).unwrap();
        assert_eq!(value["available_models"][0]["type"], "weather");
        assert_eq!(value["available_models"][0]["accuracy"], 94.2);
    }
}
