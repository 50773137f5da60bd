//! Integration Tests for the Feature Contract
//!
//! Both schemas must behave identically under the default-fill rules.

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{FeatureSchema, FLOOD_SCHEMA, ROUTE_SCHEMA};
    use crate::logic::model::ModelVariant;
    use serde_json::json;

    /// Missing everything → all zeros in canonical order
    #[test]
    fn test_fill_missing_all_for_every_variant() {
        for variant in [ModelVariant::FloodRisk, ModelVariant::RouteTime] {
            let schema = FeatureSchema::for_variant(variant);
            let filled = schema.fill(&json!({}));

            assert_eq!(filled.vector.len(), schema.len());
            assert!(filled.vector.as_slice().iter().all(|v| *v == 0.0));
            assert_eq!(filled.defaulted, schema.names.to_vec());
            assert_eq!(filled.vector.variant, variant);
        }
    }

    /// Complete input → nothing defaulted, values untouched
    #[test]
    fn test_complete_flood_input() {
        let raw = json!({
            "rainfall_mm_24h": 75, "rainfall_mm_72h": 180, "river_level_m": 3.2,
            "soil_moisture": 0.85, "elevation_m": 8, "distance_to_river_km": 0.8,
            "drainage_capacity": 0.3, "temperature_c": 18, "wind_speed_kmh": 35,
            "impervious_surface_pct": 75
        });
        let filled = FLOOD_SCHEMA.fill(&raw);

        assert!(filled.is_complete());
        assert_eq!(
            filled.vector.values,
            vec![75.0, 180.0, 3.2, 0.85, 18.0, 35.0, 8.0, 0.8, 75.0, 0.3]
        );
    }

    /// Flood input handed to the route schema only keeps shared names
    #[test]
    fn test_cross_schema_input_is_mostly_defaulted() {
        let raw = json!({ "rainfall_mm_24h": 10, "temperature": 21 });
        let filled = ROUTE_SCHEMA.fill(&raw);

        assert_eq!(filled.vector.get_by_name("temperature"), Some(21.0));
        assert_eq!(filled.defaulted.len(), ROUTE_SCHEMA.len() - 1);
    }
}
