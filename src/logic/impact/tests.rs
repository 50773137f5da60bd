//! Tests for impact derivation

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use super::*;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[test]
fn test_tier_boundaries_are_exclusive() {
    assert_eq!(RiskTier::from_probability(0.71), RiskTier::High);
    assert_eq!(RiskTier::from_probability(0.7), RiskTier::Medium);
    assert_eq!(RiskTier::from_probability(0.69), RiskTier::Medium);
    assert_eq!(RiskTier::from_probability(0.41), RiskTier::Medium);
    assert_eq!(RiskTier::from_probability(0.4), RiskTier::Low);
    assert_eq!(RiskTier::from_probability(0.39), RiskTier::Low);
    assert_eq!(RiskTier::from_probability(0.0), RiskTier::Low);
}

#[test]
fn test_step_function_fields() {
    let raw = json!({});
    let mut rng = rng(7);

    let medium = derive_impact(&raw, 0.69, &mut rng);
    assert_eq!(medium.buffer_hours, 2);
    assert_eq!(medium.warehouse_access, WarehouseAccess::Restricted);
    assert_eq!(medium.alternate_routes, AlternateRoutes::Reduced);

    let high = derive_impact(&raw, 0.71, &mut rng);
    assert_eq!(high.buffer_hours, 4);
    assert_eq!(high.warehouse_access, WarehouseAccess::SeverelyRestricted);
    assert_eq!(high.alternate_routes, AlternateRoutes::Limited);

    let low = derive_impact(&raw, 0.39, &mut rng);
    assert_eq!(low.buffer_hours, 1);
    assert_eq!(low.warehouse_access, WarehouseAccess::Normal);
    assert_eq!(low.alternate_routes, AlternateRoutes::Normal);
}

#[test]
fn test_same_seed_same_report() {
    let raw = json!({"rainfall_mm_72h": 80.0});
    let a = derive_impact(&raw, 0.55, &mut rng(3));
    let b = derive_impact(&raw, 0.55, &mut rng(3));
    assert_eq!(a, b);
}

#[test]
fn test_duration_follows_rainfall_not_probability() {
    let mut rng = rng(11);
    for _ in 0..50 {
        let heavy = derive_impact(&json!({"rainfall_mm_72h": 180.0}), 0.1, &mut rng);
        assert!((48..=72).contains(&heavy.risk_duration_hours));

        let moderate = derive_impact(&json!({"rainfall_mm_72h": 75.0}), 0.9, &mut rng);
        assert!((23..=41).contains(&moderate.risk_duration_hours));

        let light = derive_impact(&json!({"rainfall_mm_72h": 10.0}), 0.9, &mut rng);
        assert!((10..=22).contains(&light.risk_duration_hours));
    }
}

#[test]
fn test_missing_rainfall_reads_as_zero() {
    let report = derive_impact(&json!({"rainfall_mm_72h": "heavy"}), 0.5, &mut rng(1));
    assert!(report.risk_duration_hours <= 22);
}

#[test]
fn test_area_count_rounding() {
    assert_eq!(affected_area_count(0), 0);
    assert_eq!(affected_area_count(4), 0);
    assert_eq!(affected_area_count(5), 1);
    assert_eq!(affected_area_count(50), 6);
    assert_eq!(affected_area_count(100), REGION_COUNT);
    assert_eq!(affected_area_count(u8::MAX), REGION_COUNT);
}

#[test]
fn test_area_count_matches_pct() {
    let mut rng = rng(5);
    for p in [0.1, 0.5, 0.9] {
        let report = derive_impact(&json!({}), p, &mut rng);
        assert_eq!(
            report.affected_areas.len(),
            affected_area_count(report.affected_routes_pct)
        );
    }
}

#[test]
fn test_report_serializes_snake_case() {
    let report = derive_impact(&json!({}), 0.95, &mut rng(2));
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["warehouse_access"], "severely_restricted");
    assert_eq!(value["alternate_routes"], "limited");
    assert!(value["affected_areas"].is_array());
}

proptest! {
    #[test]
    fn prop_areas_distinct_and_bounded(p in 0.0f64..=1.0, seed in any::<u64>()) {
        let report = derive_impact(&json!({}), p, &mut rng(seed));
        prop_assert!(report.affected_areas.len() <= REGION_COUNT);
        let unique: HashSet<_> = report.affected_areas.iter().collect();
        prop_assert_eq!(unique.len(), report.affected_areas.len());
        prop_assert!(report.affected_routes_pct <= 100);
    }

    #[test]
    fn prop_pct_monotonic_across_tiers(seed in any::<u64>()) {
        let mut rng = rng(seed);
        let low = derive_impact(&json!({}), 0.2, &mut rng);
        let medium = derive_impact(&json!({}), 0.5, &mut rng);
        let high = derive_impact(&json!({}), 0.9, &mut rng);
        prop_assert!(low.affected_routes_pct <= medium.affected_routes_pct);
        prop_assert!(medium.affected_routes_pct <= high.affected_routes_pct);
        prop_assert!(low.route_delay_minutes <= medium.route_delay_minutes);
        prop_assert!(medium.route_delay_minutes <= high.route_delay_minutes);
    }

    #[test]
    fn prop_tier_fields_are_deterministic(p in 0.0f64..=1.0, a in any::<u64>(), b in any::<u64>()) {
        let x = derive_impact(&json!({}), p, &mut rng(a));
        let y = derive_impact(&json!({}), p, &mut rng(b));
        prop_assert_eq!(x.warehouse_access, y.warehouse_access);
        prop_assert_eq!(x.buffer_hours, y.buffer_hours);
        prop_assert_eq!(x.alternate_routes, y.alternate_routes);
    }
}
