//! Tests for scenario fusion

use chrono::Utc;
use serde_json::json;

use super::*;
use crate::logic::engine::{FloodForecast, RouteForecast};
use crate::logic::impact::{ImpactReport, RiskTier};

fn impact(probability: f64, areas: Vec<Region>) -> ImpactReport {
    let tier = RiskTier::from_probability(probability);
    ImpactReport {
        route_delay_minutes: 20,
        affected_routes_pct: 30,
        warehouse_access: tier.warehouse_access(),
        buffer_hours: tier.buffer_hours(),
        affected_areas: areas,
        alternate_routes: tier.alternate_routes(),
        risk_duration_hours: 12,
    }
}

fn flood(region: Region, probability: f64, areas: Vec<Region>) -> FloodAssessment {
    FloodAssessment {
        region,
        input: json!({
            "rainfall_mm_24h": 40.0,
            "rainfall_mm_72h": 90.0,
            "temperature_c": 19.5,
            "wind_speed_kmh": 22.0,
            "region": region.name(),
        }),
        prediction: FloodForecast {
            flood_probability: probability,
            flood_risk: RiskTier::from_probability(probability),
            logistics_impact: impact(probability, areas),
            features_used: Vec::new(),
            defaulted_features: Vec::new(),
            timestamp: Utc::now(),
        },
    }
}

fn route(region: Region, minutes: f64) -> RouteAssessment {
    RouteAssessment {
        region,
        time_period: TimePeriod::MorningPeak,
        input: json!({
            "distance_km": 12.0,
            "traffic_index": 55.0,
            "construction_zones": 2,
            "region": region.name(),
        }),
        prediction: RouteForecast {
            travel_time_minutes: minutes,
            features_used: Vec::new(),
            defaulted_features: Vec::new(),
            timestamp: Utc::now(),
        },
    }
}

#[test]
fn test_surcharge_tiers() {
    assert_eq!(surcharge_factor(0.9), 0.5);
    assert_eq!(surcharge_factor(0.7), 0.25);
    assert_eq!(surcharge_factor(0.5), 0.25);
    assert_eq!(surcharge_factor(0.4), 0.1);
    assert_eq!(surcharge_factor(0.3), 0.1);
    assert_eq!(surcharge_factor(0.2), 0.0);
    assert_eq!(surcharge_factor(0.0), 0.0);
}

#[test]
fn test_zero_probability_leaves_baseline() {
    let floods = vec![flood(Region::Penrith, 0.0, Vec::new())];
    let routes = vec![
        route(Region::Penrith, 42.0),
        route(Region::Penrith, 17.5),
        route(Region::Liverpool, 60.0),
    ];

    let scenarios = build_scenarios(&floods, &routes, 1, Utc::now());
    assert_eq!(scenarios.len(), 1);
    for leg in &scenarios[0].routes {
        assert_eq!(leg.flood_adjusted_minutes, leg.baseline_minutes);
        assert_eq!(leg.delay_minutes, 0.0);
    }
}

#[test]
fn test_high_probability_adds_half() {
    let f = flood(Region::Windsor, 0.85, vec![Region::Richmond]);
    let r = route(Region::Blacktown, 40.0);
    let scenario = synthesize(Region::Windsor, &f, &[&r], Utc::now());

    let leg = &scenario.routes[0];
    assert_eq!(leg.baseline_minutes, 40.0);
    assert_eq!(leg.delay_minutes, 20.0);
    assert_eq!(leg.flood_adjusted_minutes, 60.0);
    assert_eq!(leg.from, "Windsor Distribution Center");
    assert_eq!(leg.to, "Blacktown Delivery Hub");
    assert_eq!(leg.distance_km, 12.0);
    assert_eq!(leg.construction_zones, 2.0);
}

#[test]
fn test_weather_snapshot_from_flood_input() {
    let f = flood(Region::Camden, 0.3, Vec::new());
    let scenario = synthesize(Region::Camden, &f, &[], Utc::now());
    assert_eq!(scenario.weather.rainfall_24h, 40.0);
    assert_eq!(scenario.weather.rainfall_72h, 90.0);
    assert_eq!(scenario.weather.temperature, 19.5);
    assert_eq!(scenario.weather.wind_speed, 22.0);
    assert!(scenario.routes.is_empty());
}

#[test]
fn test_recommendations_high_risk() {
    let f = flood(Region::Penrith, 0.8, vec![Region::StMarys, Region::Penrith]);
    let scenario = synthesize(Region::Penrith, &f, &[], Utc::now());
    assert_eq!(
        scenario.recommendations,
        vec![
            "Reschedule deliveries to avoid St Marys area".to_string(),
            "Add 4 hour buffer to delivery estimates".to_string(),
            "Consider alternative routes to bypass flooded areas".to_string(),
        ]
    );
}

#[test]
fn test_recommendations_quiet_conditions() {
    let mut summary = FloodSummary::of(&flood(Region::Penrith, 0.1, Vec::new()).prediction);
    summary.buffer_hours = 0;
    assert_eq!(
        recommendations(&summary),
        vec![
            "Normal delivery schedule recommended".to_string(),
            "Standard delivery times apply".to_string(),
            "Primary routes clear for delivery".to_string(),
        ]
    );
}

#[test]
fn test_recommendations_at_half_probability() {
    let summary = FloodSummary::of(&flood(Region::Penrith, 0.5, Vec::new()).prediction);
    let recs = recommendations(&summary);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[1], "Add 2 hour buffer to delivery estimates");
    assert_eq!(recs[2], "Primary routes clear for delivery");
}

#[test]
fn test_select_common_regions_in_catalog_order() {
    let floods = vec![
        flood(Region::Liverpool, 0.1, Vec::new()),
        flood(Region::Penrith, 0.1, Vec::new()),
        flood(Region::Camden, 0.1, Vec::new()),
    ];
    let routes = vec![
        route(Region::Camden, 10.0),
        route(Region::Liverpool, 10.0),
        route(Region::Penrith, 10.0),
    ];

    assert_eq!(
        select_regions(&floods, &routes, 2),
        vec![Region::Penrith, Region::Liverpool]
    );
}

#[test]
fn test_select_fills_from_union() {
    let floods = vec![
        flood(Region::Windsor, 0.1, Vec::new()),
        flood(Region::Blacktown, 0.1, Vec::new()),
    ];
    let routes = vec![route(Region::Windsor, 10.0), route(Region::Penrith, 10.0)];

    assert_eq!(
        select_regions(&floods, &routes, 3),
        vec![Region::Windsor, Region::Penrith, Region::Blacktown]
    );
    assert_eq!(select_regions(&floods, &routes, 10).len(), 3);
}

#[test]
fn test_region_without_routes_borrows_slice() {
    let floods = vec![flood(Region::Penrith, 0.5, Vec::new())];
    let routes: Vec<RouteAssessment> = (0..5)
        .map(|i| route(Region::Liverpool, 10.0 + f64::from(i)))
        .collect();

    // Penrith has no routes of its own and borrows routes[0..3]
    let scenarios = build_scenarios(&floods, &routes, 2, Utc::now());
    assert_eq!(scenarios.len(), 2);

    assert_eq!(scenarios[0].region, Region::Penrith);
    let baselines: Vec<f64> = scenarios[0].routes.iter().map(|l| l.baseline_minutes).collect();
    assert_eq!(baselines, vec![10.0, 11.0, 12.0]);

    // Liverpool has no flood of its own and borrows floods[1 % 1]
    assert_eq!(scenarios[1].region, Region::Liverpool);
    assert_eq!(scenarios[1].routes.len(), 3);
    assert_eq!(scenarios[1].flood.probability, 0.5);
}

#[test]
fn test_route_slice_clamped_past_end() {
    let floods = vec![
        flood(Region::Penrith, 0.1, Vec::new()),
        flood(Region::Blacktown, 0.1, Vec::new()),
    ];
    let routes = vec![route(Region::Camden, 10.0)];

    let scenarios = build_scenarios(&floods, &routes, 3, Utc::now());
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0].region, Region::Penrith);
    assert_eq!(scenarios[0].routes.len(), 1);
    assert!(scenarios[1].routes.is_empty());
    assert_eq!(scenarios[2].region, Region::Camden);
    assert_eq!(scenarios[2].routes.len(), 1);
}

#[test]
fn test_no_floods_no_scenarios() {
    let routes = vec![route(Region::Camden, 10.0)];
    assert!(build_scenarios(&[], &routes, 3, Utc::now()).is_empty());
}

#[test]
fn test_at_most_three_legs_per_region() {
    let floods = vec![flood(Region::Fairfield, 0.6, Vec::new())];
    let routes: Vec<RouteAssessment> = (0..6).map(|_| route(Region::Fairfield, 30.0)).collect();
    let scenarios = build_scenarios(&floods, &routes, 1, Utc::now());
    assert_eq!(scenarios[0].routes.len(), ROUTES_PER_SCENARIO);
    assert_eq!(scenarios[0].routes[0].flood_adjusted_minutes, 37.5);
}

#[test]
fn test_scenario_serializes() {
    let f = flood(Region::MountDruitt, 0.75, vec![Region::RouseHill]);
    let r = route(Region::MountDruitt, 20.0);
    let scenario = synthesize(Region::MountDruitt, &f, &[&r], Utc::now());
    let value = serde_json::to_value(&scenario).unwrap();
    assert_eq!(value["region"], "Mount Druitt");
    assert_eq!(value["flood"]["risk_level"], "high");
    assert_eq!(value["flood"]["affected_areas"][0], "Rouse Hill");
    assert_eq!(value["routes"][0]["time_period"], "Morning Peak (7-9 AM)");
}
