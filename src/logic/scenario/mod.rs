//! Scenario Module - Region-level fusion of flood and route forecasts
//!
//! One scenario per region: the weather the flood forecast saw, its impact
//! summary, up to three route legs with flood-adjusted times, and three
//! fixed-rule recommendations. Scenarios are read-only and never stored.
//!
//! Region pairing is deterministic: regions present in both forecast sets
//! come first (catalog order), then the union fills up to the requested
//! count (catalog order).

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::engine::{FloodForecast, RouteForecast};
use crate::logic::features::numeric_field;
use crate::logic::impact::{RiskTier, WarehouseAccess};
use crate::logic::regions::{Region, REGIONS};
use crate::logic::synthetic::TimePeriod;

/// Route legs taken per region
pub const ROUTES_PER_SCENARIO: usize = 3;

// ============================================================================
// INPUTS
// ============================================================================

/// A flood request and what the engine made of it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodAssessment {
    pub region: Region,
    pub input: Value,
    pub prediction: FloodForecast,
}

/// A route request and its predicted travel time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAssessment {
    pub region: Region,
    pub time_period: TimePeriod,
    pub input: Value,
    pub prediction: RouteForecast,
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub rainfall_24h: f64,
    pub rainfall_72h: f64,
    pub temperature: f64,
    pub wind_speed: f64,
}

impl WeatherSnapshot {
    pub fn from_input(input: &Value) -> Self {
        let field = |name: &str| numeric_field(input, name).unwrap_or(0.0);
        Self {
            rainfall_24h: field("rainfall_mm_24h"),
            rainfall_72h: field("rainfall_mm_72h"),
            temperature: field("temperature_c"),
            wind_speed: field("wind_speed_kmh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodSummary {
    pub probability: f64,
    pub risk_level: RiskTier,
    pub affected_areas: Vec<Region>,
    pub route_delay_minutes: i64,
    pub affected_routes_pct: u8,
    pub warehouse_access: WarehouseAccess,
    pub buffer_hours: u32,
}

impl FloodSummary {
    fn of(forecast: &FloodForecast) -> Self {
        let impact = &forecast.logistics_impact;
        Self {
            probability: forecast.flood_probability,
            risk_level: forecast.flood_risk,
            affected_areas: impact.affected_areas.clone(),
            route_delay_minutes: impact.route_delay_minutes,
            affected_routes_pct: impact.affected_routes_pct,
            warehouse_access: impact.warehouse_access,
            buffer_hours: impact.buffer_hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub time_period: TimePeriod,
    pub traffic_index: f64,
    pub construction_zones: f64,
    pub baseline_minutes: f64,
    pub flood_adjusted_minutes: f64,
    pub delay_minutes: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub region: Region,
    pub timestamp: DateTime<Utc>,
    pub weather: WeatherSnapshot,
    pub flood: FloodSummary,
    pub routes: Vec<RouteLeg>,
    pub recommendations: Vec<String>,
}

// ============================================================================
// FUSION RULES
// ============================================================================

/// Fractional travel-time surcharge for the origin's flood probability
pub fn surcharge_factor(probability: f64) -> f64 {
    if probability > 0.7 {
        0.5
    } else if probability > 0.4 {
        0.25
    } else if probability > 0.2 {
        0.1
    } else {
        0.0
    }
}

pub fn route_leg(origin: Region, probability: f64, route: &RouteAssessment) -> RouteLeg {
    let baseline = route.prediction.travel_time_minutes;
    let delay = baseline * surcharge_factor(probability);
    let field = |name: &str| numeric_field(&route.input, name).unwrap_or(0.0);

    RouteLeg {
        from: format!("{} Distribution Center", origin),
        to: format!("{} Delivery Hub", route.region),
        distance_km: field("distance_km"),
        time_period: route.time_period,
        traffic_index: field("traffic_index"),
        construction_zones: field("construction_zones"),
        baseline_minutes: baseline,
        flood_adjusted_minutes: baseline + delay,
        delay_minutes: delay,
    }
}

/// Always three entries: areas, buffer, routing
pub fn recommendations(summary: &FloodSummary) -> Vec<String> {
    let areas = match summary.affected_areas.first() {
        Some(area) => format!("Reschedule deliveries to avoid {} area", area),
        None => "Normal delivery schedule recommended".to_string(),
    };
    let buffer = if summary.buffer_hours > 0 {
        format!("Add {} hour buffer to delivery estimates", summary.buffer_hours)
    } else {
        "Standard delivery times apply".to_string()
    };
    let routing = if summary.probability > 0.5 {
        "Consider alternative routes to bypass flooded areas"
    } else {
        "Primary routes clear for delivery"
    };

    vec![areas, buffer, routing.to_string()]
}

/// Fuse one flood assessment with route assessments for `region`
pub fn synthesize(
    region: Region,
    flood: &FloodAssessment,
    routes: &[&RouteAssessment],
    timestamp: DateTime<Utc>,
) -> Scenario {
    let flood_summary = FloodSummary::of(&flood.prediction);
    let legs = routes
        .iter()
        .map(|route| route_leg(region, flood_summary.probability, route))
        .collect();

    Scenario {
        region,
        timestamp,
        weather: WeatherSnapshot::from_input(&flood.input),
        recommendations: recommendations(&flood_summary),
        flood: flood_summary,
        routes: legs,
    }
}

// ============================================================================
// BATCH
// ============================================================================

/// Regions to build scenarios for, common regions first
pub fn select_regions(
    floods: &[FloodAssessment],
    routes: &[RouteAssessment],
    count: usize,
) -> Vec<Region> {
    let has_flood = |region: Region| floods.iter().any(|f| f.region == region);
    let has_route = |region: Region| routes.iter().any(|r| r.region == region);

    let mut selected: Vec<Region> = REGIONS
        .iter()
        .copied()
        .filter(|&r| has_flood(r) && has_route(r))
        .collect();

    if selected.len() < count {
        let fill: Vec<Region> = REGIONS
            .iter()
            .copied()
            .filter(|&r| (has_flood(r) || has_route(r)) && !selected.contains(&r))
            .collect();
        selected.extend(fill);
    }

    selected.truncate(count);
    selected
}

/// Build up to `count` scenarios from independent forecast batches.
///
/// A region without its own flood assessment borrows `floods[i % len]`; one
/// without route assessments borrows the `i`-th slice of three.
pub fn build_scenarios(
    floods: &[FloodAssessment],
    routes: &[RouteAssessment],
    count: usize,
    timestamp: DateTime<Utc>,
) -> Vec<Scenario> {
    if floods.is_empty() {
        log::warn!("No flood assessments, no scenarios built");
        return Vec::new();
    }

    select_regions(floods, routes, count)
        .into_iter()
        .enumerate()
        .map(|(i, region)| {
            let flood = floods
                .iter()
                .find(|f| f.region == region)
                .unwrap_or(&floods[i % floods.len()]);

            let mut region_routes: Vec<&RouteAssessment> = routes
                .iter()
                .filter(|r| r.region == region)
                .take(ROUTES_PER_SCENARIO)
                .collect();
            if region_routes.is_empty() {
                let start = (i * ROUTES_PER_SCENARIO).min(routes.len());
                let end = (start + ROUTES_PER_SCENARIO).min(routes.len());
                region_routes = routes[start..end].iter().collect();
            }

            synthesize(region, flood, &region_routes, timestamp)
        })
        .collect()
}
