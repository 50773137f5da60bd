//! Sample request inputs
//!
//! Realistic caller payloads (not training rows) for demos, exports and
//! scenario batches. Each payload also carries its `region` (and, for
//! routes, `time_period`); the feature contract ignores those keys.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::ops::RangeInclusive;

use crate::logic::regions::{Region, REGIONS};

// ============================================================================
// FLOOD INPUTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    High,
    Medium,
    Low,
}

/// Uniform bounds for the profile-dependent flood features
struct ProfileRanges {
    rainfall_24h: (f64, f64),
    rainfall_72h: (f64, f64),
    river_level: (f64, f64),
    soil_moisture: (f64, f64),
    elevation: (f64, f64),
    river_distance: (f64, f64),
    impervious: (f64, f64),
    drainage: (f64, f64),
}

impl RiskProfile {
    /// Weighted draw: high 0.2, medium 0.3, low 0.5
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> RiskProfile {
        let roll: f64 = rng.gen();
        if roll < 0.2 {
            RiskProfile::High
        } else if roll < 0.5 {
            RiskProfile::Medium
        } else {
            RiskProfile::Low
        }
    }

    fn ranges(&self) -> ProfileRanges {
        match self {
            RiskProfile::High => ProfileRanges {
                rainfall_24h: (50.0, 100.0),
                rainfall_72h: (120.0, 200.0),
                river_level: (2.8, 4.0),
                soil_moisture: (0.75, 0.95),
                elevation: (2.0, 15.0),
                river_distance: (0.1, 1.0),
                impervious: (70.0, 90.0),
                drainage: (0.2, 0.4),
            },
            RiskProfile::Medium => ProfileRanges {
                rainfall_24h: (20.0, 50.0),
                rainfall_72h: (50.0, 120.0),
                river_level: (1.8, 2.8),
                soil_moisture: (0.5, 0.75),
                elevation: (15.0, 30.0),
                river_distance: (1.0, 2.5),
                impervious: (40.0, 70.0),
                drainage: (0.4, 0.7),
            },
            RiskProfile::Low => ProfileRanges {
                rainfall_24h: (0.0, 20.0),
                rainfall_72h: (0.0, 50.0),
                river_level: (0.5, 1.8),
                soil_moisture: (0.2, 0.5),
                elevation: (30.0, 60.0),
                river_distance: (2.5, 5.0),
                impervious: (10.0, 40.0),
                drainage: (0.7, 1.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodSampleInput {
    pub region: Region,
    pub profile: RiskProfile,
    pub features: Value,
}

pub fn flood_input<R: Rng + ?Sized>(rng: &mut R) -> FloodSampleInput {
    let profile = RiskProfile::draw(rng);
    let ranges = profile.ranges();
    let region = random_region(rng);

    let features = json!({
        "rainfall_mm_24h": uniform(rng, ranges.rainfall_24h),
        "rainfall_mm_72h": uniform(rng, ranges.rainfall_72h),
        "river_level_m": uniform(rng, ranges.river_level),
        "soil_moisture": uniform(rng, ranges.soil_moisture),
        "temperature_c": uniform(rng, (15.0, 28.0)),
        "wind_speed_kmh": uniform(rng, (5.0, 40.0)),
        "elevation_m": uniform(rng, ranges.elevation),
        "distance_to_river_km": uniform(rng, ranges.river_distance),
        "impervious_surface_pct": uniform(rng, ranges.impervious),
        "drainage_capacity": uniform(rng, ranges.drainage),
        "region": region.name(),
    });

    FloodSampleInput { region, profile, features }
}

pub fn flood_inputs<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<FloodSampleInput> {
    (0..count).map(|_| flood_input(rng)).collect()
}

// ============================================================================
// ROUTE INPUTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "Morning Peak (7-9 AM)")]
    MorningPeak,
    #[serde(rename = "Midday (11 AM-1 PM)")]
    Midday,
    #[serde(rename = "Afternoon Peak (4-6 PM)")]
    AfternoonPeak,
    #[serde(rename = "Evening (7-9 PM)")]
    Evening,
    #[serde(rename = "Late Night (10 PM-12 AM)")]
    LateNight,
    #[serde(rename = "Early Morning (5-7 AM)")]
    EarlyMorning,
}

pub const TIME_PERIODS: [TimePeriod; 6] = [
    TimePeriod::MorningPeak,
    TimePeriod::Midday,
    TimePeriod::AfternoonPeak,
    TimePeriod::Evening,
    TimePeriod::LateNight,
    TimePeriod::EarlyMorning,
];

impl TimePeriod {
    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::MorningPeak => "Morning Peak (7-9 AM)",
            TimePeriod::Midday => "Midday (11 AM-1 PM)",
            TimePeriod::AfternoonPeak => "Afternoon Peak (4-6 PM)",
            TimePeriod::Evening => "Evening (7-9 PM)",
            TimePeriod::LateNight => "Late Night (10 PM-12 AM)",
            TimePeriod::EarlyMorning => "Early Morning (5-7 AM)",
        }
    }

    /// Departure hours drawn for this period
    pub fn hours(&self) -> RangeInclusive<u32> {
        match self {
            TimePeriod::MorningPeak => 7..=9,
            TimePeriod::Midday => 11..=13,
            TimePeriod::AfternoonPeak => 16..=18,
            TimePeriod::Evening => 19..=21,
            TimePeriod::LateNight => 22..=23,
            TimePeriod::EarlyMorning => 5..=7,
        }
    }

    pub fn is_peak(&self) -> bool {
        matches!(self, TimePeriod::MorningPeak | TimePeriod::AfternoonPeak)
    }

    pub fn from_label(label: &str) -> Option<TimePeriod> {
        TIME_PERIODS.iter().copied().find(|p| p.label() == label)
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSampleInput {
    pub region: Region,
    pub time_period: TimePeriod,
    pub features: Value,
}

/// Congestion 0-100 from period, weather and calendar
pub fn traffic_index<R: Rng + ?Sized>(
    rng: &mut R,
    period: TimePeriod,
    rainfall: f64,
    is_holiday: bool,
    day_of_week: u32,
) -> f64 {
    let mut base: f64 = 30.0;
    if period.is_peak() {
        base += 30.0;
    }
    if rainfall > 5.0 {
        base += 15.0;
    }
    if is_holiday {
        base -= 20.0;
    }
    if day_of_week >= 5 {
        base -= 15.0;
    }
    (base + rng.gen_range(-10.0..=10.0)).clamp(0.0, 100.0)
}

pub fn route_input<R: Rng + ?Sized>(rng: &mut R) -> RouteSampleInput {
    let region = random_region(rng);
    let time_period = TIME_PERIODS.choose(rng).copied().unwrap_or(TimePeriod::Midday);

    let hour = rng.gen_range(time_period.hours());
    let day_of_week = rng.gen_range(0u32..=6);
    let is_holiday = rng.gen_bool(0.1);
    let rainfall = uniform(rng, (0.0, 15.0));
    let temperature = uniform(rng, (15.0, 30.0));
    let traffic = traffic_index(rng, time_period, rainfall, is_holiday, day_of_week);
    let road_type = rng.gen_range(1u32..=3);
    let distance = uniform(rng, (5.0, 30.0));
    let construction = rng.gen_range(0u32..=3);
    let special_event = rng.gen_bool(0.15);

    let features = json!({
        "time_of_day": hour,
        "day_of_week": day_of_week,
        "is_holiday": u8::from(is_holiday),
        "rainfall_mm": rainfall,
        "temperature": temperature,
        "traffic_index": traffic,
        "road_type": road_type,
        "distance_km": distance,
        "construction_zones": construction,
        "special_events": u8::from(special_event),
        "region": region.name(),
        "time_period": time_period.label(),
    });

    RouteSampleInput { region, time_period, features }
}

pub fn route_inputs<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<RouteSampleInput> {
    (0..count).map(|_| route_input(rng)).collect()
}

// ============================================================================
// HELPERS
// ============================================================================

fn uniform<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..=high)
}

fn random_region<R: Rng + ?Sized>(rng: &mut R) -> Region {
    REGIONS.choose(rng).copied().unwrap_or(Region::Parramatta)
}
