//! Impact Module - Operational impact of a flood probability
//!
//! Tier boundaries are fixed: `> 0.7` high, `> 0.4` medium, else low.
//! Warehouse access, buffer and alternate routes are pure functions of the
//! tier. Delay and affected share get Gaussian jitter from the caller's RNG,
//! truncated at three standard deviations so tiers never overlap.

#[cfg(test)]
mod tests;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::features::numeric_field;
use crate::logic::regions::{Region, REGIONS, REGION_COUNT};

pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Jitter is clamped to mean ± this many standard deviations
pub const JITTER_SIGMA_LIMIT: f64 = 3.0;

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> RiskTier {
        if probability > HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability > MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    pub fn warehouse_access(&self) -> WarehouseAccess {
        match self {
            RiskTier::High => WarehouseAccess::SeverelyRestricted,
            RiskTier::Medium => WarehouseAccess::Restricted,
            RiskTier::Low => WarehouseAccess::Normal,
        }
    }

    pub fn buffer_hours(&self) -> u32 {
        match self {
            RiskTier::High => 4,
            RiskTier::Medium => 2,
            RiskTier::Low => 1,
        }
    }

    pub fn alternate_routes(&self) -> AlternateRoutes {
        match self {
            RiskTier::High => AlternateRoutes::Limited,
            RiskTier::Medium => AlternateRoutes::Reduced,
            RiskTier::Low => AlternateRoutes::Normal,
        }
    }

    /// (base, jitter mean, jitter sd) for delay minutes
    fn delay_profile(&self) -> (f64, f64, f64) {
        match self {
            RiskTier::High => (45.0, 15.0, 5.0),
            RiskTier::Medium => (20.0, 10.0, 3.0),
            RiskTier::Low => (5.0, 5.0, 2.0),
        }
    }

    /// (base, jitter mean, jitter sd) for the affected route share
    fn coverage_profile(&self) -> (f64, f64, f64) {
        match self {
            RiskTier::High => (60.0, 15.0, 5.0),
            RiskTier::Medium => (30.0, 10.0, 3.0),
            RiskTier::Low => (10.0, 5.0, 2.0),
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseAccess {
    Normal,
    Restricted,
    SeverelyRestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternateRoutes {
    Normal,
    Reduced,
    Limited,
}

impl AlternateRoutes {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlternateRoutes::Normal => "normal",
            AlternateRoutes::Reduced => "reduced",
            AlternateRoutes::Limited => "limited",
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Recomputed per prediction; never stored as state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub route_delay_minutes: i64,
    /// 0-100
    pub affected_routes_pct: u8,
    pub warehouse_access: WarehouseAccess,
    pub buffer_hours: u32,
    /// Distinct catalog regions
    pub affected_areas: Vec<Region>,
    pub alternate_routes: AlternateRoutes,
    pub risk_duration_hours: i64,
}

/// Derive the impact of `probability` for the request `raw`.
///
/// Only `rainfall_mm_72h` is read from the input; it drives the disruption
/// window independently of the probability tier.
pub fn derive_impact<R: Rng + ?Sized>(raw: &Value, probability: f64, rng: &mut R) -> ImpactReport {
    let tier = RiskTier::from_probability(probability);

    let (base, mean, sd) = tier.delay_profile();
    let route_delay_minutes = (base + jitter(rng, mean, sd)) as i64;

    let (base, mean, sd) = tier.coverage_profile();
    let affected_routes_pct = (base + jitter(rng, mean, sd)).clamp(0.0, 100.0) as u8;

    let affected_areas = sample_areas(rng, affected_routes_pct);

    let rainfall_72h = numeric_field(raw, "rainfall_mm_72h").unwrap_or(0.0);
    let risk_duration_hours = risk_duration(rng, rainfall_72h);

    ImpactReport {
        route_delay_minutes,
        affected_routes_pct,
        warehouse_access: tier.warehouse_access(),
        buffer_hours: tier.buffer_hours(),
        affected_areas,
        alternate_routes: tier.alternate_routes(),
        risk_duration_hours,
    }
}

/// Number of catalog regions touched by `pct` percent of routes
pub fn affected_area_count(pct: u8) -> usize {
    let count = (REGION_COUNT as f64 * f64::from(pct) / 100.0).round() as usize;
    count.min(REGION_COUNT)
}

fn sample_areas<R: Rng + ?Sized>(rng: &mut R, pct: u8) -> Vec<Region> {
    REGIONS
        .choose_multiple(rng, affected_area_count(pct))
        .copied()
        .collect()
}

/// Hours of disruption from sustained 72h rainfall
fn risk_duration<R: Rng + ?Sized>(rng: &mut R, rainfall_72h: f64) -> i64 {
    let hours = if rainfall_72h > 100.0 {
        48.0 + jitter(rng, 12.0, 4.0)
    } else if rainfall_72h > 50.0 {
        24.0 + jitter(rng, 8.0, 3.0)
    } else {
        12.0 + jitter(rng, 4.0, 2.0)
    };
    hours as i64
}

/// N(mean, sd) truncated to mean ± 3sd
fn jitter<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    let limit = JITTER_SIGMA_LIMIT * sd;
    (mean + sd * z).clamp(mean - limit, mean + limit)
}
