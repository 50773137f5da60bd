//! Synthetic Data Module
//!
//! Seeded training sets for both variants plus realistic request inputs
//! for demos and scenario batches. Every generator takes the RNG as an
//! argument; nothing here owns randomness.

pub mod flood;
pub mod route;
pub mod samples;

use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};

use crate::logic::dataset::Dataset;
use crate::logic::model::ModelVariant;

pub use samples::{FloodSampleInput, RiskProfile, RouteSampleInput, TimePeriod};

/// Training set for a variant
pub fn generate<R: Rng + ?Sized>(variant: ModelVariant, rng: &mut R, samples: usize) -> Dataset {
    match variant {
        ModelVariant::FloodRisk => flood::generate(rng, samples),
        ModelVariant::RouteTime => route::generate(rng, samples),
    }
}

// ============================================================================
// DRAW HELPERS
// ============================================================================

/// Exponential draw with the given mean
pub(crate) fn exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    let unit: f64 = Exp1.sample(rng);
    mean * unit
}

/// Gaussian draw
pub(crate) fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + std_dev * z
}

/// 0.0 or 1.0
pub(crate) fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> f64 {
    if rng.gen_bool(p) {
        1.0
    } else {
        0.0
    }
}
