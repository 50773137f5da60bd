//! Synthetic route training rows
//!
//! Travel time is an additive model over distance, congestion and
//! disruptions plus Gaussian noise.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use super::flood::rows_to_dataset;
use super::{bernoulli, exponential, normal};
use crate::logic::dataset::Dataset;
use crate::logic::features::FEATURE_COUNT;

// Column positions in the route layout
const HOUR: usize = 0;
const WEEKDAY: usize = 1;
const HOLIDAY: usize = 2;
const RAINFALL: usize = 3;
const TEMPERATURE: usize = 4;
const TRAFFIC: usize = 5;
const ROAD_TYPE: usize = 6;
const DISTANCE: usize = 7;
const CONSTRUCTION: usize = 8;
const EVENTS: usize = 9;

const CONSTRUCTION_RATE: f64 = 0.5;
const NOISE_STD_DEV: f64 = 5.0;

/// Extra minutes for departures inside a peak window
pub fn peak_hour_bonus(hour: f64) -> f64 {
    if (7.0..=9.0).contains(&hour) {
        15.0
    } else if (16.0..=18.0).contains(&hour) {
        20.0
    } else {
        0.0
    }
}

/// Noise-free travel time in minutes
pub fn expected_travel_time(row: &[f64; FEATURE_COUNT]) -> f64 {
    2.0 * row[DISTANCE]
        + row[TRAFFIC] / 10.0
        + 0.5 * row[RAINFALL]
        + 5.0 * row[CONSTRUCTION]
        + 15.0 * row[EVENTS]
        + 10.0 * row[HOLIDAY]
        + peak_hour_bonus(row[HOUR])
}

/// One row in route layout order
pub fn sample_row<R: Rng + ?Sized>(rng: &mut R, construction: Option<&Poisson<f64>>) -> [f64; FEATURE_COUNT] {
    let mut row = [0.0; FEATURE_COUNT];
    row[HOUR] = f64::from(rng.gen_range(0u32..24));
    row[WEEKDAY] = f64::from(rng.gen_range(0u32..7));
    row[HOLIDAY] = bernoulli(rng, 0.1);
    row[RAINFALL] = exponential(rng, 2.0);
    row[TEMPERATURE] = normal(rng, 22.0, 5.0);
    row[TRAFFIC] = normal(rng, 50.0, 20.0);
    row[ROAD_TYPE] = f64::from(rng.gen_range(1u32..=3));
    row[DISTANCE] = rng.gen_range(1.0..30.0);
    row[CONSTRUCTION] = match construction {
        Some(distribution) => distribution.sample(rng),
        None => 0.0,
    };
    row[EVENTS] = bernoulli(rng, 0.05);
    row
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Dataset {
    let construction = Poisson::new(CONSTRUCTION_RATE).ok();

    let rows: Vec<[f64; FEATURE_COUNT]> = (0..samples)
        .map(|_| sample_row(rng, construction.as_ref()))
        .collect();
    let labels = rows
        .iter()
        .map(|row| expected_travel_time(row) + normal(rng, 0.0, NOISE_STD_DEV))
        .collect();

    let dataset = rows_to_dataset(&rows, labels);
    log::debug!("Generated {} synthetic route rows", dataset.len());
    dataset
}
