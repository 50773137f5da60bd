//! Synthetic flood training rows
//!
//! Labels come from a hand-built risk score normalized by the batch
//! maximum: a row is positive iff its normalized score exceeds 0.5.

use ndarray::{Array1, Array2};
use rand::Rng;

use super::{exponential, normal};
use crate::logic::dataset::Dataset;
use crate::logic::features::FEATURE_COUNT;

// Column positions in the flood layout
const RAIN_24H: usize = 0;
const RAIN_72H: usize = 1;
const RIVER_LEVEL: usize = 2;
const SOIL_MOISTURE: usize = 3;
const TEMPERATURE: usize = 4;
const WIND_SPEED: usize = 5;
const ELEVATION: usize = 6;
const RIVER_DISTANCE: usize = 7;
const IMPERVIOUS: usize = 8;
const DRAINAGE: usize = 9;

/// Normalized score above which a row is labeled as flooding
pub const LABEL_THRESHOLD: f64 = 0.5;

/// One row in flood layout order
pub fn sample_row<R: Rng + ?Sized>(rng: &mut R) -> [f64; FEATURE_COUNT] {
    let mut row = [0.0; FEATURE_COUNT];
    row[RAIN_24H] = exponential(rng, 20.0);
    row[RAIN_72H] = exponential(rng, 50.0);
    row[RIVER_LEVEL] = normal(rng, 1.5, 0.7);
    row[SOIL_MOISTURE] = rng.gen_range(0.2..0.9);
    row[TEMPERATURE] = normal(rng, 20.0, 5.0);
    row[WIND_SPEED] = exponential(rng, 15.0);
    row[ELEVATION] = rng.gen_range(1.0..60.0);
    row[RIVER_DISTANCE] = exponential(rng, 2.0);
    row[IMPERVIOUS] = rng.gen_range(10.0..90.0);
    row[DRAINAGE] = rng.gen_range(0.2..1.0);
    row
}

/// Unnormalized flood risk, never negative
pub fn risk_score(row: &[f64; FEATURE_COUNT]) -> f64 {
    let score = 0.01 * (row[RAIN_24H] - 30.0).max(0.0)
        + 0.005 * (row[RAIN_72H] - 80.0).max(0.0)
        + 0.2 * (row[RIVER_LEVEL] - 2.2).max(0.0)
        + 0.1 * (row[SOIL_MOISTURE] - 0.7).max(0.0)
        + 0.05 * (1.0 - (row[ELEVATION] / 20.0).min(1.0))
        + 0.1 * (1.0 - (row[RIVER_DISTANCE] / 3.0).min(1.0))
        + 0.05 * (row[IMPERVIOUS] - 60.0).max(0.0) / 100.0
        + 0.1 * (1.0 - row[DRAINAGE]);
    score.max(0.0)
}

/// Normalize by the batch maximum and threshold. All zero when the maximum is zero.
pub fn label_scores(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores
        .iter()
        .map(|s| if s / max > LABEL_THRESHOLD { 1.0 } else { 0.0 })
        .collect()
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Dataset {
    let rows: Vec<[f64; FEATURE_COUNT]> = (0..samples).map(|_| sample_row(rng)).collect();
    let scores: Vec<f64> = rows.iter().map(risk_score).collect();
    let labels = label_scores(&scores);

    let dataset = rows_to_dataset(&rows, labels);
    log::debug!(
        "Generated {} synthetic flood rows ({:.1}% positive)",
        dataset.len(),
        dataset.positive_rate() * 100.0
    );
    dataset
}

pub(crate) fn rows_to_dataset(rows: &[[f64; FEATURE_COUNT]], labels: Vec<f64>) -> Dataset {
    Dataset {
        features: Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i][j]),
        labels: Array1::from(labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(&mut ChaCha8Rng::seed_from_u64(42), 200);
        let b = generate(&mut ChaCha8Rng::seed_from_u64(42), 200);
        assert_eq!(a, b);

        let c = generate(&mut ChaCha8Rng::seed_from_u64(7), 200);
        assert_ne!(a.features, c.features);
    }

    #[test]
    fn test_default_batch_is_minority_positive() {
        let dataset = generate(&mut ChaCha8Rng::seed_from_u64(42), 1000);
        assert_eq!(dataset.len(), 1000);
        assert_eq!(dataset.n_features(), FEATURE_COUNT);

        let rate = dataset.positive_rate();
        assert!(rate > 0.0, "no positive rows");
        assert!(rate < 0.5, "positive rate {}", rate);
    }

    #[test]
    fn test_labels_follow_normalized_score() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let rows: Vec<_> = (0..300).map(|_| sample_row(&mut rng)).collect();
        let scores: Vec<f64> = rows.iter().map(risk_score).collect();
        let labels = label_scores(&scores);
        let max = scores.iter().copied().fold(0.0, f64::max);

        for (score, label) in scores.iter().zip(labels.iter()) {
            assert_eq!(*label == 1.0, score / max > LABEL_THRESHOLD);
        }
    }

    #[test]
    fn test_degenerate_batch_is_all_negative() {
        assert_eq!(label_scores(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert!(label_scores(&[]).is_empty());
    }

    #[test]
    fn test_risk_score_components() {
        // Dry, high, far from the river, full drainage: nothing contributes
        let mut row = [0.0; FEATURE_COUNT];
        row[ELEVATION] = 40.0;
        row[RIVER_DISTANCE] = 5.0;
        row[DRAINAGE] = 1.0;
        assert_eq!(risk_score(&row), 0.0);

        row[RAIN_24H] = 130.0;
        assert!((risk_score(&row) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let row = sample_row(&mut rng);
            assert!(row[RAIN_24H] >= 0.0);
            assert!((0.2..0.9).contains(&row[SOIL_MOISTURE]));
            assert!((1.0..60.0).contains(&row[ELEVATION]));
            assert!((0.2..1.0).contains(&row[DRAINAGE]));
        }
    }
}
