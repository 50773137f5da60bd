//! Dataset Module - Training matrices and sample export
//!
//! `Dataset` is the labeled design matrix handed to an estimator.
//! Rows come either from stored history (`TrainingRecord`) or from the
//! synthetic generators.

pub mod export;
pub mod record;


use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::logic::features::FeatureSchema;
use crate::logic::model::estimator::ScoringError;
pub use record::TrainingRecord;

/// Labeled feature matrix, rows in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self, ScoringError> {
        if features.nrows() != labels.len() {
            return Err(ScoringError::LabelMismatch {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    /// Build from row vectors that all have `n_features` columns
    pub fn from_rows(
        n_features: usize,
        rows: Vec<Vec<f64>>,
        labels: Vec<f64>,
    ) -> Result<Self, ScoringError> {
        let n_rows = rows.len();
        let mut flat = Vec::with_capacity(n_rows * n_features);
        for row in rows {
            if row.len() != n_features {
                return Err(ScoringError::DimensionMismatch {
                    expected: n_features,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }

        let features = Array2::from_shape_vec((n_rows, n_features), flat).map_err(|_| {
            ScoringError::DimensionMismatch { expected: n_features, actual: 0 }
        })?;
        Self::new(features, Array1::from(labels))
    }

    /// Stored history → matrix, applying the feature contract per row
    pub fn from_records(
        schema: &FeatureSchema,
        records: &[TrainingRecord],
    ) -> Result<Self, ScoringError> {
        let rows = records
            .iter()
            .map(|r| schema.fill(&r.features).vector.values)
            .collect();
        let labels = records.iter().map(|r| r.label).collect();
        Self::from_rows(schema.len(), rows, labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Share of labels above 0.5
    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.labels.iter().filter(|&&y| y > 0.5).count() as f64 / self.len() as f64
    }

    /// Seeded shuffle, then split off `ceil(len × test_fraction)` rows for testing.
    /// At least one row always stays in the training half.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let fraction = test_fraction.clamp(0.0, 1.0);
        let n_test = ((n as f64 * fraction).ceil() as usize).min(n.saturating_sub(1));
        let (test_idx, train_idx) = indices.split_at(n_test);

        (self.select(train_idx), self.select(test_idx))
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}
