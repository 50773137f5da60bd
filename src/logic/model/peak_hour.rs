//! Peak-Hour Regressor
//!
//! Travel time jumps inside the morning and afternoon rush windows, which a
//! straight line over the hour of day cannot follow. This wraps
//! `LinearRegressor` and appends one indicator column per window before
//! every fit and prediction. Callers still see the original column count.

use std::ops::RangeInclusive;

use ndarray::{s, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::estimator::{validate_row, validate_training_data, ScoringError, ScoringModel};
use super::linear::LinearRegressor;

/// Position of `time_of_day` in the route layout
pub const DEFAULT_HOUR_COLUMN: usize = 0;

pub const MORNING_PEAK: RangeInclusive<f64> = 7.0..=9.0;
pub const AFTERNOON_PEAK: RangeInclusive<f64> = 16.0..=18.0;

const PEAK_WINDOWS: [RangeInclusive<f64>; 2] = [MORNING_PEAK, AFTERNOON_PEAK];

/// 1.0 for each peak window containing `hour`, in window order
pub fn peak_indicators(hour: f64) -> [f64; 2] {
    PEAK_WINDOWS.map(|window| if window.contains(&hour) { 1.0 } else { 0.0 })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHourRegressor {
    pub hour_column: usize,
    inner: LinearRegressor,
}

impl Default for PeakHourRegressor {
    fn default() -> Self {
        Self::new(DEFAULT_HOUR_COLUMN, LinearRegressor::default())
    }
}

impl PeakHourRegressor {
    pub fn new(hour_column: usize, inner: LinearRegressor) -> Self {
        Self { hour_column, inner }
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if !self.is_fitted() {
            return Err(ScoringError::NotFitted);
        }
        validate_row(row, self.n_features())?;

        let mut expanded = Vec::with_capacity(row.len() + PEAK_WINDOWS.len());
        expanded.extend_from_slice(row);
        expanded.extend_from_slice(&peak_indicators(row[self.hour_column]));
        self.inner.predict(&expanded)
    }

    /// Raw columns followed by the peak indicators
    fn expand(&self, features: &ArrayView2<f64>) -> Result<Array2<f64>, ScoringError> {
        let (rows, cols) = features.dim();
        if self.hour_column >= cols {
            return Err(ScoringError::DimensionMismatch {
                expected: self.hour_column + 1,
                actual: cols,
            });
        }

        let mut expanded = Array2::<f64>::zeros((rows, cols + PEAK_WINDOWS.len()));
        expanded.slice_mut(s![.., ..cols]).assign(features);
        for (mut out, row) in expanded.outer_iter_mut().zip(features.outer_iter()) {
            let flags = peak_indicators(row[self.hour_column]);
            out[cols] = flags[0];
            out[cols + 1] = flags[1];
        }
        Ok(expanded)
    }
}

impl ScoringModel for PeakHourRegressor {
    const KIND: &'static str = "peak_hour_linear_regression";

    fn fit(&mut self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<(), ScoringError> {
        validate_training_data(&features, &labels)?;
        let expanded = self.expand(&features)?;
        self.inner.fit(expanded.view(), labels)
    }

    fn score(&self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<f64, ScoringError> {
        if !self.is_fitted() {
            return Err(ScoringError::NotFitted);
        }
        validate_training_data(&features, &labels)?;
        let expanded = self.expand(&features)?;
        self.inner.score(expanded.view(), labels)
    }

    /// Indicator weights are folded into the hour column
    fn feature_importances(&self) -> Vec<f64> {
        let mut importances = self.inner.feature_importances();
        let n = self.n_features();
        let peak_share: f64 = importances.iter().skip(n).sum();
        importances.truncate(n);
        if let Some(hour) = importances.get_mut(self.hour_column) {
            *hour += peak_share;
        }
        importances
    }

    fn n_features(&self) -> usize {
        self.inner.n_features().saturating_sub(PEAK_WINDOWS.len())
    }

    fn is_fitted(&self) -> bool {
        self.inner.is_fitted()
    }
}
