//! Scoring Capability
//!
//! The lifecycle only talks to estimators through `ScoringModel`.
//! Both concrete estimators are deterministic: same data, same weights.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("estimator has not been fitted")]
    NotFitted,

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("non-finite value in input")]
    NonFinite,

    #[error("normal equations are singular")]
    Singular,
}

// ============================================================================
// SCORING MODEL TRAIT
// ============================================================================

/// Opaque fit/score capability used by `Model<V>`
pub trait ScoringModel: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stored in artifacts to catch estimator swaps
    const KIND: &'static str;

    fn fit(&mut self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<(), ScoringError>;

    /// Accuracy for classifiers, R² for regressors
    fn score(&self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<f64, ScoringError>;

    /// One non-negative weight per feature, summing to 1 (all zero if degenerate)
    fn feature_importances(&self) -> Vec<f64>;

    fn n_features(&self) -> usize;

    fn is_fitted(&self) -> bool;
}

/// Shared input checks for `fit`
pub fn validate_training_data(
    features: &ArrayView2<f64>,
    labels: &ArrayView1<f64>,
) -> Result<(), ScoringError> {
    let (rows, _) = features.dim();
    if rows == 0 {
        return Err(ScoringError::EmptyDataset);
    }
    if labels.len() != rows {
        return Err(ScoringError::LabelMismatch { rows, labels: labels.len() });
    }
    if !features.iter().chain(labels.iter()).all(|v| v.is_finite()) {
        return Err(ScoringError::NonFinite);
    }
    Ok(())
}

/// Shared input check for a single row at predict time
pub fn validate_row(row: &[f64], expected: usize) -> Result<(), ScoringError> {
    if row.len() != expected {
        return Err(ScoringError::DimensionMismatch { expected, actual: row.len() });
    }
    if !row.iter().all(|v| v.is_finite()) {
        return Err(ScoringError::NonFinite);
    }
    Ok(())
}

/// |coefficient| normalized to sum 1
pub fn normalized_magnitudes(coefficients: &[f64]) -> Vec<f64> {
    let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![0.0; coefficients.len()];
    }
    coefficients.iter().map(|c| c.abs() / total).collect()
}

// ============================================================================
// STANDARD SCALER
// ============================================================================

/// Per-column (x - mean) / std. Constant columns keep scale 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(features: &ArrayView2<f64>) -> Self {
        let rows = features.nrows().max(1) as f64;
        let mean = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(features.ncols()));

        let scale = features
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(column, m)| {
                let variance = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / rows;
                let std = variance.sqrt();
                if std > 1e-12 { std } else { 1.0 }
            })
            .collect();

        Self { mean: mean.to_vec(), scale }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, features: &ArrayView2<f64>) -> Array2<f64> {
        let mut scaled = features.to_owned();
        for (mut column, (m, s)) in scaled
            .axis_iter_mut(Axis(1))
            .zip(self.mean.iter().zip(self.scale.iter()))
        {
            column.mapv_inplace(|v| (v - m) / s);
        }
        scaled
    }

    pub fn transform_row(&self, row: &[f64]) -> Array1<f64> {
        row.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}
