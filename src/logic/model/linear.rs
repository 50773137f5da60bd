//! Linear Regressor
//!
//! Ordinary least squares on standard-scaled inputs with a small ridge
//! term, solved in closed form.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::estimator::{
    normalized_magnitudes, validate_row, validate_training_data, ScoringError, ScoringModel,
    StandardScaler,
};

/// Keeps the normal equations solvable when a column is constant
pub const DEFAULT_RIDGE: f64 = 1e-6;

const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub ridge: f64,
    scaler: Option<StandardScaler>,
    weights: Vec<f64>,
    intercept: f64,
}

impl Default for LinearRegressor {
    fn default() -> Self {
        Self::new(DEFAULT_RIDGE)
    }
}

impl LinearRegressor {
    pub fn new(ridge: f64) -> Self {
        Self {
            ridge,
            scaler: None,
            weights: Vec::new(),
            intercept: 0.0,
        }
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, ScoringError> {
        let scaler = self.scaler.as_ref().ok_or(ScoringError::NotFitted)?;
        validate_row(row, self.weights.len())?;

        let scaled = scaler.transform_row(row);
        let prediction = self.intercept
            + scaled
                .iter()
                .zip(self.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        Ok(prediction)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl ScoringModel for LinearRegressor {
    const KIND: &'static str = "linear_regression";

    fn fit(&mut self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<(), ScoringError> {
        validate_training_data(&features, &labels)?;

        let scaler = StandardScaler::fit(&features);
        let x = scaler.transform(&features);
        let y_mean = labels.mean().unwrap_or(0.0);
        let centered = labels.mapv(|v| v - y_mean);

        // Scaled columns are zero-mean, so the intercept is the label mean
        let mut gram = x.t().dot(&x);
        for i in 0..gram.nrows() {
            gram[[i, i]] += self.ridge;
        }
        let rhs = x.t().dot(&centered);
        let weights = solve(gram, rhs)?;

        self.scaler = Some(scaler);
        self.weights = weights.to_vec();
        self.intercept = y_mean;
        Ok(())
    }

    fn score(&self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<f64, ScoringError> {
        validate_training_data(&features, &labels)?;

        let y_mean = labels.mean().unwrap_or(0.0);
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (row, label) in features.outer_iter().zip(labels.iter()) {
            let predicted = self.predict(&row.to_vec())?;
            ss_res += (label - predicted).powi(2);
            ss_tot += (label - y_mean).powi(2);
        }

        if ss_tot <= 0.0 {
            return Ok(if ss_res <= PIVOT_EPSILON { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }

    fn feature_importances(&self) -> Vec<f64> {
        normalized_magnitudes(&self.weights)
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn is_fitted(&self) -> bool {
        self.scaler.is_some()
    }
}

/// Gaussian elimination with partial pivoting
pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ScoringError> {
    let n = b.len();
    if a.dim() != (n, n) {
        return Err(ScoringError::DimensionMismatch { expected: n, actual: a.ncols() });
    }

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < PIVOT_EPSILON {
            return Err(ScoringError::Singular);
        }

        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }

    if !x.iter().all(|v| v.is_finite()) {
        return Err(ScoringError::NonFinite);
    }
    Ok(x)
}
