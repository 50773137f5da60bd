//! Logistic Classifier
//!
//! Binary logistic regression on standard-scaled inputs, fitted with
//! full-batch gradient descent from a zero start. No randomness.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::estimator::{
    normalized_magnitudes, validate_row, validate_training_data, ScoringError, ScoringModel,
    StandardScaler,
};

pub const DEFAULT_LEARNING_RATE: f64 = 4.0;
pub const DEFAULT_EPOCHS: usize = 2000;

/// Positive class when p1 exceeds this
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on weights (intercept excluded)
    pub l2: f64,
    scaler: Option<StandardScaler>,
    weights: Vec<f64>,
    intercept: f64,
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_EPOCHS, 0.0)
    }
}

impl LogisticClassifier {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            scaler: None,
            weights: Vec::new(),
            intercept: 0.0,
        }
    }

    /// `[P(class 0), P(class 1)]` for one row
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ScoringError> {
        let scaler = self.scaler.as_ref().ok_or(ScoringError::NotFitted)?;
        validate_row(row, self.weights.len())?;

        let scaled = scaler.transform_row(row);
        let z = self.intercept + scaled.dot(&Array1::from(self.weights.clone()));
        let positive = sigmoid(z);
        Ok([1.0 - positive, positive])
    }

    pub fn predict(&self, row: &[f64]) -> Result<u8, ScoringError> {
        let [_, positive] = self.predict_proba(row)?;
        Ok(u8::from(positive > DECISION_THRESHOLD))
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl ScoringModel for LogisticClassifier {
    const KIND: &'static str = "logistic_regression";

    fn fit(&mut self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<(), ScoringError> {
        validate_training_data(&features, &labels)?;

        let scaler = StandardScaler::fit(&features);
        let x = scaler.transform(&features);
        let y = labels.mapv(|v| if v > DECISION_THRESHOLD { 1.0 } else { 0.0 });
        let n = x.nrows() as f64;

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;

        for _ in 0..self.epochs {
            let probabilities = (x.dot(&weights) + intercept).mapv(sigmoid);
            let residual = &probabilities - &y;

            let gradient = x.t().dot(&residual) / n + &weights * self.l2;
            let intercept_gradient = residual.sum() / n;

            weights.scaled_add(-self.learning_rate, &gradient);
            intercept -= self.learning_rate * intercept_gradient;
        }

        if !weights.iter().all(|w| w.is_finite()) || !intercept.is_finite() {
            return Err(ScoringError::NonFinite);
        }

        self.scaler = Some(scaler);
        self.weights = weights.to_vec();
        self.intercept = intercept;
        Ok(())
    }

    fn score(&self, features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<f64, ScoringError> {
        validate_training_data(&features, &labels)?;

        let mut correct = 0usize;
        for (row, label) in features.outer_iter().zip(labels.iter()) {
            let predicted = self.predict(&row.to_vec())?;
            if predicted == u8::from(*label > DECISION_THRESHOLD) {
                correct += 1;
            }
        }
        Ok(correct as f64 / labels.len() as f64)
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

/// Numerically stable logistic function
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
