//! Engine Configuration
//!
//! Paths, seeds and training parameters.
//! Loaded from environment at process start or built in code (tests, presets).

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::constants;

// ============================================================================
// TRAINING CONFIG
// ============================================================================

/// Parameters shared by every model lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Seed for synthetic generation and the train/test split
    pub seed: u64,
    /// Synthetic rows per variant
    pub synthetic_samples: usize,
    /// Held-out share for the test score
    pub test_fraction: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: constants::DEFAULT_TRAINING_SEED,
            synthetic_samples: constants::DEFAULT_SYNTHETIC_SAMPLES,
            test_fraction: constants::DEFAULT_TEST_FRACTION,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root directory for artifacts and the database
    pub data_dir: PathBuf,
    /// Explicit SQLite path (defaults to `data_dir/logistics_risk.db`)
    pub database_path: Option<PathBuf>,
    /// Training parameters
    pub training: TrainingConfig,
    /// Seed for impact jitter; `None` seeds from OS entropy
    pub impact_seed: Option<u64>,
    /// Persist predictions and feature importances
    pub telemetry_enabled: bool,
    /// Historical rows fetched per variant
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(constants::APP_DIR_NAME);

        Self {
            data_dir,
            database_path: None,
            training: TrainingConfig::default(),
            impact_seed: None,
            telemetry_enabled: true,
            history_limit: constants::DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            data_dir: constants::get_data_dir(),
            database_path: constants::get_database_path(),
            training: TrainingConfig {
                seed: constants::get_training_seed(),
                ..Default::default()
            },
            impact_seed: constants::get_impact_seed(),
            telemetry_enabled: constants::is_telemetry_enabled(),
            history_limit: constants::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Fully reproducible, file-backed config rooted at `dir`
    pub fn reproducible(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            impact_seed: Some(constants::DEFAULT_TRAINING_SEED),
            ..Default::default()
        }
    }

    /// Directory holding model artifacts
    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join(constants::MODEL_DIR_NAME)
    }

    /// Resolved SQLite path
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(constants::DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_training_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.synthetic_samples, 1000);
        assert!((config.test_fraction - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_paths_resolve_under_data_dir() {
        let config = EngineConfig::reproducible("/tmp/risk");
        assert_eq!(config.model_dir(), PathBuf::from("/tmp/risk/models"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/risk/logistics_risk.db"));
        assert_eq!(config.impact_seed, Some(42));
    }

    #[test]
    fn test_synthetic_size_is_fixed() {
        std::env::set_var("RISK_SYNTHETIC_SAMPLES", "50");
        let config = EngineConfig::from_env();
        std::env::remove_var("RISK_SYNTHETIC_SAMPLES");
        assert_eq!(config.training.synthetic_samples, constants::DEFAULT_SYNTHETIC_SAMPLES);
    }
}
