//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment; see `EngineConfig::from_env`.

use std::path::PathBuf;

/// Default seed for synthetic data generation and the train/test split
pub const DEFAULT_TRAINING_SEED: u64 = 42;

/// Rows generated per variant when no history exists
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 1000;

/// Share of rows held out for the test score
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Maximum historical rows fetched per variant
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

/// Application data directory name (under the local data dir)
pub const APP_DIR_NAME: &str = "logistics-risk";

/// SQLite file name inside the data directory
pub const DATABASE_FILE: &str = "logistics_risk.db";

/// Model artifact sub-directory
pub const MODEL_DIR_NAME: &str = "models";

/// Region recorded for weather impacts when the request names none
pub const DEFAULT_REGION_LABEL: &str = "Western Sydney";

/// Default directory for exported sample data
pub const DEFAULT_SAMPLE_DIR: &str = "./sample_data";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Base data directory from environment or the platform default
pub fn get_data_dir() -> PathBuf {
    std::env::var("RISK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
}

/// SQLite path from environment, if explicitly set
pub fn get_database_path() -> Option<PathBuf> {
    std::env::var("RISK_DATABASE_PATH").ok().map(PathBuf::from)
}

/// Training seed from environment or default
pub fn get_training_seed() -> u64 {
    std::env::var("RISK_TRAINING_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TRAINING_SEED)
}

/// Impact jitter seed from environment (unset = seeded from OS entropy)
pub fn get_impact_seed() -> Option<u64> {
    std::env::var("RISK_IMPACT_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Check if telemetry persistence is enabled
pub fn is_telemetry_enabled() -> bool {
    std::env::var("RISK_TELEMETRY_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
