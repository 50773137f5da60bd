//! Model Artifacts
//!
//! A trained model is persisted as one JSON document per variant. The
//! estimator payload is guarded by a SHA-256 checksum and the feature
//! layout by its version and CRC32 hash.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::lifecycle::TrainingMetrics;
use super::variant::ModelVariant;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no stored {0} model")]
    NotFound(ModelVariant),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{variant} checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        variant: ModelVariant,
        expected: String,
        actual: String,
    },

    #[error("artifact holds a {actual} model, expected {expected}")]
    VariantMismatch {
        expected: ModelVariant,
        actual: ModelVariant,
    },

    #[error("artifact holds a {actual} estimator, expected {expected}")]
    EstimatorMismatch { expected: String, actual: String },
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Persisted form of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub variant: ModelVariant,
    pub estimator_kind: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,
    pub metrics: TrainingMetrics,
    pub trained_at: DateTime<Utc>,
    /// SHA-256 (hex) of the serialized estimator
    pub checksum: String,
    pub estimator: Value,
}

impl ModelArtifact {
    pub fn checksum_of(estimator: &Value) -> Result<String, ArtifactError> {
        let bytes = serde_json::to_vec(estimator)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn verify_checksum(&self) -> Result<(), ArtifactError> {
        let actual = Self::checksum_of(&self.estimator)?;
        if actual != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                variant: self.variant,
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }
}

// ============================================================================
// STORES
// ============================================================================

pub trait ArtifactStore: Send + Sync {
    /// Persist and return a human-readable location
    fn save(&self, artifact: &ModelArtifact) -> Result<String, ArtifactError>;

    /// Load and verify the artifact for `variant`
    fn load(&self, variant: ModelVariant) -> Result<ModelArtifact, ArtifactError>;
}

/// `<dir>/<variant>_model.json`
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, variant: ModelVariant) -> PathBuf {
        self.dir.join(format!("{}_model.json", variant.slug()))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn save(&self, artifact: &ModelArtifact) -> Result<String, ArtifactError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(artifact.variant);

        // Atomic replace
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(artifact)?)?;
        fs::rename(&tmp, &path)?;

        log::info!("{} model saved to {}", artifact.variant, path.display());
        Ok(path.display().to_string())
    }

    fn load(&self, variant: ModelVariant) -> Result<ModelArtifact, ArtifactError> {
        let path = self.path_for(variant);
        if !path.exists() {
            return Err(ArtifactError::NotFound(variant));
        }

        let artifact: ModelArtifact = serde_json::from_slice(&fs::read(&path)?)?;
        if artifact.variant != variant {
            return Err(ArtifactError::VariantMismatch {
                expected: variant,
                actual: artifact.variant,
            });
        }
        artifact.verify_checksum()?;

        log::info!("{} model loaded from {}", variant, path.display());
        Ok(artifact)
    }
}

/// Process-local artifacts, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<ModelVariant, ModelArtifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, variant: ModelVariant) -> bool {
        self.artifacts.lock().contains_key(&variant)
    }

    /// Replace a stored artifact as-is, bypassing checks
    pub fn insert_raw(&self, artifact: ModelArtifact) {
        self.artifacts.lock().insert(artifact.variant, artifact);
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn save(&self, artifact: &ModelArtifact) -> Result<String, ArtifactError> {
        self.artifacts.lock().insert(artifact.variant, artifact.clone());
        Ok(format!("memory://{}", artifact.variant))
    }

    fn load(&self, variant: ModelVariant) -> Result<ModelArtifact, ArtifactError> {
        let artifact = self
            .artifacts
            .lock()
            .get(&variant)
            .cloned()
            .ok_or(ArtifactError::NotFound(variant))?;
        artifact.verify_checksum()?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::lifecycle::DataSource;
    use serde_json::json;
    use tempfile::tempdir;

    fn artifact(variant: ModelVariant) -> ModelArtifact {
        let estimator = json!({ "weights": [0.5, -1.25], "intercept": 0.1 });
        ModelArtifact {
            variant,
            estimator_kind: "linear_regression".to_string(),
            feature_version: 1,
            layout_hash: 0xDEADBEEF,
            feature_names: vec!["a".into(), "b".into()],
            metrics: TrainingMetrics {
                train_score: 0.9,
                test_score: Some(0.8),
                train_samples: 8,
                test_samples: 2,
                data_source: DataSource::Synthetic,
            },
            trained_at: Utc::now(),
            checksum: ModelArtifact::checksum_of(&estimator).unwrap(),
            estimator,
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path().join("models"));
        let saved = artifact(ModelVariant::RouteTime);

        let location = store.save(&saved).unwrap();
        assert!(location.ends_with("route_optimization_model.json"));

        let loaded = store.load(ModelVariant::RouteTime).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());
        assert!(matches!(
            store.load(ModelVariant::FloodRisk),
            Err(ArtifactError::NotFound(ModelVariant::FloodRisk))
        ));
    }

    #[test]
    fn test_file_store_detects_tampering() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());
        store.save(&artifact(ModelVariant::FloodRisk)).unwrap();

        let path = store.path_for(ModelVariant::FloodRisk);
        let text = fs::read_to_string(&path).unwrap().replace("-1.25", "-1.5");
        fs::write(&path, text).unwrap();

        assert!(matches!(
            store.load(ModelVariant::FloodRisk),
            Err(ArtifactError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_file_store_rejects_corrupt_json() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());
        fs::write(store.path_for(ModelVariant::RouteTime), b"{ not json").unwrap();
        assert!(matches!(
            store.load(ModelVariant::RouteTime),
            Err(ArtifactError::Serialization(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryArtifactStore::new();
        assert!(!store.contains(ModelVariant::FloodRisk));

        store.save(&artifact(ModelVariant::FloodRisk)).unwrap();
        assert!(store.contains(ModelVariant::FloodRisk));
        assert!(store.load(ModelVariant::FloodRisk).is_ok());
        assert!(store.load(ModelVariant::RouteTime).is_err());
    }
}
