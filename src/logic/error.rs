//! Engine-level error type

use thiserror::Error;

use crate::logic::features::LayoutMismatchError;
use crate::logic::model::artifact::ArtifactError;
use crate::logic::model::estimator::ScoringError;
use crate::logic::model::ModelVariant;
use crate::logic::telemetry::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Fit or predict failed. Never retried.
    #[error("{variant} scoring failed with {feature_count} features: {source}")]
    Scoring {
        variant: ModelVariant,
        feature_count: usize,
        source: ScoringError,
    },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown model type: {0}")]
    UnknownModel(String),
}

impl EngineError {
    pub fn scoring(variant: ModelVariant, feature_count: usize, source: ScoringError) -> Self {
        EngineError::Scoring { variant, feature_count, source }
    }
}
