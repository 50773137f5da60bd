//! Model Lifecycle
//!
//! One `Model<V>` per variant, generic over `ModelSpec`.
//!
//! ## States
//! - `Unloaded` - nothing installed yet; the first `predict()` calls `load()`
//! - `Ready` - a `TrainedModel` is installed behind the lock
//!
//! `train()` builds a complete model off to the side and installs it with a
//! single write-lock swap. Predictions clone the `Arc` under a read lock and
//! keep the instance they started with.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::artifact::{ArtifactError, ArtifactStore, ModelArtifact};
use super::estimator::{ScoringError, ScoringModel};
use super::variant::{ModelSpec, ModelVariant};
use crate::logic::config::TrainingConfig;
use crate::logic::dataset::Dataset;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::{FeatureSchema, FeatureVector, LayoutMismatchError};
use crate::logic::telemetry::{
    FeatureImportance, HistoricalStore, PredictionRecord, TelemetryStore,
};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Unloaded,
    Ready,
}

/// Where the training rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Historical,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Accuracy (FloodRisk) or R² (RouteTime) on the training split
    pub train_score: f64,
    /// None when the split left no held-out rows
    pub test_score: Option<f64>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub data_source: DataSource,
}

/// Result of one `train()` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub variant: ModelVariant,
    pub model_name: String,
    pub metrics: TrainingMetrics,
    pub feature_importances: Vec<FeatureImportance>,
    /// None when the artifact could not be saved
    pub artifact_location: Option<String>,
    pub trained_at: DateTime<Utc>,
}

/// Fitted estimator plus the exact schema it was fitted on
#[derive(Debug, Clone)]
pub struct TrainedModel<E> {
    pub variant: ModelVariant,
    pub feature_names: Vec<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub estimator: E,
    pub metrics: TrainingMetrics,
    pub trained_at: DateTime<Utc>,
}

impl<E: ScoringModel> TrainedModel<E> {
    pub fn to_artifact(&self) -> Result<ModelArtifact, ArtifactError> {
        let estimator = serde_json::to_value(&self.estimator)?;
        Ok(ModelArtifact {
            variant: self.variant,
            estimator_kind: E::KIND.to_string(),
            feature_version: self.feature_version,
            layout_hash: self.layout_hash,
            feature_names: self.feature_names.clone(),
            metrics: self.metrics.clone(),
            trained_at: self.trained_at,
            checksum: ModelArtifact::checksum_of(&estimator)?,
            estimator,
        })
    }

    /// Rebuild from an artifact, rejecting anything fitted on another layout
    pub fn from_artifact(artifact: ModelArtifact, schema: &FeatureSchema) -> EngineResult<Self> {
        if artifact.estimator_kind != E::KIND {
            return Err(ArtifactError::EstimatorMismatch {
                expected: E::KIND.to_string(),
                actual: artifact.estimator_kind,
            }
            .into());
        }
        schema.validate_layout(artifact.feature_version, artifact.layout_hash)?;

        // Names must match exactly
        if artifact.feature_names != schema.owned_names() {
            return Err(LayoutMismatchError {
                variant: schema.variant,
                expected_version: schema.version,
                expected_hash: schema.layout_hash(),
                actual_version: artifact.feature_version,
                actual_hash: artifact.layout_hash,
            }
            .into());
        }

        let estimator: E = serde_json::from_value(artifact.estimator)?;
        if !estimator.is_fitted() || estimator.n_features() != schema.len() {
            return Err(EngineError::scoring(
                artifact.variant,
                estimator.n_features(),
                ScoringError::DimensionMismatch {
                    expected: schema.len(),
                    actual: estimator.n_features(),
                },
            ));
        }

        Ok(Self {
            variant: artifact.variant,
            feature_names: artifact.feature_names,
            feature_version: artifact.feature_version,
            layout_hash: artifact.layout_hash,
            estimator,
            metrics: artifact.metrics,
            trained_at: artifact.trained_at,
        })
    }

    pub fn importances(&self) -> Vec<FeatureImportance> {
        self.feature_names
            .iter()
            .zip(self.estimator.feature_importances())
            .map(|(name, weight)| FeatureImportance {
                feature: name.clone(),
                weight,
            })
            .collect()
    }
}

/// One scored request
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub variant: ModelVariant,
    /// Probability (FloodRisk) or minutes (RouteTime)
    pub value: f64,
    pub vector: FeatureVector,
    pub defaulted: Vec<&'static str>,
    pub feature_names: Vec<String>,
}

// ============================================================================
// MODEL
// ============================================================================

pub struct Model<V: ModelSpec> {
    current: RwLock<Option<Arc<TrainedModel<V::Estimator>>>>,
    config: TrainingConfig,
    artifacts: Arc<dyn ArtifactStore>,
    history: Arc<dyn HistoricalStore>,
    telemetry: Arc<dyn TelemetryStore>,
    _spec: PhantomData<V>,
}

impl<V: ModelSpec> Model<V> {
    pub fn new(
        config: TrainingConfig,
        artifacts: Arc<dyn ArtifactStore>,
        history: Arc<dyn HistoricalStore>,
        telemetry: Arc<dyn TelemetryStore>,
    ) -> Self {
        Self {
            current: RwLock::new(None),
            config,
            artifacts,
            history,
            telemetry,
            _spec: PhantomData,
        }
    }

    pub fn variant(&self) -> ModelVariant {
        V::VARIANT
    }

    pub fn state(&self) -> ModelState {
        if self.current.read().is_some() {
            ModelState::Ready
        } else {
            ModelState::Unloaded
        }
    }

    /// Currently installed model, if any
    pub fn current(&self) -> Option<Arc<TrainedModel<V::Estimator>>> {
        self.current.read().clone()
    }

    /// Install the stored artifact, or train a fresh model if it is missing or stale
    pub fn load(&self) -> EngineResult<Arc<TrainedModel<V::Estimator>>> {
        let loaded = self
            .artifacts
            .load(V::VARIANT)
            .map_err(EngineError::from)
            .and_then(|artifact| TrainedModel::<V::Estimator>::from_artifact(artifact, V::schema()));

        match loaded {
            Ok(model) => {
                let model = Arc::new(model);
                self.install(Arc::clone(&model));
                log::info!(
                    "{} model ready (trained {}, test score {})",
                    V::VARIANT,
                    model.trained_at,
                    format_score(model.metrics.test_score)
                );
                Ok(model)
            }
            Err(e) => {
                match &e {
                    EngineError::Artifact(ArtifactError::NotFound(_)) => {
                        log::info!("No stored {} model, training a new one", V::VARIANT)
                    }
                    _ => log::warn!("Stored {} model unusable ({}), retraining", V::VARIANT, e),
                }
                let (model, _) = self.fit_and_install()?;
                Ok(model)
            }
        }
    }

    /// Fit on history (or synthetic data), persist, record importances, swap in
    pub fn train(&self) -> EngineResult<TrainingReport> {
        let (_, report) = self.fit_and_install()?;
        Ok(report)
    }

    fn fit_and_install(&self) -> EngineResult<(Arc<TrainedModel<V::Estimator>>, TrainingReport)> {
        let schema = V::schema();
        let (dataset, data_source) = self.training_data();
        let (train, test) = dataset.split(self.config.test_fraction, self.config.seed);

        let mut estimator = V::estimator();
        estimator
            .fit(train.features.view(), train.labels.view())
            .map_err(|e| self.scoring_error(e))?;

        let train_score = estimator
            .score(train.features.view(), train.labels.view())
            .map_err(|e| self.scoring_error(e))?;
        let test_score = if test.is_empty() {
            log::warn!(
                "{} has only {} training rows, no held-out score",
                V::VARIANT,
                train.len()
            );
            None
        } else {
            let score = estimator
                .score(test.features.view(), test.labels.view())
                .map_err(|e| self.scoring_error(e))?;
            Some(score)
        };

        log::info!(
            "{} trained on {} rows ({:?}): train {:.3}, test {}",
            V::VARIANT,
            train.len(),
            data_source,
            train_score,
            format_score(test_score)
        );

        let model = TrainedModel {
            variant: V::VARIANT,
            feature_names: schema.owned_names(),
            feature_version: schema.version,
            layout_hash: schema.layout_hash(),
            estimator,
            metrics: TrainingMetrics {
                train_score,
                test_score,
                train_samples: train.len(),
                test_samples: test.len(),
                data_source,
            },
            trained_at: Utc::now(),
        };

        let artifact_location = match model.to_artifact().and_then(|a| self.artifacts.save(&a)) {
            Ok(location) => Some(location),
            Err(e) => {
                log::error!("Failed to save {} model: {}", V::VARIANT, e);
                None
            }
        };

        let importances = model.importances();
        if let Err(e) = self.telemetry.record_feature_importance(V::VARIANT, &importances) {
            log::error!("Failed to record {} feature importances: {}", V::VARIANT, e);
        }

        let report = TrainingReport {
            variant: V::VARIANT,
            model_name: V::VARIANT.display_name().to_string(),
            metrics: model.metrics.clone(),
            feature_importances: importances,
            artifact_location,
            trained_at: model.trained_at,
        };

        let model = Arc::new(model);
        self.install(Arc::clone(&model));
        Ok((model, report))
    }

    /// History when available, otherwise the seeded synthetic set
    fn training_data(&self) -> (Dataset, DataSource) {
        match self.history.query(V::VARIANT) {
            Ok(records) if !records.is_empty() => match Dataset::from_records(V::schema(), &records) {
                Ok(dataset) => return (dataset, DataSource::Historical),
                Err(e) => log::warn!("Unusable {} training data ({}), using synthetic data", V::VARIANT, e),
            },
            Ok(_) => log::warn!("No {} training data found, using synthetic data", V::VARIANT),
            Err(e) => log::warn!("Error loading {} training data: {}, using synthetic data", V::VARIANT, e),
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        (V::synthesize(&mut rng, self.config.synthetic_samples), DataSource::Synthetic)
    }

    /// Score one raw request. Loads (or trains) first when unloaded.
    pub fn predict(&self, raw: &Value) -> EngineResult<ModelOutput> {
        let model = match self.current() {
            Some(model) => model,
            None => self.load()?,
        };

        let filled = V::schema().fill(raw);
        let value = V::output(&model.estimator, filled.vector.as_slice())
            .map_err(|e| EngineError::scoring(V::VARIANT, filled.vector.len(), e))?;

        Ok(ModelOutput {
            variant: V::VARIANT,
            value,
            vector: filled.vector,
            defaulted: filled.defaulted,
            feature_names: model.feature_names.clone(),
        })
    }

    /// Best-effort write of a served prediction
    pub fn record_prediction(&self, input: &Value, output: Value) {
        let record = PredictionRecord::new(V::VARIANT, input.clone(), output);
        if let Err(e) = self.telemetry.record_prediction(&record) {
            log::error!("Failed to record {} prediction: {}", V::VARIANT, e);
        }
    }

    fn install(&self, model: Arc<TrainedModel<V::Estimator>>) {
        *self.current.write() = Some(model);
    }

    fn scoring_error(&self, source: ScoringError) -> EngineError {
        EngineError::scoring(V::VARIANT, V::schema().len(), source)
    }
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| format!("{:.3}", s))
}
