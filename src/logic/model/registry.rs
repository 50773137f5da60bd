//! Model Registry
//!
//! Built once at process start, handed to the engine by reference.
//! Initialization order is fixed: FloodRisk, then RouteTime.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactStore, FileArtifactStore};
use super::lifecycle::{Model, ModelState, TrainingMetrics, TrainingReport};
use super::variant::{FloodRisk, ModelSpec, ModelVariant, RouteTime};
use crate::logic::config::{EngineConfig, TrainingConfig};
use crate::logic::error::EngineResult;
use crate::logic::telemetry::{HistoricalStore, NullStore, SqliteStore, TelemetryStore};

// ============================================================================
// STORES
// ============================================================================

/// The three collaborators every model needs
#[derive(Clone)]
pub struct Stores {
    pub artifacts: Arc<dyn ArtifactStore>,
    pub history: Arc<dyn HistoricalStore>,
    pub telemetry: Arc<dyn TelemetryStore>,
}

impl Stores {
    /// File artifacts under the data dir; SQLite history/telemetry unless disabled
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let artifacts: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(config.model_dir()));

        if !config.telemetry_enabled {
            log::info!("Telemetry disabled, history and predictions are not stored");
            return Ok(Self::detached(artifacts));
        }

        let sqlite = Arc::new(SqliteStore::open(config.database_path(), config.history_limit)?);
        Ok(Self {
            artifacts,
            history: sqlite.clone(),
            telemetry: sqlite,
        })
    }

    /// Artifacts only; no history, telemetry dropped
    pub fn detached(artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            artifacts,
            history: Arc::new(NullStore),
            telemetry: Arc::new(NullStore),
        }
    }

    pub fn model<V: ModelSpec>(&self, training: &TrainingConfig) -> Model<V> {
        Model::new(
            training.clone(),
            Arc::clone(&self.artifacts),
            Arc::clone(&self.history),
            Arc::clone(&self.telemetry),
        )
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub variant: ModelVariant,
    pub name: String,
    pub state: ModelState,
    pub trained_at: Option<DateTime<Utc>>,
    pub metrics: Option<TrainingMetrics>,
}

impl ModelStatus {
    fn of<V: ModelSpec>(model: &Model<V>) -> Self {
        let current = model.current();
        Self {
            variant: V::VARIANT,
            name: V::VARIANT.display_name().to_string(),
            state: model.state(),
            trained_at: current.as_ref().map(|m| m.trained_at),
            metrics: current.as_ref().map(|m| m.metrics.clone()),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

pub struct ModelRegistry {
    flood: Model<FloodRisk>,
    route: Model<RouteTime>,
}

impl ModelRegistry {
    pub fn new(training: &TrainingConfig, stores: &Stores) -> Self {
        Self {
            flood: stores.model(training),
            route: stores.model(training),
        }
    }

    /// Load (or train) both models, flood first
    pub fn initialize(&self) -> EngineResult<()> {
        self.flood.load()?;
        self.route.load()?;
        log::info!("Model registry initialized");
        Ok(())
    }

    pub fn flood(&self) -> &Model<FloodRisk> {
        &self.flood
    }

    pub fn route(&self) -> &Model<RouteTime> {
        &self.route
    }

    pub fn train(&self, variant: ModelVariant) -> EngineResult<TrainingReport> {
        match variant {
            ModelVariant::FloodRisk => self.flood.train(),
            ModelVariant::RouteTime => self.route.train(),
        }
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        vec![ModelStatus::of(&self.flood), ModelStatus::of(&self.route)]
    }
}
