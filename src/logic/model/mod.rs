//! Model Module - Training & Inference
//!
//! Estimators sit behind `ScoringModel`; `Model<V>` owns the lifecycle for
//! one variant; `ModelRegistry` holds both variants for the engine.

pub mod artifact;
pub mod estimator;
pub mod lifecycle;
pub mod linear;
pub mod logistic;
pub mod peak_hour;
pub mod registry;
pub mod variant;


// Re-export common types
pub use artifact::{ArtifactError, ArtifactStore, FileArtifactStore, MemoryArtifactStore, ModelArtifact};
pub use estimator::{ScoringError, ScoringModel};
pub use lifecycle::{
    DataSource, Model, ModelOutput, ModelState, TrainedModel, TrainingMetrics, TrainingReport,
};
pub use linear::LinearRegressor;
pub use logistic::LogisticClassifier;
pub use peak_hour::PeakHourRegressor;
pub use registry::{ModelRegistry, ModelStatus, Stores};
pub use variant::{FloodRisk, ModelSpec, ModelVariant, RouteTime};
