//! Logic Module - Prediction pipeline
//!
//! ## Layout
//! - `features/` - Feature contract (ordered names, defaulting, layout hash)
//! - `synthetic/` - Seeded training sets and sample request inputs
//! - `model/` - Estimators, lifecycle, artifacts, registry
//! - `impact/` - Flood probability → operational impact
//! - `scenario/` - Region-level fusion of both forecasts
//! - `telemetry/` - History in, predictions out (SQLite)
//! - `engine` - Request orchestration

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod features;
pub mod impact;
pub mod model;
pub mod regions;
pub mod scenario;
pub mod synthetic;
pub mod telemetry;

pub use engine::{FloodForecast, RiskEngine, RouteForecast};
pub use error::{EngineError, EngineResult};
