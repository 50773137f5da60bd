//! Telemetry Module
//!
//! Historical training rows in, predictions and model metadata out.
//! Everything written here is best-effort: callers log failures and carry on.
//!
//! ## Structure
//! - `store.rs` - Store traits, records, `NullStore`
//! - `sqlite.rs` - SQLite implementation of both traits

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteStore;
pub use store::{
    FeatureImportance, HistoricalStore, NullStore, PredictionRecord, StoreError, TelemetryStore,
    WeatherImpactRecord,
};
