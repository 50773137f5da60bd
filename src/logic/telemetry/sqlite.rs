//! SQLite-backed history and telemetry store
//!
//! The connection is opened lazily and re-opened after `close()`.
//! Every write runs in its own transaction; a failed statement rolls the
//! whole write back when the transaction is dropped.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value};

use super::store::{
    FeatureImportance, HistoricalStore, PredictionRecord, StoreError, TelemetryStore,
    WeatherImpactRecord,
};
use crate::logic::dataset::TrainingRecord;
use crate::logic::model::ModelVariant;

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Labeled history used for training
CREATE TABLE IF NOT EXISTS training_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_type TEXT NOT NULL,
    time_point TEXT NOT NULL,
    features TEXT NOT NULL,
    labels TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_training_data_type_time
    ON training_data (data_type, time_point DESC);

-- Served predictions
CREATE TABLE IF NOT EXISTS model_predictions (
    id TEXT PRIMARY KEY,
    data_type TEXT NOT NULL,
    model_name TEXT NOT NULL,
    prediction_type TEXT NOT NULL,
    confidence REAL NOT NULL,
    input_data TEXT NOT NULL,
    prediction_data TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Latest importances per training run
CREATE TABLE IF NOT EXISTS feature_importance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_type TEXT NOT NULL,
    feature_name TEXT NOT NULL,
    importance_value REAL NOT NULL,
    recorded_at TEXT NOT NULL
);

-- Disruption windows from high-risk flood predictions
CREATE TABLE IF NOT EXISTS weather_impacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type TEXT NOT NULL,
    region TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    impact_score REAL NOT NULL,
    affected_routes INTEGER NOT NULL,
    delay_minutes INTEGER NOT NULL,
    alternate_routes TEXT NOT NULL
);
"#;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

pub struct SqliteStore {
    location: Location,
    history_limit: usize,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file. The schema is applied immediately.
    pub fn open(path: impl Into<PathBuf>, history_limit: usize) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            location: Location::File(path),
            history_limit,
            conn: Mutex::new(None),
        };
        store.with_connection(|_| Ok(()))?;
        Ok(store)
    }

    /// Private in-memory database. Contents are lost on `close()`.
    pub fn in_memory(history_limit: usize) -> Result<Self, StoreError> {
        let store = Self {
            location: Location::Memory,
            history_limit,
            conn: Mutex::new(None),
        };
        store.with_connection(|_| Ok(()))?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = match &self.location {
            Location::File(path) => Connection::open(path)?,
            Location::Memory => Connection::open_in_memory()?,
        };
        conn.execute_batch(SCHEMA_SQL)?;

        match &self.location {
            Location::File(path) => log::info!("Store connected: {}", path.display()),
            Location::Memory => log::debug!("Store connected: in-memory"),
        }
        Ok(conn)
    }

    /// Run `f` on the shared connection, reconnecting first if needed
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let conn = guard.as_mut().ok_or(StoreError::Unavailable)?;
        f(conn)
    }

    /// Drop the connection; the next call reconnects
    pub fn close(&self) {
        if self.conn.lock().take().is_some() {
            log::info!("Store connection closed");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Append one labeled row to the history for `variant`
    pub fn insert_training_record(
        &self,
        variant: ModelVariant,
        record: &TrainingRecord,
    ) -> Result<(), StoreError> {
        let features = serde_json::to_string(&record.features)?;
        let labels = serde_json::to_string(&json!({ variant.label_name(): record.label }))?;
        let time_point = timestamp(record.recorded_at.unwrap_or_else(Utc::now));

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO training_data (data_type, time_point, features, labels)
                 VALUES (?1, ?2, ?3, ?4)",
                params![variant.slug(), time_point, features, labels],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn count_predictions(&self, variant: ModelVariant) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM model_predictions WHERE data_type = ?1", variant.slug())
    }

    pub fn count_weather_impacts(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM weather_impacts WHERE event_type = ?1", "flood")
    }

    /// Most recent prediction for a variant
    pub fn latest_prediction(&self, variant: ModelVariant) -> Result<Option<PredictionRecord>, StoreError> {
        let row = self.with_connection(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, model_name, prediction_type, confidence, input_data, prediction_data, created_at
                     FROM model_predictions WHERE data_type = ?1
                     ORDER BY created_at DESC LIMIT 1",
                    params![variant.slug()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, f64>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, String>(5)?,
                            row.get::<_, String>(6)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((id, model_name, prediction_type, confidence, input, output, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(PredictionRecord {
            id: id.parse().unwrap_or_default(),
            variant,
            model_name,
            prediction_type,
            confidence,
            input: serde_json::from_str(&input)?,
            output: serde_json::from_str(&output)?,
            created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        }))
    }

    /// Importances from the most recent training run
    pub fn feature_importances(&self, variant: ModelVariant) -> Result<Vec<FeatureImportance>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT feature_name, importance_value FROM feature_importance
                 WHERE data_type = ?1
                   AND recorded_at = (SELECT MAX(recorded_at) FROM feature_importance WHERE data_type = ?1)
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![variant.slug()], |row| {
                Ok(FeatureImportance {
                    feature: row.get(0)?,
                    weight: row.get(1)?,
                })
            })?;
            let importances = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(importances)
        })
    }

    fn count(&self, sql: &str, key: &str) -> Result<usize, StoreError> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(sql, params![key], |row| row.get(0))?;
            Ok(count.max(0) as usize)
        })
    }
}

impl HistoricalStore for SqliteStore {
    fn query(&self, variant: ModelVariant) -> Result<Vec<TrainingRecord>, StoreError> {
        let limit = i64::try_from(self.history_limit).unwrap_or(i64::MAX);
        let rows = self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT time_point, features, labels FROM training_data
                 WHERE data_type = ?1
                 ORDER BY time_point DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![variant.slug(), limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            let rows = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for (time_point, features, labels) in rows {
            match decode_training_row(variant, &features, &labels) {
                Some((features, label)) => records.push(TrainingRecord {
                    features,
                    label,
                    recorded_at: parse_timestamp(&time_point),
                }),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} malformed {} training rows", skipped, variant);
        }
        log::info!("Loaded {} {} training rows", records.len(), variant);
        Ok(records)
    }
}

impl TelemetryStore for SqliteStore {
    fn record_prediction(&self, record: &PredictionRecord) -> Result<(), StoreError> {
        let input = serde_json::to_string(&record.input)?;
        let output = serde_json::to_string(&record.output)?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO model_predictions
                 (id, data_type, model_name, prediction_type, confidence, input_data, prediction_data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id.to_string(),
                    record.variant.slug(),
                    record.model_name,
                    record.prediction_type,
                    record.confidence,
                    input,
                    output,
                    timestamp(record.created_at),
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    fn record_feature_importance(
        &self,
        variant: ModelVariant,
        importances: &[FeatureImportance],
    ) -> Result<(), StoreError> {
        let recorded_at = timestamp(Utc::now());

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO feature_importance (data_type, feature_name, importance_value, recorded_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for item in importances {
                    stmt.execute(params![variant.slug(), item.feature, item.weight, recorded_at])?;
                }
            }
            tx.commit()?;
            log::info!("Saved feature importances for {} features", importances.len());
            Ok(())
        })
    }

    fn record_weather_impact(&self, record: &WeatherImpactRecord) -> Result<(), StoreError> {
        let alternates = serde_json::to_string(&record.alternate_routes)?;
        let affected = i64::try_from(record.affected_routes).unwrap_or(i64::MAX);

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO weather_impacts
                 (event_type, region, start_time, end_time, impact_score, affected_routes, delay_minutes, alternate_routes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.event_type,
                    record.region,
                    timestamp(record.start_time),
                    timestamp(record.end_time),
                    record.impact_score,
                    affected,
                    record.delay_minutes,
                    alternates,
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Fixed-width UTC timestamps sort lexicographically
fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn decode_training_row(variant: ModelVariant, features: &str, labels: &str) -> Option<(Value, f64)> {
    let features: Value = serde_json::from_str(features).ok()?;
    let labels: Value = serde_json::from_str(labels).ok()?;
    let label = labels.get(variant.label_name())?.as_f64()?;
    label.is_finite().then_some((features, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn record(distance: f64, label: f64, minutes_ago: i64) -> TrainingRecord {
        TrainingRecord::new(json!({ "distance_km": distance }), label)
            .at(Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn test_empty_history() {
        let store = SqliteStore::in_memory(100).unwrap();
        assert!(store.query(ModelVariant::FloodRisk).unwrap().is_empty());
    }

    #[test]
    fn test_history_newest_first_and_limited() {
        let store = SqliteStore::in_memory(2).unwrap();
        store.insert_training_record(ModelVariant::RouteTime, &record(1.0, 10.0, 30)).unwrap();
        store.insert_training_record(ModelVariant::RouteTime, &record(2.0, 20.0, 10)).unwrap();
        store.insert_training_record(ModelVariant::RouteTime, &record(3.0, 30.0, 20)).unwrap();
        store.insert_training_record(ModelVariant::FloodRisk, &record(9.0, 1.0, 0)).unwrap();

        let rows = store.query(ModelVariant::RouteTime).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, 20.0);
        assert_eq!(rows[1].label, 30.0);
        assert_eq!(rows[0].features["distance_km"], json!(2.0));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let store = SqliteStore::in_memory(100).unwrap();
        store.insert_training_record(ModelVariant::FloodRisk, &record(1.0, 1.0, 0)).unwrap();
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO training_data (data_type, time_point, features, labels)
                     VALUES ('flood_prediction', '2020-01-01T00:00:00.000000Z', '{}', '{\"other\": 1}')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.query(ModelVariant::FloodRisk).unwrap().len(), 1);
    }

    #[test]
    fn test_reconnects_after_close() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("db").join("risk.db"), 100).unwrap();
        store.insert_training_record(ModelVariant::FloodRisk, &record(1.0, 0.0, 0)).unwrap();

        store.close();
        assert!(!store.is_connected());

        let rows = store.query(ModelVariant::FloodRisk).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.is_connected());
    }

    #[test]
    fn test_prediction_round_trip() {
        let store = SqliteStore::in_memory(100).unwrap();
        let record = PredictionRecord::new(
            ModelVariant::RouteTime,
            json!({ "distance_km": 15 }),
            json!({ "travel_time_minutes": 42.5 }),
        );
        store.record_prediction(&record).unwrap();

        assert_eq!(store.count_predictions(ModelVariant::RouteTime).unwrap(), 1);
        assert_eq!(store.count_predictions(ModelVariant::FloodRisk).unwrap(), 0);

        let loaded = store.latest_prediction(ModelVariant::RouteTime).unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.confidence, 0.89);
        assert_eq!(loaded.output, record.output);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let store = SqliteStore::in_memory(100).unwrap();
        let record = PredictionRecord::new(ModelVariant::FloodRisk, json!({}), json!({}));
        store.record_prediction(&record).unwrap();

        // Same primary key: the insert fails and nothing new is committed
        assert!(store.record_prediction(&record).is_err());
        assert_eq!(store.count_predictions(ModelVariant::FloodRisk).unwrap(), 1);
    }

    #[test]
    fn test_feature_importances_latest_run() {
        let store = SqliteStore::in_memory(100).unwrap();
        let run = vec![
            FeatureImportance { feature: "distance_km".into(), weight: 0.75 },
            FeatureImportance { feature: "traffic_index".into(), weight: 0.25 },
        ];
        store.record_feature_importance(ModelVariant::RouteTime, &run).unwrap();

        assert_eq!(store.feature_importances(ModelVariant::RouteTime).unwrap(), run);
        assert!(store.feature_importances(ModelVariant::FloodRisk).unwrap().is_empty());
    }

    #[test]
    fn test_weather_impact_insert() {
        let store = SqliteStore::in_memory(100).unwrap();
        let mut impact = WeatherImpactRecord::flood("Penrith", 0.9, 48);
        impact.affected_routes = 3;
        impact.alternate_routes = json!({ "availability": "limited", "affected_areas": ["Penrith"] });

        store.record_weather_impact(&impact).unwrap();
        assert_eq!(store.count_weather_impacts().unwrap(), 1);
        assert_eq!(impact.end_time - impact.start_time, Duration::hours(48));
    }
}
