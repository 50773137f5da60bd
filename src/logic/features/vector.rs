//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Callers hand in arbitrary JSON mappings. `FeatureSchema::fill` turns them
//! into a complete vector in canonical order: missing or malformed fields
//! become `0.0` and are reported back as `defaulted`, never as an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::{FeatureSchema, LayoutMismatchError};
use crate::logic::model::ModelVariant;

/// Raw caller input: feature name → JSON value
pub type RawFeatures = serde_json::Map<String, Value>;

/// Value substituted for missing features
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub variant: ModelVariant,
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in schema order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Create a zeroed vector for a schema
    pub fn zeroed(schema: &FeatureSchema) -> Self {
        Self::from_values(schema, vec![DEFAULT_FEATURE_VALUE; schema.len()])
    }

    /// Create from raw values (truncates or zero-pads to the schema length)
    pub fn from_values(schema: &FeatureSchema, mut values: Vec<f64>) -> Self {
        values.resize(schema.len(), DEFAULT_FEATURE_VALUE);
        Self {
            variant: schema.variant,
            version: schema.version,
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        FeatureSchema::for_variant(self.variant)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.schema().index_of(name).and_then(|i| self.get(i))
    }

    /// Set feature by name; returns false for names outside the schema
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        match self.schema().index_of(name) {
            Some(index) if index < self.values.len() => {
                self.values[index] = value;
                true
            }
            _ => false,
        }
    }

    /// Validate that this vector is compatible with the current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        self.schema().validate_layout(self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Named values in schema order, for telemetry records
    pub fn to_named_map(&self) -> RawFeatures {
        self.schema()
            .names
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.to_string(), Value::from(*value)))
            .collect()
    }
}

// ============================================================================
// DEFAULT FILL
// ============================================================================

/// Complete vector plus the names that had to be defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct FilledFeatures {
    pub vector: FeatureVector,
    pub defaulted: Vec<&'static str>,
}

impl FilledFeatures {
    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }
}

impl FeatureSchema {
    /// Build a complete vector from arbitrary input. Never fails.
    pub fn fill(&self, raw: &Value) -> FilledFeatures {
        let mut values = Vec::with_capacity(self.len());
        let mut defaulted = Vec::new();

        for &name in self.names {
            match numeric_field(raw, name) {
                Some(value) => values.push(value),
                None => {
                    values.push(DEFAULT_FEATURE_VALUE);
                    defaulted.push(name);
                }
            }
        }

        if !defaulted.is_empty() {
            log::warn!(
                "{}: {} feature(s) defaulted to {}: {:?}",
                self.variant,
                defaulted.len(),
                DEFAULT_FEATURE_VALUE,
                defaulted
            );
        }

        FilledFeatures {
            vector: FeatureVector::from_values(self, values),
            defaulted,
        }
    }
}

/// Read one numeric field from a JSON mapping.
///
/// Numbers, booleans and numeric strings are accepted; anything else
/// (including non-finite values) is treated as absent.
pub fn numeric_field(raw: &Value, name: &str) -> Option<f64> {
    let value = raw.as_object()?.get(name)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

// ============================================================================
// TESTS
// ============================================================================
