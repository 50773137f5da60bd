//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema of both models**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Persisted artifacts carry the layout hash; a mismatch forces a retrain.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::model::ModelVariant;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when a layout changes
pub const FEATURE_VERSION: u8 = 1;

/// Features per variant
pub const FEATURE_COUNT: usize = 10;

// ============================================================================
// FEATURE LAYOUTS (Authoritative source)
// ============================================================================

/// Flood risk inputs, in estimator order
pub const FLOOD_LAYOUT: [&str; FEATURE_COUNT] = [
    "rainfall_mm_24h",        // 0: Rain over the last 24h
    "rainfall_mm_72h",        // 1: Rain over the last 72h
    "river_level_m",          // 2: Nearest river gauge
    "soil_moisture",          // 3: Saturation 0-1
    "temperature_c",          // 4
    "wind_speed_kmh",         // 5
    "elevation_m",            // 6: Site elevation
    "distance_to_river_km",   // 7
    "impervious_surface_pct", // 8: Urban sealing 0-100
    "drainage_capacity",      // 9: 0 (none) - 1 (full)
];

/// Route travel-time inputs, in estimator order
pub const ROUTE_LAYOUT: [&str; FEATURE_COUNT] = [
    "time_of_day",        // 0: Hour 0-23
    "day_of_week",        // 1: 0 = Monday
    "is_holiday",         // 2: 0/1
    "rainfall_mm",        // 3
    "temperature",        // 4
    "traffic_index",      // 5: 0-100
    "road_type",          // 6: 1 highway, 2 major, 3 local
    "distance_km",        // 7
    "construction_zones", // 8
    "special_events",     // 9: 0/1
];

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered feature names for one model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub variant: ModelVariant,
    pub version: u8,
    pub names: &'static [&'static str],
}

pub static FLOOD_SCHEMA: FeatureSchema = FeatureSchema {
    variant: ModelVariant::FloodRisk,
    version: FEATURE_VERSION,
    names: &FLOOD_LAYOUT,
};

pub static ROUTE_SCHEMA: FeatureSchema = FeatureSchema {
    variant: ModelVariant::RouteTime,
    version: FEATURE_VERSION,
    names: &ROUTE_LAYOUT,
};

impl FeatureSchema {
    pub fn for_variant(variant: ModelVariant) -> &'static FeatureSchema {
        match variant {
            ModelVariant::FloodRisk => &FLOOD_SCHEMA,
            ModelVariant::RouteTime => &ROUTE_SCHEMA,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// CRC32 over version, variant and ordered names
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.version]);
        hasher.update(self.variant.slug().as_bytes());
        hasher.update(&[0]);

        for name in self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    /// Get feature index by name (O(n) but features are few)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    /// Get feature name by index
    pub fn name_at(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    pub fn owned_names(&self) -> Vec<String> {
        self.names.iter().map(|s| s.to_string()).collect()
    }

    /// Validate that persisted data matches this layout
    pub fn validate_layout(&self, version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
        let current_hash = self.layout_hash();

        if version != self.version || hash != current_hash {
            return Err(LayoutMismatchError {
                variant: self.variant,
                expected_version: self.version,
                expected_hash: current_hash,
                actual_version: version,
                actual_hash: hash,
            });
        }

        Ok(())
    }

    pub fn is_compatible(&self, version: u8, hash: u32) -> bool {
        self.validate_layout(version, hash).is_ok()
    }

    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo {
            variant: self.variant,
            version: self.version,
            hash: self.layout_hash(),
            feature_count: self.len(),
            feature_names: self.owned_names(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub variant: ModelVariant,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, Error)]
#[error(
    "{variant} feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub variant: ModelVariant,
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================
