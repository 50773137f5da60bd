//! Features Module - Feature Contract
//!
//! Canonical ordered inputs per model variant, default-fill and
//! layout versioning. Callers never talk to an estimator with raw maps.

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{
    FeatureSchema, LayoutInfo, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION,
    FLOOD_LAYOUT, FLOOD_SCHEMA, ROUTE_LAYOUT, ROUTE_SCHEMA,
};
pub use vector::{numeric_field, FeatureVector, FilledFeatures, RawFeatures};
