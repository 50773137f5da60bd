//! Logistics Risk Core
//!
//! Flood-risk classification, route-time regression, operational impact
//! derivation and region-level scenario fusion for a delivery network.

pub mod api;
pub mod constants;
pub mod logic;
