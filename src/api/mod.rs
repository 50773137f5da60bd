//! API Module
//!
//! Structure:
//! - commands.rs: engine operations with caller-facing envelopes
//! - model_info.rs: static model catalog

pub mod commands;
pub mod model_info;

pub use commands::*;
pub use model_info::{model_info, ModelCatalog, ModelInfo};
