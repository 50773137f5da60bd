//! # Logistics Risk CLI
//!
//! ## Usage
//!
//! ```bash
//! # Retrain one model
//! logistics-risk train --model flood
//!
//! # Score a request (inline JSON or @file)
//! logistics-risk predict-flood '{"rainfall_mm_24h": 75, "rainfall_mm_72h": 180}'
//! logistics-risk predict-route @route.json
//!
//! # Export sample predictions and scenarios
//! logistics-risk samples --flood 20 --route 20 --scenarios 5 --output-dir ./sample_data
//!
//! # Model catalog and status
//! logistics-risk info --type weather
//! logistics-risk status
//! ```
//!
//! Environment: `RISK_DATA_DIR`, `RISK_DATABASE_PATH`, `RISK_TRAINING_SEED`,
//! `RISK_IMPACT_SEED`, `RISK_TELEMETRY_ENABLED`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use logistics_risk_core::api::{self, SampleRequest};
use logistics_risk_core::constants;
use logistics_risk_core::logic::config::EngineConfig;
use logistics_risk_core::logic::RiskEngine;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "logistics-risk")]
#[command(about = "Flood risk, route time and delivery scenario predictions")]
#[command(version)]
struct Args {
    /// Data directory for model artifacts and the database
    #[arg(long, env = "RISK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Seed for impact jitter and sample inputs
    #[arg(long, env = "RISK_IMPACT_SEED")]
    seed: Option<u64>,

    /// Do not store predictions or read training history
    #[arg(long)]
    no_telemetry: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train (or retrain) a model
    Train {
        /// flood | route
        #[arg(short, long)]
        model: String,
    },

    /// Predict flood probability and logistics impact
    PredictFlood {
        /// JSON object, or @path to a JSON file
        input: String,
    },

    /// Predict route travel time
    PredictRoute {
        /// JSON object, or @path to a JSON file
        input: String,
    },

    /// Generate sample predictions and combined scenarios
    Samples {
        #[arg(long, default_value = "0")]
        flood: usize,

        #[arg(long, default_value = "0")]
        route: usize,

        #[arg(long, default_value = "0")]
        scenarios: usize,

        #[arg(long, default_value = constants::DEFAULT_SAMPLE_DIR)]
        output_dir: PathBuf,
    },

    /// List available models
    Info {
        /// weather | routing
        #[arg(short = 't', long = "type")]
        model_type: Option<String>,
    },

    /// Model status
    Status,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Static catalog; no models needed
    if let Command::Info { model_type } = &args.command {
        return print_json(&api::model_info(model_type.as_deref()));
    }

    let config = build_config(&args);
    let engine = RiskEngine::from_config(&config).context("Failed to start risk engine")?;

    match args.command {
        Command::Train { model } => {
            let response = api::train_model(&engine, &model).map_err(anyhow::Error::msg)?;
            print_json(&response)
        }
        Command::PredictFlood { input } => {
            let raw = read_input(&input)?;
            let envelope = api::predict_flood(&engine, &raw).map_err(anyhow::Error::msg)?;
            print_json(&envelope)
        }
        Command::PredictRoute { input } => {
            let raw = read_input(&input)?;
            let envelope = api::predict_route(&engine, &raw).map_err(anyhow::Error::msg)?;
            print_json(&envelope)
        }
        Command::Samples { flood, route, scenarios, output_dir } => {
            let request = SampleRequest { flood, route, scenarios, output_dir };
            let export = api::generate_samples(&engine, &request).map_err(anyhow::Error::msg)?;
            print_json(&export)
        }
        Command::Status => print_json(&api::get_status(&engine)),
        Command::Info { .. } => Ok(()),
    }
}

fn build_config(args: &Args) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.seed.is_some() {
        config.impact_seed = args.seed;
    }
    if args.no_telemetry {
        config.telemetry_enabled = false;
    }
    config
}

/// Inline JSON, or `@path` to read it from a file
fn read_input(input: &str) -> Result<Value> {
    let text = match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path))?,
        None => input.to_string(),
    };
    serde_json::from_str(&text).context("Input is not valid JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
