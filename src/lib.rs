//! Project Portfolio Management core library
//!
//! Scores project risks, detects schedule conflicts with timeline events,
//! aggregates the risk heatmap, and imports/exports portfolio data as JSON.

pub mod config;
pub mod conflicts;
pub mod dates;
pub mod error;
pub mod heatmap;
pub mod logging;
pub mod model;
pub mod portfolio;
pub mod register;
pub mod scoring;
pub mod settings;
pub mod summary;
pub mod transfer;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use conflicts::{conflicts_by_project, find_conflicts};
pub use error::ImportError;
pub use heatmap::{RiskHeatmap, build_heatmap};
pub use model::{AppData, Project, Risk, RiskLevel, TimelineEvent};
pub use scoring::{EnrichedRisk, calculate_risk_score, enrich_risks};
pub use settings::{AppSettings, RiskScoringSettings};
pub use transfer::{export_data, import_data};

/// Configuration for the `ppm` command line tool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PpmConfig {
    /// Portfolio data file (export format) the commands read and write
    pub data_file: PathBuf,
    /// Directory receiving `ppm-export-<date>.json` files
    pub export_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Risk register output
    pub risk_register: RiskRegisterConfig,
}

/// Risk register output configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskRegisterConfig {
    /// Column keys (`projectName`, `score`, `customFields.<id>`, ...); empty
    /// means the default column set
    pub columns: Vec<String>,
}

impl Default for PpmConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("ppm-data.json"),
            export_dir: PathBuf::from("."),
            log_filter: "info".to_string(),
            risk_register: RiskRegisterConfig::default(),
        }
    }
}
