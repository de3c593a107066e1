use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contractor::{ContractionLimits, OrderOptimizer, DEFAULT_MAX_LOG2_SIZE};
use crate::overlap::{CheckOptions, DEFAULT_TOLERANCE};

/// Largest qubit count checked by default.
pub const DEFAULT_MAX_QUBITS: usize = 40;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings of a batch run.
///
/// Every field has a default, so a JSON config file only needs to name the
/// settings it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of original circuits.
    pub before_dir: PathBuf,
    /// Directory of rewritten circuits.
    pub after_dir: PathBuf,
    /// CSV report destination.
    pub report_path: PathBuf,
    /// Pairs wider than this are skipped.
    pub max_qubits: usize,
    /// Largest accepted `|overlap - 1|`.
    pub tolerance: f64,
    /// Largest intermediate tensor, as log2 of its element count.
    pub max_log2_size: f64,
    /// Contraction order search: `greedy`, `treesa` or `auto`.
    pub optimizer: OrderOptimizer,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            before_dir: PathBuf::from("bef"),
            after_dir: PathBuf::from("aft"),
            report_path: PathBuf::from("results.csv"),
            max_qubits: DEFAULT_MAX_QUBITS,
            tolerance: DEFAULT_TOLERANCE,
            max_log2_size: DEFAULT_MAX_LOG2_SIZE,
            optimizer: OrderOptimizer::default(),
        }
    }
}

impl Config {
    /// Read a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if !(self.max_log2_size.is_finite() && self.max_log2_size >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_log2_size must be a non-negative number, got {}",
                self.max_log2_size
            )));
        }
        if self.before_dir == self.after_dir {
            return Err(ConfigError::Invalid(format!(
                "before and after directories are both {}",
                self.before_dir.display()
            )));
        }
        Ok(())
    }

    /// Options for each equivalence check of the run.
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            tolerance: self.tolerance,
            limits: ContractionLimits {
                max_log2_size: self.max_log2_size,
                optimizer: self.optimizer,
            },
        }
    }
}
