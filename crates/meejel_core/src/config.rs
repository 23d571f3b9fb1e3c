//! Core configuration: log level, evidence policy and grade multipliers.
//!
//! # Invariants
//! - Every field is optional in the file; missing fields take defaults.
//! - A loaded config always yields a complete, valid `GradeTable`.

use crate::model::principle::Grade;
use crate::repo::evidence_repo::EvidencePolicy;
use crate::scoring::grade::{GradeTable, GradeTableError};
use crate::scoring::ScoringEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration loading/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    GradeTable(GradeTableError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::GradeTable(err) => write!(f, "invalid grade_multipliers: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::GradeTable(err) => Some(err),
        }
    }
}

impl From<GradeTableError> for ConfigError {
    fn from(value: GradeTableError) -> Self {
        Self::GradeTable(value)
    }
}

/// Core configuration document.
///
/// ```json
/// {
///   "log_level": "info",
///   "evidence_policy": "permissive",
///   "grade_multipliers": { "Bajo": 1.0, "Medio": 2.0, "Alto": 3.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    pub evidence_policy: EvidencePolicy,
    /// Must name every grade.
    pub grade_multipliers: BTreeMap<Grade, f64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: crate::logging::default_log_level().to_string(),
            evidence_policy: EvidencePolicy::default(),
            grade_multipliers: GradeTable::default().to_map(),
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document. Grade multipliers are checked by
    /// [`CoreConfig::grade_table`], not here.
    pub fn from_json_str(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    pub fn grade_table(&self) -> Result<GradeTable, GradeTableError> {
        GradeTable::from_map(&self.grade_multipliers)
    }

    /// Builds a scoring engine from the configured grade table.
    pub fn scoring_engine(&self) -> Result<ScoringEngine, GradeTableError> {
        Ok(ScoringEngine::new(self.grade_table()?))
    }
}

/// Loads and validates a JSON config file.
///
/// # Errors
/// - `ConfigError::Io` when the file cannot be read.
/// - `ConfigError::Parse` for malformed JSON, unknown fields or labels.
/// - `ConfigError::GradeTable` when multipliers are missing or invalid.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = CoreConfig::from_json_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.grade_table()?;
    Ok(config)
}
