//! Runtime configuration for the pricing pipeline

use crate::encoding::factorize::DEFAULT_UNKNOWN_INDEX;
use crate::encoding::scaler::DEFAULT_TARGET_COLUMN;
use crate::errors::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_ARTIFACTS_DIR: &str = "JEWEL_PRICING_ARTIFACTS_DIR";
pub const ENV_LOG_LEVEL: &str = "JEWEL_PRICING_LOG_LEVEL";
pub const ENV_UNKNOWN_CATEGORY: &str = "JEWEL_PRICING_UNKNOWN_CATEGORY";
pub const ENV_EXPECTED_MODEL_HASH: &str = "JEWEL_PRICING_EXPECTED_MODEL_HASH";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub artifacts: ArtifactsConfig,
    pub encoding: EncodingConfig,
    pub logging: LoggingConfig,
}

/// Where the trained artifacts live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory holding all artifact files
    pub dir: PathBuf,
    pub model_file: String,
    pub mappings_file: String,
    pub scaler_file: String,
    pub schema_file: String,
    /// Loaded only when the file exists
    pub encoder_file: String,
    /// Reject a model whose digest differs
    pub expected_model_hash: Option<String>,
}

/// Knobs for the encoding stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Index written for category values missing from the lookup table
    pub unknown_category_index: i64,
    /// Scaler features that are not inputs (the training target)
    pub scaler_exclude: Vec<String>,
    /// Explicit list of columns to scale instead of the scaler's own list
    pub scaled_columns: Option<Vec<String>>,
    /// Clamp scaled values to the scaler's feature range
    pub clip_scaled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Multi-line human readable output
    pub pretty: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model_file: "model.json".to_string(),
            mappings_file: "factorized_mappings.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            schema_file: "one_hot_columns.json".to_string(),
            encoder_file: "one_hot_encoder.json".to_string(),
            expected_model_hash: None,
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            unknown_category_index: DEFAULT_UNKNOWN_INDEX,
            scaler_exclude: vec![DEFAULT_TARGET_COLUMN.to_string()],
            scaled_columns: None,
            clip_scaled: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pretty: false,
        }
    }
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn mappings_path(&self) -> PathBuf {
        self.dir.join(&self.mappings_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(&self.schema_file)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(&self.encoder_file)
    }
}

impl PricingConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            PricingError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: PricingConfig = toml::from_str(&content).map_err(|e| {
            PricingError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Write configuration as TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PricingError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `JEWEL_PRICING_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; unparsable values are errors
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_ARTIFACTS_DIR) {
            self.artifacts.dir = PathBuf::from(dir);
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        if let Some(val) = lookup(ENV_UNKNOWN_CATEGORY) {
            self.encoding.unknown_category_index = val.trim().parse().map_err(|e| {
                PricingError::Config(format!("{ENV_UNKNOWN_CATEGORY}={val:?}: {e}"))
            })?;
        }

        if let Some(hash) = lookup(ENV_EXPECTED_MODEL_HASH) {
            self.artifacts.expected_model_hash = Some(hash.trim().to_string());
        }

        Ok(())
    }

    /// Return non-fatal warnings; hard errors are reported as `Err`
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if let Some(hash) = &self.artifacts.expected_model_hash {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(PricingError::Config(format!(
                    "expected_model_hash must be 64 hex characters, got {hash:?}"
                )));
            }
        }

        if let Some(columns) = &self.encoding.scaled_columns {
            if columns.is_empty() {
                warnings.push("scaled_columns is empty; no column will be scaled".to_string());
            }
            if columns.iter().any(|c| self.encoding.scaler_exclude.contains(c)) {
                warnings.push("scaled_columns overlaps scaler_exclude".to_string());
            }
        }

        if self.encoding.unknown_category_index >= 0 {
            warnings.push(format!(
                "unknown_category_index {} may collide with a real category index",
                self.encoding.unknown_category_index
            ));
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(warnings)
    }
}
