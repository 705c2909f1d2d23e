//! Loading and cross-checking the trained artifacts
//!
//! A bundle is the model plus everything needed to build its input: the
//! factorization tables, the min-max scaler, the ordered output columns and
//! optionally a persisted one-hot encoder. Artifacts are produced by the
//! training side and only read here.

use crate::config::ArtifactsConfig;
use crate::encoding::{FactorizationMapping, FeatureSchema, MinMaxScaler, OneHotEncoder};
use crate::errors::{PricingError, Result};
use crate::gbdt::Model;
use crate::serde_canon::hash_canonical_hex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Digest of one artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    pub name: &'static str,
    pub path: PathBuf,
    pub blake3: String,
}

/// Digests of every artifact in a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactManifest {
    pub artifacts: Vec<ArtifactDigest>,
}

impl ArtifactManifest {
    pub fn digest(&self, name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.blake3.as_str())
    }
}

/// Everything the predictor needs, validated together
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub model: Model,
    pub mappings: FactorizationMapping,
    pub scaler: MinMaxScaler,
    pub schema: FeatureSchema,
    pub encoder: Option<OneHotEncoder>,
    paths: ArtifactsConfig,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        PricingError::Artifact(format!("cannot read {} at {}: {}", what, path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        PricingError::Artifact(format!("cannot parse {} at {}: {}", what, path.display(), e))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

impl ArtifactBundle {
    /// Assemble a bundle from in-memory artifacts and validate it
    pub fn new(
        model: Model,
        mappings: FactorizationMapping,
        scaler: MinMaxScaler,
        schema: FeatureSchema,
        encoder: Option<OneHotEncoder>,
    ) -> Result<Self> {
        let bundle = Self {
            model,
            mappings,
            scaler,
            schema,
            encoder,
            paths: ArtifactsConfig::default(),
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Load every artifact named by `config` and validate them together
    #[instrument(skip(config), fields(dir = %config.dir.display()))]
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        let model: Model = read_json(&config.model_path(), "model")?;
        let mappings: FactorizationMapping =
            read_json(&config.mappings_path(), "factorization mappings")?;
        let scaler: MinMaxScaler = read_json(&config.scaler_path(), "scaler")?;
        let schema: FeatureSchema = read_json(&config.schema_path(), "one-hot columns")?;

        let encoder_path = config.encoder_path();
        let encoder = if encoder_path.exists() {
            debug!(path = %encoder_path.display(), "using persisted one-hot encoder");
            Some(read_json(&encoder_path, "one-hot encoder")?)
        } else {
            None
        };

        let bundle = Self {
            model,
            mappings,
            scaler,
            schema,
            encoder,
            paths: config.clone(),
        };
        bundle.validate()?;

        if let Some(expected) = &config.expected_model_hash {
            let actual = bundle.model.hash_hex()?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(PricingError::Artifact(format!(
                    "model hash mismatch: expected {expected}, found {actual}"
                )));
            }
        }

        info!(
            trees = bundle.model.num_trees(),
            features = bundle.schema.len(),
            encoder = bundle.encoder.is_some(),
            "artifacts loaded"
        );
        Ok(bundle)
    }

    /// Check each artifact and the agreements between them
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.mappings.validate()?;
        self.scaler.validate()?;
        self.schema.validate()?;

        let width = self.schema.len();
        if let Some(n) = self.model.num_features {
            if n != width {
                return Err(PricingError::Artifact(format!(
                    "model expects {n} features but the column list has {width}"
                )));
            }
        }
        if let Some(names) = &self.model.feature_names {
            if names.as_slice() != self.schema.columns() {
                return Err(PricingError::Artifact(
                    "model feature names differ from the one-hot column list".into(),
                ));
            }
        }
        if let Some(max) = self.model.max_feature_index() {
            if max >= width {
                return Err(PricingError::Artifact(format!(
                    "model splits on feature {max} but only {width} columns are produced"
                )));
            }
        }
        Ok(())
    }

    /// Write the bundle as JSON files under `config.dir`
    pub fn save(&self, config: &ArtifactsConfig) -> Result<()> {
        fs::create_dir_all(&config.dir)?;
        self.model.save_json(config.model_path())?;
        write_json(&config.mappings_path(), &self.mappings)?;
        write_json(&config.scaler_path(), &self.scaler)?;
        write_json(&config.schema_path(), &self.schema)?;
        if let Some(encoder) = &self.encoder {
            write_json(&config.encoder_path(), encoder)?;
        }
        Ok(())
    }

    /// Canonical content digests of each artifact
    pub fn manifest(&self) -> Result<ArtifactManifest> {
        let digest = |e: crate::serde_canon::CanonicalError| PricingError::Artifact(e.to_string());

        let mut artifacts = vec![
            ArtifactDigest {
                name: "model",
                path: self.paths.model_path(),
                blake3: self.model.hash_hex()?,
            },
            ArtifactDigest {
                name: "factorized_mappings",
                path: self.paths.mappings_path(),
                blake3: hash_canonical_hex(&self.mappings).map_err(digest)?,
            },
            ArtifactDigest {
                name: "scaler",
                path: self.paths.scaler_path(),
                blake3: hash_canonical_hex(&self.scaler).map_err(digest)?,
            },
            ArtifactDigest {
                name: "one_hot_columns",
                path: self.paths.schema_path(),
                blake3: hash_canonical_hex(&self.schema).map_err(digest)?,
            },
        ];
        if let Some(encoder) = &self.encoder {
            artifacts.push(ArtifactDigest {
                name: "one_hot_encoder",
                path: self.paths.encoder_path(),
                blake3: hash_canonical_hex(encoder).map_err(digest)?,
            });
        }

        Ok(ArtifactManifest { artifacts })
    }
}
