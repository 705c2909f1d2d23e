//! Tree ensemble model with JSON persistence and content hashing

use super::tree::Tree;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json, CanonicalError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Model format version understood by this crate
pub const MODEL_FORMAT_VERSION: i32 = 1;

/// GBDT model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),
}

/// Pre-fitted gradient-boosted regression ensemble
///
/// The raw prediction is `bias + Σ tree.weight * tree.leaf`. Exporters that
/// already folded shrinkage into leaf values write `weight = 1.0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Model format version
    pub version: i32,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,

    /// Initial score added to every prediction
    pub bias: f64,

    /// Width of the feature vector the model was trained on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_features: Option<usize>,

    /// Training column names, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl Model {
    pub fn new(trees: Vec<Tree>, bias: f64) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            trees,
            bias,
            num_features: None,
            feature_names: None,
        }
    }

    /// Attach the training column names (also fixes `num_features`)
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.num_features = Some(names.len());
        self.feature_names = Some(names);
        self
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model must have at least one tree".to_string(),
            ));
        }

        if !self.bias.is_finite() {
            return Err(ModelError::ValidationFailed(format!(
                "Invalid bias: {}",
                self.bias
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| {
                ModelError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        if let (Some(n), Some(names)) = (self.num_features, &self.feature_names) {
            if n != names.len() {
                return Err(ModelError::ValidationFailed(format!(
                    "num_features is {} but {} feature names are listed",
                    n,
                    names.len()
                )));
            }
        }

        if let (Some(n), Some(max)) = (self.num_features, self.max_feature_index()) {
            if max >= n {
                return Err(ModelError::ValidationFailed(format!(
                    "Split on feature {} but model declares {} features",
                    max, n
                )));
            }
        }

        Ok(())
    }

    /// Raw regression output for one aligned feature vector
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.bias, |acc, tree| acc + tree.weight * tree.evaluate(features))
    }

    /// Largest feature index any tree splits on
    pub fn max_feature_index(&self) -> Option<usize> {
        self.trees.iter().filter_map(Tree::max_feature_index).max()
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 digest of the canonical JSON form
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Save model to JSON file with canonical serialization
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate a model from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model: Model = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }
}
