//! Raw record → model-ready feature vector
//!
//! Stages, in order:
//! 1. validate the record and lay it out as a frame
//! 2. factorize categoricals (unseen values get the unknown index)
//! 3. min-max scale the selected numeric subset
//! 4. one-hot whatever is still text (persisted encoder first, if any)
//! 5. zero-fill and reorder against the trained column list

pub mod factorize;
pub mod one_hot;
pub mod scaler;
pub mod schema;

pub use factorize::{ColumnMapping, FactorizationMapping, UnseenCategory};
pub use one_hot::{get_dummies, OneHotEncoder};
pub use scaler::MinMaxScaler;
pub use schema::{FeatureSchema, FeatureVector};

use crate::config::EncodingConfig;
use crate::errors::Result;
use crate::record::{JewelryRecord, CATEGORICAL_COLUMNS};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Output of the encoding pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedFeatures {
    pub values: FeatureVector,
    /// Categorical values the artifacts had no entry for
    pub unseen: Vec<UnseenCategory>,
}

impl EncodedFeatures {
    /// Pair each value with its schema column name
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> Vec<(&'a str, f64)> {
        schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Encoding pipeline over borrowed artifacts
#[derive(Debug)]
pub struct Preprocessor<'a> {
    mappings: &'a FactorizationMapping,
    scaler: &'a MinMaxScaler,
    schema: &'a FeatureSchema,
    encoder: Option<&'a OneHotEncoder>,
    config: &'a EncodingConfig,
    scaled: Vec<String>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(
        mappings: &'a FactorizationMapping,
        scaler: &'a MinMaxScaler,
        schema: &'a FeatureSchema,
        encoder: Option<&'a OneHotEncoder>,
        config: &'a EncodingConfig,
    ) -> Self {
        let scaled = match &config.scaled_columns {
            Some(columns) => columns.clone(),
            None => scaler.scaled_features(&config.scaler_exclude),
        };
        Self {
            mappings,
            scaler,
            schema,
            encoder,
            config,
            scaled,
        }
    }

    /// Columns the scaling stage will touch
    pub fn scaled_columns(&self) -> &[String] {
        &self.scaled
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.schema
    }

    #[instrument(skip(self, record), fields(category = %record.category))]
    pub fn encode(&self, record: &JewelryRecord) -> Result<EncodedFeatures> {
        record.validate()?;
        let mut frame = record.to_frame();

        let mut unseen = self.mappings.encode(
            &mut frame,
            &CATEGORICAL_COLUMNS,
            self.config.unknown_category_index,
        );

        let clip = self.scaler.clip || self.config.clip_scaled;
        self.scaler.transform_with_clip(&mut frame, &self.scaled, clip)?;

        if let Some(encoder) = self.encoder {
            unseen.extend(encoder.transform(&mut frame));
        }
        // A dummy counts as unseen only for columns the model one-hot encodes.
        for (column, value) in get_dummies(&mut frame) {
            let indicator = one_hot::indicator_name(&column, &value);
            if self.schema.index_of(&indicator).is_none()
                && self.schema.has_indicators_for(&column)
            {
                unseen.push(UnseenCategory { column, value });
            }
        }

        let missing = self.schema.missing_from(&frame).len();
        let dropped = self.schema.extra_in(&frame);
        if !dropped.is_empty() {
            debug!(?dropped, "columns not in the trained schema");
        }
        debug!(missing = missing, "zero-filling absent schema columns");

        for u in &unseen {
            warn!(column = %u.column, value = %u.value, "category not seen in training");
        }

        Ok(EncodedFeatures {
            values: self.schema.align(&frame)?,
            unseen,
        })
    }
}
