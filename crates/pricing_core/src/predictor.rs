//! End-to-end price estimation

use crate::artifacts::ArtifactBundle;
use crate::config::EncodingConfig;
use crate::encoding::{EncodedFeatures, Preprocessor, UnseenCategory};
use crate::errors::Result;
use crate::format::format_usd;
use crate::record::JewelryRecord;
use serde::Serialize;
use tracing::{info, instrument};

/// A price estimate for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub price: f64,
    /// Price rendered as `$1,234.56`
    pub formatted: String,
    /// Categorical values the artifacts had no entry for
    pub unseen: Vec<UnseenCategory>,
}

/// Runs the encoding pipeline and the tree ensemble over loaded artifacts
#[derive(Debug, Clone)]
pub struct PricePredictor {
    bundle: ArtifactBundle,
    encoding: EncodingConfig,
}

impl PricePredictor {
    pub fn new(bundle: ArtifactBundle, encoding: EncodingConfig) -> Self {
        Self { bundle, encoding }
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn preprocessor(&self) -> Preprocessor<'_> {
        Preprocessor::new(
            &self.bundle.mappings,
            &self.bundle.scaler,
            &self.bundle.schema,
            self.bundle.encoder.as_ref(),
            &self.encoding,
        )
    }

    /// Encode a record without predicting
    pub fn encode(&self, record: &JewelryRecord) -> Result<EncodedFeatures> {
        self.preprocessor().encode(record)
    }

    #[instrument(skip(self, record))]
    pub fn predict(&self, record: &JewelryRecord) -> Result<PriceEstimate> {
        self.estimate(&self.preprocessor(), record)
    }

    /// Predict each record independently; one failure does not stop the rest
    pub fn predict_batch(&self, records: &[JewelryRecord]) -> Vec<Result<PriceEstimate>> {
        let preprocessor = self.preprocessor();
        records
            .iter()
            .map(|record| self.estimate(&preprocessor, record))
            .collect()
    }

    fn estimate(
        &self,
        preprocessor: &Preprocessor<'_>,
        record: &JewelryRecord,
    ) -> Result<PriceEstimate> {
        let encoded = preprocessor.encode(record)?;
        let price = self.bundle.model.predict(&encoded.values);
        let formatted = format_usd(price);

        info!(price = price, formatted = %formatted, "estimated price");
        Ok(PriceEstimate {
            price,
            formatted,
            unseen: encoded.unseen,
        })
    }
}
