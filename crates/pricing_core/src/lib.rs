//! Jewelry price estimation core
//!
//! Turns a handful of raw jewelry attributes into the ordered feature vector
//! a pre-trained gradient-boosted regression model expects, then runs the
//! model.
//!
//! Modules:
//! - `record`: Raw input fields, offered choices and their bounds
//! - `frame`: Named single-row frame passed between encoding stages
//! - `encoding`: Factorization, min-max scaling, one-hot and schema alignment
//! - `gbdt`: Tree ensemble inference over exported JSON models
//! - `artifacts`: Loading and cross-checking the trained artifacts
//! - `predictor`: End-to-end estimate with currency formatting
//! - `config`: TOML configuration with environment overrides
//! - `errors`: Error types

pub mod artifacts;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod format;
pub mod frame;
pub mod gbdt;
pub mod predictor;
pub mod record;
pub mod serde_canon;

pub use artifacts::{ArtifactBundle, ArtifactDigest, ArtifactManifest};
pub use config::{ArtifactsConfig, EncodingConfig, LoggingConfig, PricingConfig};
pub use encoding::{
    EncodedFeatures, FactorizationMapping, FeatureSchema, FeatureVector, MinMaxScaler,
    OneHotEncoder, Preprocessor, UnseenCategory,
};
pub use errors::{PricingError, Result};
pub use format::format_usd;
pub use frame::{Cell, FeatureFrame};
pub use gbdt::Model;
pub use predictor::{PriceEstimate, PricePredictor};
pub use record::JewelryRecord;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load artifacts as configured and build a predictor
pub fn load_predictor(config: &PricingConfig) -> Result<PricePredictor> {
    let bundle = ArtifactBundle::load(&config.artifacts)?;
    Ok(PricePredictor::new(bundle, config.encoding.clone()))
}
