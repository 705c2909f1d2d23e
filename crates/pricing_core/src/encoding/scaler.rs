//! Min-max scaling of the numeric feature subset
//!
//! The scaler carries the per-feature minimum and maximum observed during
//! training. At inference each selected column is mapped with
//! `x * scale + min`, where `scale = (hi - lo) / (data_max - data_min)` and
//! `min = lo - data_min * scale`.

use crate::errors::{PricingError, Result};
use crate::frame::{Cell, FeatureFrame};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column the scaler was fitted with that is never present at inference
pub const DEFAULT_TARGET_COLUMN: &str = "Price_USD";

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Fitted min-max scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Column names in the order the scaler was fitted on
    pub feature_names_in: Vec<String>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    /// Clamp transformed values into `feature_range`
    #[serde(default)]
    pub clip: bool,
}

impl MinMaxScaler {
    pub fn new(feature_names_in: Vec<String>, data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self {
            feature_names_in,
            data_min,
            data_max,
            feature_range: default_feature_range(),
            clip: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names_in.len();
        if n == 0 {
            return Err(PricingError::Scaling("scaler has no features".into()));
        }
        if self.data_min.len() != n || self.data_max.len() != n {
            return Err(PricingError::Scaling(format!(
                "scaler has {} feature names but {} minimums and {} maximums",
                n,
                self.data_min.len(),
                self.data_max.len()
            )));
        }

        let mut seen = HashSet::new();
        for (i, name) in self.feature_names_in.iter().enumerate() {
            if !seen.insert(name.as_str()) {
                return Err(PricingError::Scaling(format!("duplicate scaler feature {name}")));
            }
            let (lo, hi) = (self.data_min[i], self.data_max[i]);
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(PricingError::Scaling(format!(
                    "invalid training range [{lo}, {hi}] for {name}"
                )));
            }
        }

        let (lo, hi) = self.feature_range;
        if !(lo < hi) {
            return Err(PricingError::Scaling(format!(
                "feature_range ({lo}, {hi}) must be increasing"
            )));
        }
        Ok(())
    }

    /// Scaler features minus the excluded columns, in scaler order
    pub fn scaled_features(&self, exclude: &[String]) -> Vec<String> {
        self.feature_names_in
            .iter()
            .filter(|name| !exclude.contains(name))
            .cloned()
            .collect()
    }

    /// Multiplier and offset for the feature at `idx`
    fn coefficients(&self, idx: usize) -> (f64, f64) {
        let (lo, hi) = self.feature_range;
        let mut data_range = self.data_max[idx] - self.data_min[idx];
        if data_range.abs() < 10.0 * f64::EPSILON {
            data_range = 1.0;
        }
        let scale = (hi - lo) / data_range;
        (scale, lo - self.data_min[idx] * scale)
    }

    /// Scale a single value of the named feature
    pub fn transform_value(&self, feature: &str, value: f64) -> Result<f64> {
        self.scale_one(feature, value, self.clip)
    }

    fn scale_one(&self, feature: &str, value: f64, clip: bool) -> Result<f64> {
        let idx = self
            .feature_names_in
            .iter()
            .position(|n| n == feature)
            .ok_or_else(|| {
                PricingError::Scaling(format!("{feature} is not a feature the scaler was fitted on"))
            })?;

        let (scale, min) = self.coefficients(idx);
        let scaled = value * scale + min;
        Ok(if clip {
            scaled.clamp(self.feature_range.0, self.feature_range.1)
        } else {
            scaled
        })
    }

    /// Scale `features` in place; every other column is left alone.
    ///
    /// All requested features must be present and numeric. The frame is only
    /// modified once every value has been computed.
    pub fn transform(&self, frame: &mut FeatureFrame, features: &[String]) -> Result<()> {
        self.transform_with_clip(frame, features, self.clip)
    }

    /// Like [`MinMaxScaler::transform`], overriding the fitted `clip` flag
    pub fn transform_with_clip(
        &self,
        frame: &mut FeatureFrame,
        features: &[String],
        clip: bool,
    ) -> Result<()> {
        let mut scaled = Vec::with_capacity(features.len());
        for feature in features {
            let value = match frame.get(feature) {
                Some(Cell::Number(v)) => *v,
                Some(Cell::Text(text)) => {
                    return Err(PricingError::Scaling(format!(
                        "could not convert {text:?} in column {feature} to float"
                    )))
                }
                None => {
                    return Err(PricingError::Scaling(format!(
                        "column {feature} is missing from the input"
                    )))
                }
            };
            scaled.push(self.scale_one(feature, value, clip)?);
        }

        for (feature, value) in features.iter().zip(scaled) {
            frame.set(feature.as_str(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> MinMaxScaler {
        MinMaxScaler::new(
            vec!["Brand_ID".into(), "Year".into(), "Price_USD".into()],
            vec![0.0, 2018.0, 10.0],
            vec![100.0, 2022.0, 5000.0],
        )
    }

    fn frame() -> FeatureFrame {
        let mut frame = FeatureFrame::new();
        frame.set("Brand_ID", 25.0);
        frame.set("Year", 2020.0);
        frame.set("Month", 7.0);
        frame
    }

    #[test]
    fn test_target_column_excluded() {
        let features = scaler().scaled_features(&[DEFAULT_TARGET_COLUMN.to_string()]);
        assert_eq!(features, vec!["Brand_ID", "Year"]);
    }

    #[test]
    fn test_transform_only_touches_selected_columns() {
        let mut frame = frame();
        let s = scaler();
        let features = s.scaled_features(&[DEFAULT_TARGET_COLUMN.to_string()]);
        s.transform(&mut frame, &features).unwrap();

        assert_eq!(frame.get("Brand_ID"), Some(&Cell::Number(0.25)));
        assert_eq!(frame.get("Year"), Some(&Cell::Number(0.5)));
        assert_eq!(frame.get("Month"), Some(&Cell::Number(7.0)));
    }

    #[test]
    fn test_out_of_range_value_extrapolates_unless_clipped() {
        let mut s = scaler();
        assert_eq!(s.transform_value("Year", 2026.0).unwrap(), 2.0);
        s.clip = true;
        assert_eq!(s.transform_value("Year", 2026.0).unwrap(), 1.0);
        assert_eq!(s.transform_value("Year", 2000.0).unwrap(), 0.0);
    }

    #[test]
    fn test_custom_feature_range_and_constant_feature() {
        let mut s = MinMaxScaler::new(vec!["Month".into()], vec![6.0], vec![6.0]);
        s.feature_range = (-1.0, 1.0);
        assert!(s.validate().is_ok());
        // Zero training range is treated as a range of one.
        assert_eq!(s.transform_value("Month", 6.0).unwrap(), -1.0);
        assert_eq!(s.transform_value("Month", 7.0).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_or_text_column_is_a_scaling_error() {
        let s = scaler();

        let mut frame = frame();
        frame.remove("Year");
        let err = s
            .transform(&mut frame, &["Brand_ID".into(), "Year".into()])
            .unwrap_err();
        assert!(matches!(err, PricingError::Scaling(_)));
        // Nothing was written before the failure.
        assert_eq!(frame.get("Brand_ID"), Some(&Cell::Number(25.0)));

        let mut frame = self::frame();
        frame.set("Year", "twenty");
        assert!(s.transform(&mut frame, &["Year".into()]).is_err());

        let mut frame = self::frame();
        assert!(s.transform(&mut frame, &["Month".into()]).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(scaler().validate().is_ok());

        let mut bad = scaler();
        bad.data_max.pop();
        assert!(bad.validate().is_err());

        let mut bad = scaler();
        bad.data_min[0] = 500.0;
        assert!(bad.validate().is_err());

        let mut bad = scaler();
        bad.feature_range = (1.0, 1.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"feature_names_in":["Year"],"data_min":[2000.0],"data_max":[2020.0]}"#;
        let s: MinMaxScaler = serde_json::from_str(json).unwrap();
        assert_eq!(s.feature_range, (0.0, 1.0));
        assert!(!s.clip);
    }
}
