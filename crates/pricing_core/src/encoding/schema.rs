//! Trained output column order and frame alignment

use crate::errors::{PricingError, Result};
use crate::frame::{Cell, FeatureFrame};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Model-ready feature values, in schema order
pub type FeatureVector = Vec<f64>;

/// Ordered list of feature names the model was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let schema = Self { columns };
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(PricingError::Alignment("feature schema is empty".into()));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(PricingError::Alignment(format!(
                    "feature schema lists {column} twice"
                )));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Whether any trained column is an indicator of `column` (`{column}_*`)
    pub fn has_indicators_for(&self, column: &str) -> bool {
        let prefix = format!("{column}_");
        self.columns.iter().any(|c| c.starts_with(&prefix))
    }

    /// Schema columns the frame does not provide (these get zero-filled)
    pub fn missing_from(&self, frame: &FeatureFrame) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !frame.contains(c))
            .collect()
    }

    /// Frame columns the schema does not know (these get dropped)
    pub fn extra_in<'a>(&self, frame: &'a FeatureFrame) -> Vec<&'a str> {
        frame
            .names()
            .filter(|name| self.index_of(name).is_none())
            .collect()
    }

    /// Reindex `frame` to the schema: zero-fill absent columns, drop unknown
    /// ones and emit values in trained order.
    pub fn align(&self, frame: &FeatureFrame) -> Result<FeatureVector> {
        self.columns
            .iter()
            .map(|column| match frame.get(column) {
                None => Ok(0.0),
                Some(Cell::Number(v)) => Ok(*v),
                Some(Cell::Text(value)) => Err(PricingError::Alignment(format!(
                    "column {column} still holds text {value:?} after encoding"
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "Brand_ID".into(),
            "Category".into(),
            "Main_Color_blue".into(),
            "Main_Color_red".into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_align_zero_fills_reorders_and_drops() {
        let mut frame = FeatureFrame::new();
        frame.set("Category", 3.0);
        frame.set("Main_Color_red", 1.0);
        frame.set("Brand_ID", 0.25);
        frame.set("Main_Color_purple", 1.0);

        let schema = schema();
        assert_eq!(schema.align(&frame).unwrap(), vec![0.25, 3.0, 0.0, 1.0]);
        assert_eq!(schema.missing_from(&frame), vec!["Main_Color_blue"]);
        assert_eq!(schema.extra_in(&frame), vec!["Main_Color_purple"]);
    }

    #[test]
    fn test_empty_frame_aligns_to_zeros() {
        let vector = schema().align(&FeatureFrame::new()).unwrap();
        assert_eq!(vector, vec![0.0; 4]);
    }

    #[test]
    fn test_text_in_schema_column_is_rejected() {
        let mut frame = FeatureFrame::new();
        frame.set("Category", "jewelry.ring");
        assert!(matches!(schema().align(&frame), Err(PricingError::Alignment(_))));
    }

    #[test]
    fn test_schema_validation() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(vec!["Year".into(), "Year".into()]).is_err());
        assert_eq!(schema().index_of("Main_Color_red"), Some(3));
    }

    #[test]
    fn test_deserializes_from_plain_list() {
        let schema: FeatureSchema = serde_json::from_str(r#"["Year","Month"]"#).unwrap();
        assert_eq!(schema.columns(), &["Year".to_string(), "Month".to_string()]);
    }

    #[test]
    fn test_indicator_prefix_lookup() {
        let schema = schema();
        assert!(schema.has_indicators_for("Main_Color"));
        assert!(!schema.has_indicators_for("Main_Gem"));
        // Exact names are not indicators.
        assert!(!schema.has_indicators_for("Category"));
    }
}
