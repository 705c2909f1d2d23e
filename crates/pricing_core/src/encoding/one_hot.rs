//! Indicator-column expansion for categorical cells
//!
//! Indicator columns are named `{column}_{value}`, matching the names the
//! trained column list was built with.

use crate::encoding::factorize::UnseenCategory;
use crate::frame::{Cell, FeatureFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn indicator_name(column: &str, value: &str) -> String {
    format!("{column}_{value}")
}

/// Replace every remaining text cell with a single `1.0` indicator column.
///
/// Numeric cells are untouched. Returns the `(column, value)` pairs that were
/// expanded; indicators the model never saw are dropped later by schema
/// alignment.
pub fn get_dummies(frame: &mut FeatureFrame) -> Vec<(String, String)> {
    let mut expanded = Vec::new();
    for column in frame.text_columns() {
        if let Some(Cell::Text(value)) = frame.remove(&column) {
            frame.set(indicator_name(&column, &value), 1.0);
            expanded.push((column, value));
        }
    }
    expanded
}

/// One-hot encoder persisted alongside the model
///
/// Lists, per column, the categories seen in training. Unknown values encode
/// to all zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: BTreeMap<String, Vec<String>>,
}

impl OneHotEncoder {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// All indicator names the encoder can emit, column by column
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(column, values)| values.iter().map(move |v| indicator_name(column, v)))
            .collect()
    }

    /// Expand the encoder's columns that are still text in `frame`
    pub fn transform(&self, frame: &mut FeatureFrame) -> Vec<UnseenCategory> {
        let mut unseen = Vec::new();

        for (column, values) in &self.categories {
            let value = match frame.get(column) {
                Some(Cell::Text(value)) => value.clone(),
                _ => continue,
            };
            frame.remove(column);

            if !values.contains(&value) {
                unseen.push(UnseenCategory {
                    column: column.clone(),
                    value: value.clone(),
                });
            }
            for category in values {
                let hot = if *category == value { 1.0 } else { 0.0 };
                frame.set(indicator_name(column, category), hot);
            }
        }

        unseen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_dummies_expands_text_only() {
        let mut frame = FeatureFrame::new();
        frame.set("Category", 2.0);
        frame.set("Main_Color", "red");
        frame.set("Year", 0.5);

        let expanded = get_dummies(&mut frame);
        assert_eq!(expanded, vec![("Main_Color".to_string(), "red".to_string())]);

        let names: Vec<_> = frame.names().collect();
        assert_eq!(names, vec!["Category", "Year", "Main_Color_red"]);
        assert_eq!(frame.get("Main_Color_red"), Some(&Cell::Number(1.0)));
        assert!(frame.text_columns().is_empty());
    }

    fn encoder() -> OneHotEncoder {
        let mut categories = BTreeMap::new();
        categories.insert(
            "Main_Gem".to_string(),
            vec!["diamond".to_string(), "ruby".to_string()],
        );
        OneHotEncoder::new(categories)
    }

    #[test]
    fn test_encoder_emits_every_known_category() {
        let mut frame = FeatureFrame::new();
        frame.set("Main_Gem", "ruby");
        frame.set("Main_Color", "red");

        let unseen = encoder().transform(&mut frame);

        assert!(unseen.is_empty());
        assert!(!frame.contains("Main_Gem"));
        assert_eq!(frame.get("Main_Gem_diamond"), Some(&Cell::Number(0.0)));
        assert_eq!(frame.get("Main_Gem_ruby"), Some(&Cell::Number(1.0)));
        // Not an encoder column.
        assert_eq!(frame.get("Main_Color"), Some(&Cell::Text("red".into())));
    }

    #[test]
    fn test_encoder_ignores_unknown_value() {
        let mut frame = FeatureFrame::new();
        frame.set("Main_Gem", "opal");

        let unseen = encoder().transform(&mut frame);

        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].value, "opal");
        assert_eq!(frame.get("Main_Gem_diamond"), Some(&Cell::Number(0.0)));
        assert_eq!(frame.get("Main_Gem_ruby"), Some(&Cell::Number(0.0)));
        assert!(!frame.contains("Main_Gem_opal"));
    }

    #[test]
    fn test_encoder_skips_factorized_column() {
        let mut frame = FeatureFrame::new();
        frame.set("Main_Gem", 3.0);
        encoder().transform(&mut frame);
        assert_eq!(frame.get("Main_Gem"), Some(&Cell::Number(3.0)));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_feature_names() {
        assert_eq!(encoder().feature_names(), vec!["Main_Gem_diamond", "Main_Gem_ruby"]);
    }
}
