//! Categorical value → integer index lookup
//!
//! Each column's table is stored either as the ordered list of categories
//! produced by factorizing the training data (index = position) or as an
//! explicit `{value: index}` object. Both shapes load into the same type.

use crate::errors::{PricingError, Result};
use crate::frame::{Cell, FeatureFrame};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Index assigned to a category value that was never seen in training
pub const DEFAULT_UNKNOWN_INDEX: i64 = -1;

/// A categorical value that had no entry in its lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnseenCategory {
    pub column: String,
    pub value: String,
}

/// Lookup table for a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnMapping {
    /// Categories in factorization order
    Ordered(Vec<String>),
    /// Explicit category → index table
    Table(BTreeMap<String, i64>),
}

impl ColumnMapping {
    pub fn index_of(&self, value: &str) -> Option<i64> {
        match self {
            ColumnMapping::Ordered(values) => {
                values.iter().position(|v| v == value).map(|i| i as i64)
            }
            ColumnMapping::Table(table) => table.get(value).copied(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnMapping::Ordered(values) => values.len(),
            ColumnMapping::Table(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-column factorization tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorizationMapping {
    columns: BTreeMap<String, ColumnMapping>,
}

impl FactorizationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column whose index is the position in `values`
    pub fn with_ordered(mut self, column: &str, values: &[&str]) -> Self {
        self.columns.insert(
            column.to_string(),
            ColumnMapping::Ordered(values.iter().map(|v| v.to_string()).collect()),
        );
        self
    }

    /// Add a column from an explicit value → index table
    pub fn with_table(mut self, column: &str, table: &[(&str, i64)]) -> Self {
        self.columns.insert(
            column.to_string(),
            ColumnMapping::Table(table.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
        );
        self
    }

    pub fn get(&self, column: &str) -> Option<&ColumnMapping> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Reject ordered lists with repeated categories, which would make the
    /// position of the later copy unreachable
    pub fn validate(&self) -> Result<()> {
        for (column, mapping) in &self.columns {
            if let ColumnMapping::Ordered(values) = mapping {
                let mut seen = HashSet::new();
                if let Some(dup) = values.iter().find(|v| !seen.insert(v.as_str())) {
                    return Err(PricingError::Factorization(format!(
                        "column {} lists category {:?} more than once",
                        column, dup
                    )));
                }
            }
        }
        Ok(())
    }

    /// Replace the text cells of `columns` that have a table with their index.
    ///
    /// Columns without a table stay text so the one-hot stage can pick them
    /// up. Returns the values that fell back to `unknown_index`.
    pub fn encode(
        &self,
        frame: &mut FeatureFrame,
        columns: &[&str],
        unknown_index: i64,
    ) -> Vec<UnseenCategory> {
        let mut unseen = Vec::new();

        for &column in columns {
            let Some(mapping) = self.columns.get(column) else {
                debug!(column = %column, "no factorization table, leaving as text");
                continue;
            };
            let Some(Cell::Text(value)) = frame.get(column) else {
                continue;
            };

            let index = match mapping.index_of(value) {
                Some(index) => index,
                None => {
                    unseen.push(UnseenCategory {
                        column: column.to_string(),
                        value: value.clone(),
                    });
                    unknown_index
                }
            };
            frame.set(column, index as f64);
        }

        unseen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FactorizationMapping {
        FactorizationMapping::new()
            .with_ordered("Main_Metal", &["gold", "silver", "platinum"])
            .with_table("Target_Gender", &[("f", 0), ("m", 1)])
    }

    fn frame() -> FeatureFrame {
        let mut frame = FeatureFrame::new();
        frame.set("Main_Metal", "silver");
        frame.set("Target_Gender", "m");
        frame.set("Main_Color", "red");
        frame
    }

    #[test]
    fn test_both_table_shapes_encode() {
        let mut frame = frame();
        let unseen = mapping().encode(
            &mut frame,
            &["Main_Metal", "Target_Gender", "Main_Color"],
            DEFAULT_UNKNOWN_INDEX,
        );

        assert!(unseen.is_empty());
        assert_eq!(frame.get("Main_Metal"), Some(&Cell::Number(1.0)));
        assert_eq!(frame.get("Target_Gender"), Some(&Cell::Number(1.0)));
        // No table: untouched.
        assert_eq!(frame.get("Main_Color"), Some(&Cell::Text("red".into())));
    }

    #[test]
    fn test_unseen_value_gets_sentinel() {
        let mut frame = frame();
        frame.set("Main_Metal", "titanium");

        let unseen = mapping().encode(&mut frame, &["Main_Metal"], DEFAULT_UNKNOWN_INDEX);

        assert_eq!(frame.get("Main_Metal"), Some(&Cell::Number(-1.0)));
        assert_eq!(
            unseen,
            vec![UnseenCategory {
                column: "Main_Metal".into(),
                value: "titanium".into()
            }]
        );
    }

    #[test]
    fn test_custom_sentinel() {
        let mut frame = frame();
        frame.set("Target_Gender", "x");
        mapping().encode(&mut frame, &["Target_Gender"], 99);
        assert_eq!(frame.get("Target_Gender"), Some(&Cell::Number(99.0)));
    }

    #[test]
    fn test_deserializes_list_and_object_shapes() {
        let json = r#"{
            "Main_Metal": ["gold", "silver"],
            "Main_Gem": {"diamond": 0, "ruby": 3}
        }"#;
        let mapping: FactorizationMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.get("Main_Metal").unwrap().index_of("silver"), Some(1));
        assert_eq!(mapping.get("Main_Gem").unwrap().index_of("ruby"), Some(3));
        assert_eq!(mapping.get("Main_Gem").unwrap().index_of("opal"), None);
        assert_eq!(mapping.columns().collect::<Vec<_>>(), vec!["Main_Gem", "Main_Metal"]);
    }

    #[test]
    fn test_duplicate_ordered_category_rejected() {
        let mapping = FactorizationMapping::new().with_ordered("Main_Color", &["red", "blue", "red"]);
        assert!(matches!(mapping.validate(), Err(PricingError::Factorization(_))));
        assert!(self::mapping().validate().is_ok());
    }
}
