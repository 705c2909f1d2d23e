//! Raw jewelry attributes as entered by a user

use crate::errors::{PricingError, Result};
use crate::frame::FeatureFrame;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const CATEGORY: &str = "Category";
pub const MAIN_METAL: &str = "Main_Metal";
pub const TARGET_GENDER: &str = "Target_Gender";
pub const MAIN_COLOR: &str = "Main_Color";
pub const MAIN_GEM: &str = "Main_Gem";
pub const BRAND_ID: &str = "Brand_ID";
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";

/// Categorical columns, in frame order
pub const CATEGORICAL_COLUMNS: [&str; 5] = [CATEGORY, MAIN_METAL, TARGET_GENDER, MAIN_COLOR, MAIN_GEM];

/// Numeric columns, in frame order
pub const NUMERIC_COLUMNS: [&str; 3] = [BRAND_ID, YEAR, MONTH];

pub const CATEGORY_CHOICES: [&str; 8] = [
    "jewelry.earring",
    "jewelry.pendant",
    "jewelry.necklace",
    "jewelry.ring",
    "jewelry.brooch",
    "jewelry.bracelet",
    "jewelry.souvenir",
    "jewelry.stud",
];
pub const MAIN_METAL_CHOICES: [&str; 4] = ["gold", "silver", "platinum", "diamond"];
pub const TARGET_GENDER_CHOICES: [&str; 2] = ["f", "m"];
pub const MAIN_COLOR_CHOICES: [&str; 5] = ["red", "blue", "green", "black", "white"];
pub const MAIN_GEM_CHOICES: [&str; 5] = ["diamond", "emerald", "sapphire", "ruby", "none"];

pub const BRAND_ID_RANGE: RangeInclusive<i64> = 1..=1000;
pub const YEAR_RANGE: RangeInclusive<i64> = 1900..=2100;
pub const MONTH_RANGE: RangeInclusive<i64> = 1..=12;

/// Offered values for each categorical column
pub fn choices() -> [(&'static str, &'static [&'static str]); 5] {
    [
        (CATEGORY, &CATEGORY_CHOICES),
        (MAIN_METAL, &MAIN_METAL_CHOICES),
        (TARGET_GENDER, &TARGET_GENDER_CHOICES),
        (MAIN_COLOR, &MAIN_COLOR_CHOICES),
        (MAIN_GEM, &MAIN_GEM_CHOICES),
    ]
}

/// One item to price
///
/// Categorical values are free text: anything outside the offered choices is
/// accepted here and treated as an unseen category during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JewelryRecord {
    pub category: String,
    pub main_metal: String,
    pub target_gender: String,
    pub main_color: String,
    pub main_gem: String,
    pub brand_id: i64,
    pub year: i64,
    pub month: i64,
}

impl JewelryRecord {
    /// Check the numeric fields against the bounds the input form enforces
    pub fn validate(&self) -> Result<()> {
        check_range(BRAND_ID, self.brand_id, &BRAND_ID_RANGE)?;
        check_range(YEAR, self.year, &YEAR_RANGE)?;
        check_range(MONTH, self.month, &MONTH_RANGE)?;
        Ok(())
    }

    /// Lay the record out as a single-row frame in canonical column order
    pub fn to_frame(&self) -> FeatureFrame {
        let mut frame = FeatureFrame::new();
        frame.set(CATEGORY, self.category.as_str());
        frame.set(MAIN_METAL, self.main_metal.as_str());
        frame.set(TARGET_GENDER, self.target_gender.as_str());
        frame.set(MAIN_COLOR, self.main_color.as_str());
        frame.set(MAIN_GEM, self.main_gem.as_str());
        frame.set(BRAND_ID, self.brand_id as f64);
        frame.set(YEAR, self.year as f64);
        frame.set(MONTH, self.month as f64);
        frame
    }
}

fn check_range(column: &str, value: i64, range: &RangeInclusive<i64>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(PricingError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            column,
            range.start(),
            range.end(),
            value
        )))
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> JewelryRecord {
    JewelryRecord {
        category: "jewelry.ring".into(),
        main_metal: "gold".into(),
        target_gender: "f".into(),
        main_color: "red".into(),
        main_gem: "diamond".into(),
        brand_id: 1,
        year: 2019,
        month: 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Cell;

    #[test]
    fn test_frame_layout() {
        let frame = sample_record().to_frame();
        let names: Vec<_> = frame.names().collect();
        let expected: Vec<_> = CATEGORICAL_COLUMNS
            .iter()
            .chain(NUMERIC_COLUMNS.iter())
            .copied()
            .collect();
        assert_eq!(names, expected);
        assert_eq!(frame.get(MAIN_METAL), Some(&Cell::Text("gold".into())));
        assert_eq!(frame.get(YEAR), Some(&Cell::Number(2019.0)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut record = sample_record();
        record.brand_id = 1000;
        record.year = 1900;
        record.month = 12;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        let mut record = sample_record();
        record.month = 13;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("Month"));

        let mut record = sample_record();
        record.brand_id = 0;
        assert!(matches!(record.validate(), Err(PricingError::InvalidInput(_))));

        let mut record = sample_record();
        record.year = 2101;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_unlisted_category_is_accepted() {
        let mut record = sample_record();
        record.main_metal = "titanium".into();
        assert!(record.validate().is_ok());
        assert!(!MAIN_METAL_CHOICES.contains(&"titanium"));
    }
}
