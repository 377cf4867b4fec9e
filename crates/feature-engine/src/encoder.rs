//! Categorical Label Encoding

use crate::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column whose categories the pipeline encodes
pub const COMPONENT_TYPE_COLUMN: &str = "component_type";

/// Maps each known category to its index in the sorted vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: Vec<String>,
}

impl CategoryEncoder {
    /// Build an encoder from observed categories (sorted, deduplicated)
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = values.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Index of `value`, or `None` for a category outside the vocabulary
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    /// Category at `index`
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Known categories in encoding order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Encoders keyed by column name, persisted as one artifact blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoders {
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl LabelEncoders {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the encoder for a column
    pub fn insert(&mut self, column: impl Into<String>, encoder: CategoryEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, column: impl Into<String>, encoder: CategoryEncoder) -> Self {
        self.insert(column, encoder);
        self
    }

    /// Encoder for a column
    pub fn get(&self, column: &str) -> Result<&CategoryEncoder, FeatureError> {
        self.encoders
            .get(column)
            .ok_or_else(|| FeatureError::MissingEncoder(column.to_string()))
    }

    /// Encode `value` in `column`, failing for unseen categories
    pub fn encode(&self, column: &str, value: &str) -> Result<usize, FeatureError> {
        self.get(column)?
            .encode(value)
            .ok_or_else(|| FeatureError::Encoding {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Serialize with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, FeatureError> {
        postcard::to_allocvec(self).map_err(|e| FeatureError::Codec(e.to_string()))
    }

    /// Deserialize from postcard bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FeatureError> {
        postcard::from_bytes(bytes).map_err(|e| FeatureError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> CategoryEncoder {
        CategoryEncoder::fit(["landing_gear", "engine", "hydraulic_system", "engine"])
    }

    #[test]
    fn test_sorted_vocabulary() {
        let enc = components();
        assert_eq!(enc.classes(), ["engine", "hydraulic_system", "landing_gear"]);
        assert_eq!(enc.encode("engine"), Some(0));
        assert_eq!(enc.encode("hydraulic_system"), Some(1));
        assert_eq!(enc.encode("landing_gear"), Some(2));
        assert_eq!(enc.decode(2), Some("landing_gear"));
    }

    #[test]
    fn test_unseen_category() {
        let encoders = LabelEncoders::new().with(COMPONENT_TYPE_COLUMN, components());
        let err = encoders.encode(COMPONENT_TYPE_COLUMN, "rotor").unwrap_err();
        assert!(matches!(err, FeatureError::Encoding { ref value, .. } if value == "rotor"));
    }

    #[test]
    fn test_missing_column() {
        let encoders = LabelEncoders::new();
        assert!(matches!(
            encoders.encode(COMPONENT_TYPE_COLUMN, "engine"),
            Err(FeatureError::MissingEncoder(_))
        ));
    }

    #[test]
    fn test_blob_decodes_back() {
        let encoders = LabelEncoders::new().with(COMPONENT_TYPE_COLUMN, components());
        let bytes = encoders.to_bytes().unwrap();
        assert_eq!(LabelEncoders::from_bytes(&bytes).unwrap(), encoders);
        assert!(LabelEncoders::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
