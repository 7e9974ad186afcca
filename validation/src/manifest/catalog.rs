//! Field Catalog — descriptor types and catalog-source loading
//!
//! The catalog source is a JSON document mapping canonical field names to
//! descriptor records. Loading fails fast and descriptively: a missing file,
//! malformed JSON, an out-of-enumeration category/frequency/value_type, or a
//! degenerate `valid_range` is a construction error, never a soft warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Broad classification of a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Market price and turnover series.
    Price,
    /// Financial-statement and valuation data.
    Fundamental,
    /// Derived technical indicators.
    Technical,
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Price => write!(f, "price"),
            Self::Fundamental => write!(f, "fundamental"),
            Self::Technical => write!(f, "technical"),
        }
    }
}

impl FieldCategory {
    /// All categories, in display order.
    pub const ALL: [FieldCategory; 3] = [Self::Price, Self::Fundamental, Self::Technical];
}

/// Publication frequency of a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Annual => write!(f, "annual"),
        }
    }
}

/// Scalar type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Float,
    Int,
    String,
    Datetime,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::Int => write!(f, "int"),
            Self::String => write!(f, "string"),
            Self::Datetime => write!(f, "datetime"),
        }
    }
}

/// Localized field description (Traditional Chinese + English).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub zh: String,
    pub en: String,
}

/// Inclusive numeric bounds on a field's values.
///
/// Serializes as a two-element ordered array `[min, max]` with `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl From<(f64, f64)> for ValueRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for (f64, f64) {
    fn from(r: ValueRange) -> Self {
        (r.min, r.max)
    }
}

/// One canonical field, immutable after catalog load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The single authoritative identifier (globally unique).
    pub canonical_name: String,
    pub category: FieldCategory,
    pub frequency: Frequency,
    pub value_type: ValueType,
    pub description: LocalizedText,
    /// Alternate names, in priority order. Non-empty; each alias is unique
    /// across the whole catalog.
    pub aliases: Vec<String>,
    /// Optional inclusive bounds (`min < max`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_range: Option<ValueRange>,
}

/// On-disk record for one field. The canonical name is the map key of the
/// catalog document, so it is absent from the record itself.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRecord {
    pub category: FieldCategory,
    pub frequency: Frequency,
    pub value_type: ValueType,
    pub description: LocalizedText,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub valid_range: Option<ValueRange>,
}

impl FieldRecord {
    /// Bind this record to its canonical name.
    pub fn into_descriptor(self, canonical_name: &str) -> FieldDescriptor {
        FieldDescriptor {
            canonical_name: canonical_name.to_string(),
            category: self.category,
            frequency: self.frequency,
            value_type: self.value_type,
            description: self.description,
            aliases: self.aliases,
            valid_range: self.valid_range,
        }
    }
}

/// A parsed catalog document: canonical name → record.
///
/// `BTreeMap` keeps document iteration in lexicographic canonical-name
/// order, which downstream matching relies on for reproducibility.
pub type CatalogDocument = BTreeMap<String, FieldRecord>;

/// Non-recoverable catalog construction failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("field '{field}' declares no aliases")]
    EmptyAliases { field: String },

    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("field '{field}' has degenerate valid_range [{min}, {max}] (min must be < max)")]
    InvalidRange { field: String, min: f64, max: f64 },
}

/// Parse a catalog document from a JSON string.
pub fn parse_catalog(json: &str) -> Result<CatalogDocument, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a catalog document from disk.
///
/// One-time synchronous read; expected to happen at startup, outside
/// request-serving code.
pub fn load_catalog(path: &Path) -> Result<CatalogDocument, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&raw)
}
