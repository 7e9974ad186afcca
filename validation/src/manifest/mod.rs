//! Field Manifest — constant-time alias resolution over a loaded catalog
//!
//! Built once from a catalog source, then read-only. Two reverse-lookup
//! tables give O(1) resolution:
//!
//! ```text
//! alias_or_canonical ──► canonical_name ──► FieldDescriptor
//! ```
//!
//! Every canonical name maps to itself in the alias table, so callers never
//! need to know whether a string was an alias. Because the tables are never
//! mutated after construction, concurrent reads need no locking.

mod catalog;
pub mod known_mistakes;

pub use catalog::{
    load_catalog, parse_catalog, CatalogDocument, CatalogError, FieldCategory, FieldDescriptor,
    FieldRecord, Frequency, LocalizedText, ValueRange, ValueType,
};

use std::collections::HashMap;
use std::path::Path;

/// Catalog embedded for tests and demos: the standard Taiwanese market-data
/// fields. Production callers load their own catalog file.
const BUILTIN_CATALOG: &str = include_str!("builtin_catalog.json");

/// Read-only field catalog with O(1) alias and canonical lookups.
#[derive(Debug, Clone)]
pub struct FieldManifest {
    /// alias (or canonical name) → canonical name.
    alias_to_canonical: HashMap<String, String>,
    /// canonical name → descriptor.
    fields: HashMap<String, FieldDescriptor>,
    /// Canonical names in lexicographic order. All iteration-order-sensitive
    /// operations (partial match, fuzzy scan, prompt rendering) use this so
    /// results are reproducible across runs.
    sorted_canonical: Vec<String>,
}

impl FieldManifest {
    /// Build a manifest from a parsed catalog document.
    ///
    /// Fails on the first record violating a descriptor invariant: empty
    /// alias list, duplicate alias across the catalog, or `min >= max` in
    /// `valid_range`.
    pub fn from_catalog(catalog: CatalogDocument) -> Result<Self, CatalogError> {
        let mut alias_to_canonical = HashMap::new();
        let mut fields = HashMap::new();
        let mut sorted_canonical = Vec::with_capacity(catalog.len());

        // BTreeMap iteration is lexicographic, so first-wins collision
        // reporting is deterministic too.
        for (canonical, record) in catalog {
            if record.aliases.is_empty() {
                return Err(CatalogError::EmptyAliases { field: canonical });
            }
            if let Some(range) = record.valid_range {
                if range.min >= range.max {
                    return Err(CatalogError::InvalidRange {
                        field: canonical,
                        min: range.min,
                        max: range.max,
                    });
                }
            }

            let descriptor = record.into_descriptor(&canonical);
            Self::insert_alias(&mut alias_to_canonical, &canonical, &canonical)?;
            for alias in &descriptor.aliases {
                Self::insert_alias(&mut alias_to_canonical, alias, &canonical)?;
            }
            sorted_canonical.push(canonical.clone());
            fields.insert(canonical, descriptor);
        }

        Ok(Self {
            alias_to_canonical,
            fields,
            sorted_canonical,
        })
    }

    /// Build a manifest from a JSON catalog string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_catalog(parse_catalog(json)?)
    }

    /// Build a manifest from a catalog file on disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        Self::from_catalog(load_catalog(path)?)
    }

    /// The embedded standard catalog.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).expect("embedded catalog is valid")
    }

    fn insert_alias(
        table: &mut HashMap<String, String>,
        alias: &str,
        canonical: &str,
    ) -> Result<(), CatalogError> {
        if let Some(existing) = table.get(alias) {
            // A canonical name mapping to itself twice can't happen (map
            // keys are unique), so any collision is a real duplicate.
            return Err(CatalogError::DuplicateAlias {
                alias: alias.to_string(),
                first: existing.clone(),
                second: canonical.to_string(),
            });
        }
        table.insert(alias.to_string(), canonical.to_string());
        Ok(())
    }

    /// Resolve an alias or canonical name to its descriptor. O(1).
    /// Empty input returns `None` rather than erroring.
    pub fn resolve(&self, name: &str) -> Option<&FieldDescriptor> {
        if name.is_empty() {
            return None;
        }
        let canonical = self.alias_to_canonical.get(name)?;
        self.fields.get(canonical)
    }

    /// Whether a name (alias or canonical) is in the catalog. O(1).
    pub fn exists(&self, name: &str) -> bool {
        !name.is_empty() && self.alias_to_canonical.contains_key(name)
    }

    /// Map an alias or canonical name to the canonical name. O(1).
    pub fn canonicalize(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.alias_to_canonical.get(name).map(String::as_str)
    }

    /// Aliases of a canonical name, in catalog order.
    /// Returns `None` if the input is not a canonical name (aliases of an
    /// alias are not a thing).
    pub fn aliases_of(&self, canonical: &str) -> Option<&[String]> {
        self.fields.get(canonical).map(|d| d.aliases.as_slice())
    }

    /// All descriptors in a category, sorted by canonical name. O(n).
    /// Returns fresh clones; mutating them cannot touch catalog state.
    pub fn by_category(&self, category: FieldCategory) -> Vec<FieldDescriptor> {
        self.sorted_canonical
            .iter()
            .filter_map(|name| self.fields.get(name))
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    /// Canonical names in lexicographic order.
    pub fn canonical_names(&self) -> &[String] {
        &self.sorted_canonical
    }

    /// Number of canonical fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Static correction for a documented frequent LLM mistake.
    /// Independent of the loaded catalog.
    pub fn known_mistake(&self, name: &str) -> Option<&'static str> {
        known_mistakes::known_mistake(name)
    }
}

impl crate::traits::FieldLookup for FieldManifest {
    fn exists(&self, name: &str) -> bool {
        FieldManifest::exists(self, name)
    }

    fn canonicalize(&self, name: &str) -> Option<String> {
        FieldManifest::canonicalize(self, name).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_and_canonical_resolve_identically() {
        let manifest = FieldManifest::builtin();
        for alias in ["close", "close_price", "收盤價"] {
            let descriptor = manifest.resolve(alias).unwrap();
            assert_eq!(descriptor.canonical_name, "收盤價");
        }
        assert_eq!(manifest.canonicalize("close"), Some("收盤價"));
        assert_eq!(manifest.canonicalize("收盤價"), Some("收盤價"));
    }

    #[test]
    fn test_volume_means_trading_value_not_share_count() {
        // Regression guard: 'volume' must resolve to trading value (成交金額),
        // never the share-count field (成交股數). Getting this wrong silently
        // corrupts every downstream strategy.
        let manifest = FieldManifest::builtin();
        let descriptor = manifest.resolve("volume").unwrap();
        assert_eq!(descriptor.canonical_name, "成交金額");
        assert_ne!(descriptor.canonical_name, "成交股數");
    }

    #[test]
    fn test_empty_name_is_absent_not_error() {
        let manifest = FieldManifest::builtin();
        assert!(manifest.resolve("").is_none());
        assert!(!manifest.exists(""));
        assert!(manifest.canonicalize("").is_none());
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let manifest = FieldManifest::builtin();
        assert!(manifest.resolve("not_a_field").is_none());
        assert!(!manifest.exists("not_a_field"));
    }

    #[test]
    fn test_aliases_of_requires_canonical_name() {
        let manifest = FieldManifest::builtin();
        let aliases = manifest.aliases_of("收盤價").unwrap();
        assert_eq!(aliases[0], "close");
        // Aliases are not canonical names.
        assert!(manifest.aliases_of("close").is_none());
    }

    #[test]
    fn test_by_category_returns_sorted_copies() {
        let manifest = FieldManifest::builtin();
        let fundamentals = manifest.by_category(FieldCategory::Fundamental);
        assert!(!fundamentals.is_empty());
        let names: Vec<&str> = fundamentals
            .iter()
            .map(|d| d.canonical_name.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(fundamentals
            .iter()
            .all(|d| d.category == FieldCategory::Fundamental));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let manifest = FieldManifest::builtin();
        let first = manifest.resolve("pe").map(|d| d.canonical_name.clone());
        let second = manifest.resolve("pe").map(|d| d.canonical_name.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_alias_is_fatal() {
        let doc = r#"{
            "甲": {
                "category": "price", "frequency": "daily", "value_type": "float",
                "description": {"zh": "", "en": ""}, "aliases": ["dup"]
            },
            "乙": {
                "category": "price", "frequency": "daily", "value_type": "float",
                "description": {"zh": "", "en": ""}, "aliases": ["dup"]
            }
        }"#;
        let err = FieldManifest::from_json(doc).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateAlias { .. }));
    }

    #[test]
    fn test_empty_alias_list_is_fatal() {
        let doc = r#"{
            "甲": {
                "category": "price", "frequency": "daily", "value_type": "float",
                "description": {"zh": "", "en": ""}, "aliases": []
            }
        }"#;
        let err = FieldManifest::from_json(doc).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyAliases { .. }));
    }

    #[test]
    fn test_degenerate_range_is_fatal() {
        let doc = r#"{
            "甲": {
                "category": "price", "frequency": "daily", "value_type": "float",
                "description": {"zh": "", "en": ""}, "aliases": ["a"],
                "valid_range": [5.0, 5.0]
            }
        }"#;
        let err = FieldManifest::from_json(doc).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRange { .. }));
    }

    #[test]
    fn test_canonical_names_are_sorted() {
        let manifest = FieldManifest::builtin();
        let names = manifest.canonical_names();
        let mut sorted = names.to_vec();
        sorted.sort();
        assert_eq!(names, sorted.as_slice());
    }

    #[test]
    fn test_known_mistake_table_is_catalog_independent() {
        let manifest = FieldManifest::from_json("{}").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.known_mistake("price"), Some("收盤價"));
    }
}
