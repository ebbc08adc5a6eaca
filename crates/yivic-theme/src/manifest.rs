/*
 * manifest.rs
 * Copyright (c) 2025 Yivic
 */

//! Hashed asset manifest.
//!
//! The build writes a flat JSON object mapping logical asset names to their
//! content-hashed output names:
//!
//! ```json
//! { "css/main.css": "css/main.ab12cd34.css", "js/main.js": "js/main.9f8e7d.js" }
//! ```

use std::collections::HashMap;

use serde_json::Value;

/// Build root that hashed and unhashed assets are served from.
pub const DIST_ROOT: &str = "public-assets/dist";

/// Manifest locations tried when the caller does not name one.
pub const DEFAULT_MANIFEST_CANDIDATES: &[&str] = &[
    "public-assets/dist/manifest/manifest.json",
    "public-assets/dist/manifest.json",
];

/// Logical asset name → hashed relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: HashMap<String, String>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest JSON.
    ///
    /// Malformed input and non-object documents give an empty manifest.
    /// Entries whose key or value is not a non-empty string are dropped, and
    /// leading slashes are stripped from both sides.
    pub fn parse(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "Manifest is not valid JSON");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let entries = object
            .iter()
            .filter_map(|(key, value)| {
                let value = value.as_str()?;
                let key = key.trim_start_matches('/');
                let value = value.trim_start_matches('/');
                (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries
            .get(logical.trim_start_matches('/'))
            .map(String::as_str)
    }

    /// Add one mapping with the same normalization as [`parse`](Self::parse);
    /// an entry that is empty on either side is ignored.
    pub fn insert(&mut self, logical: impl AsRef<str>, hashed: impl AsRef<str>) {
        let logical = logical.as_ref().trim_start_matches('/');
        let hashed = hashed.as_ref().trim_start_matches('/');
        if logical.is_empty() || hashed.is_empty() {
            return;
        }
        self.entries.insert(logical.to_string(), hashed.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_manifest() {
        let manifest = AssetManifest::parse(
            r#"{"css/main.css": "css/main.ab12cd34.css", "/js/main.js": "/js/main.99.js"}"#,
        );
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("css/main.css"), Some("css/main.ab12cd34.css"));
        assert_eq!(manifest.get("js/main.js"), Some("js/main.99.js"));
        assert_eq!(manifest.get("/js/main.js"), Some("js/main.99.js"));
    }

    #[test]
    fn test_parse_drops_invalid_entries() {
        let manifest = AssetManifest::parse(
            r#"{"a.css": 12, "b.css": "", "": "c.css", "d.css": {"x": "y"}, "e.css": "e.1.css"}"#,
        );
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("e.css"), Some("e.1.css"));
    }

    #[test]
    fn test_insert_normalizes_like_parse() {
        let mut manifest = AssetManifest::new();
        assert!(manifest.is_empty());
        manifest.insert("/css/main.css", "/css/main.ab12cd34.css");
        manifest.insert("js/app.js", "");
        manifest.insert("/", "x.js");

        assert_eq!(
            manifest,
            AssetManifest::parse(r#"{"css/main.css": "css/main.ab12cd34.css"}"#)
        );
        assert_eq!(manifest.get("css/main.css"), Some("css/main.ab12cd34.css"));
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(AssetManifest::parse("").is_empty());
        assert!(AssetManifest::parse("{ nope").is_empty());
        assert!(AssetManifest::parse(r#"["css/main.css"]"#).is_empty());
        assert!(AssetManifest::parse("\"css/main.css\"").is_empty());
    }
}
