/*
 * repository.rs
 * Copyright (c) 2025 Yivic
 */

//! Configuration repository with dotted-key access.

use serde_json::{Map, Value};

/// Merged configuration snapshot.
///
/// Keys are looked up with dot notation (`view.compiled`). A lookup first
/// walks nested objects and then falls back to a literal top-level key, so
/// both `{"view": {"paths": [...]}}` and `{"view.paths": [...]}` answer
/// `get("view.paths")`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigRepository {
    items: Map<String, Value>,
}

impl ConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(items: Map<String, Value>) -> Self {
        Self { items }
    }

    /// Build from a JSON value; anything but an object yields an empty repository.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(items) => Self { items },
            _ => Self::default(),
        }
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.items
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return None;
        }
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.items.get(first);
        for segment in segments {
            current = current.and_then(|v| v.as_object()).and_then(|o| o.get(segment));
        }
        current.or_else(|| self.items.get(key))
    }

    /// String value with surrounding whitespace trimmed; blank counts as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Boolean view of a value using loose truthiness.
    ///
    /// `null`, `false`, `0`, `""`, `"0"`, `[]` and `{}` are false; everything
    /// else is true. Absent keys are false.
    pub fn get_flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// List of strings; numbers are stringified and other items skipped.
    ///
    /// A value that is not an array yields an empty list.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        let Some(Value::Array(items)) = self.get(key) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Set a value, creating intermediate objects along a dotted key.
    ///
    /// Non-object values sitting on the path are replaced.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut current = &mut self.items;
        for segment in segments {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(next) = slot else {
                return;
            };
            current = next;
        }
        current.insert(last.to_string(), value);
    }

    /// Merge another layer on top of this one (see [`merge_replace_recursive`]).
    pub fn merge(&mut self, overlay: Map<String, Value>) {
        merge_maps(&mut self.items, overlay);
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value, arrays included,
/// replaces what is in `base`.
pub fn merge_replace_recursive(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => merge_maps(base_map, overlay_map),
        (slot, overlay) => *slot = overlay,
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_replace_recursive(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
