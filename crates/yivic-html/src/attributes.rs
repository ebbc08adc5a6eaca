/*
 * attributes.rs
 * Copyright (c) 2025 Yivic
 */

//! Attribute bags rendered into safe HTML.
//!
//! [`HtmlAttributes::build`] is the single place where attribute names and
//! values become markup, so every hardening rule lives here:
//!
//! - inline event handlers (`onclick`, `onLoad`, ...) are dropped
//! - names are reduced to `[A-Za-z0-9-_:]`
//! - `true` renders as `name="name"`, `false` is omitted
//! - values are HTML-escaped

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^on[a-z]+$").unwrap());
static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-_:]").unwrap());
static STYLE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-]+$").unwrap());

/// Escape text for HTML content or a quoted attribute value.
///
/// Replaces `&`, `<`, `>`, `"` and `'`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    /// Boolean attribute: present when true, omitted when false.
    Bool(bool),
    /// Space-separated tokens (`class`); empty tokens are dropped.
    List(Vec<String>),
    /// Inline style declarations in order.
    Style(Vec<(String, String)>),
}

impl AttrValue {
    /// Rendered value, or `None` when the attribute is omitted.
    fn render(&self, name: &str) -> Option<String> {
        match self {
            AttrValue::Text(text) => Some(escape(text)),
            AttrValue::Int(n) => Some(n.to_string()),
            AttrValue::Bool(true) => Some(name.to_string()),
            AttrValue::Bool(false) => None,
            AttrValue::List(items) => Some(escape(
                &items
                    .iter()
                    .map(String::as_str)
                    .filter(|item| !item.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            )),
            AttrValue::Style(pairs) => Some(escape(&build_style(pairs))),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// `k:v` pairs joined by `;`.
///
/// Properties outside `[A-Za-z0-9-]` are skipped; quotes and semicolons are
/// removed from values so a value cannot open another declaration.
fn build_style(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .filter_map(|(property, value)| {
            let property = property.trim();
            if property.is_empty() || !STYLE_PROPERTY.is_match(property) {
                return None;
            }
            let value: String = value
                .trim()
                .chars()
                .filter(|c| !matches!(c, '"' | '\'' | ';'))
                .collect();
            Some(format!("{}:{}", property, value))
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Ordered set of HTML attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlAttributes {
    attrs: IndexMap<String, AttrValue>,
}

impl HtmlAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute. An existing attribute keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Overlay `other`: its values win, keys already present keep their
    /// position and new keys are appended.
    pub fn merge(mut self, other: &HtmlAttributes) -> Self {
        for (name, value) in &other.attrs {
            self.attrs.insert(name.clone(), value.clone());
        }
        self
    }

    /// Render as ` name="value" ...`, with a leading space, or `""` when
    /// nothing survives the hardening rules.
    pub fn build(&self) -> String {
        let mut out = String::new();
        for (raw_name, value) in &self.attrs {
            let raw_name = raw_name.trim();
            if raw_name.is_empty() {
                continue;
            }
            let name = UNSAFE_NAME_CHARS.replace_all(raw_name, "");
            if name.is_empty() {
                continue;
            }
            // Checked after stripping so `on load` cannot become `onload`.
            if EVENT_HANDLER.is_match(&name) {
                tracing::debug!(attribute = raw_name, "Dropping inline event handler");
                continue;
            }
            if let Some(rendered) = value.render(&name) {
                out.push(' ');
                out.push_str(&name);
                out.push_str("=\"");
                out.push_str(&rendered);
                out.push('"');
            }
        }
        out
    }
}

impl fmt::Display for HtmlAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for HtmlAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = HtmlAttributes::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}
