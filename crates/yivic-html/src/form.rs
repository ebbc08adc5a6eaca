/*
 * form.rs
 * Copyright (c) 2025 Yivic
 */

//! Schema-driven settings forms.
//!
//! A form is a list of [`Field`]s rendered against a set of [`FormValues`].
//! Field ids and names come from a [`FieldNamer`] so the same schema works
//! for widgets, option pages or anything else that namespaces its inputs.

use std::fmt;

use indexmap::IndexMap;

use crate::attributes::{AttrValue, HtmlAttributes, escape};
use crate::html::{self, Options};

/// Default label of the leading empty `<option>`.
pub const DEFAULT_EMPTY_LABEL: &str = "— Select —";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Bool(true) => f.write_str("1"),
            FieldValue::Bool(false) => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Current values by field key.
pub type FormValues = IndexMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number {
        min: Option<i64>,
        max: Option<i64>,
        step: i64,
    },
    /// Rendered bare, without label or paragraph.
    Hidden,
    Password,
    File,
    Textarea {
        rows: u32,
    },
    /// Checked when the current value equals `truthy`.
    Checkbox {
        truthy: String,
    },
    Select {
        options: Options,
        /// Label of a leading `0` option, when wanted.
        empty_label: Option<String>,
    },
    Radio {
        options: Options,
    },
}

/// Conditions that must all hold for a field to be shown.
///
/// Values are compared as strings, and a missing value compares as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct When {
    conditions: Vec<(String, String)>,
}

impl When {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, key: impl Into<String>, expected: impl Into<String>) -> Self {
        self.conditions.push((key.into(), expected.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn passes(&self, values: &FormValues) -> bool {
        self.conditions.iter().all(|(key, expected)| {
            let actual = values.get(key).map(ToString::to_string).unwrap_or_default();
            actual == *expected
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub attrs: HtmlAttributes,
    pub when: When,
    pub help: Option<String>,
}

impl Field {
    pub fn new(kind: FieldKind, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            attrs: HtmlAttributes::new(),
            when: When::new(),
            help: None,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Text, key, label)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(
            FieldKind::Number {
                min: Some(min),
                max: Some(max),
                step: 1,
            },
            key,
            label,
        )
    }

    pub fn hidden(key: impl Into<String>) -> Self {
        Self::new(FieldKind::Hidden, key, "")
    }

    pub fn textarea(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Textarea { rows: 4 }, key, label)
    }

    pub fn checkbox(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            FieldKind::Checkbox {
                truthy: "1".to_string(),
            },
            key,
            label,
        )
    }

    pub fn select(key: impl Into<String>, label: impl Into<String>, options: Options) -> Self {
        Self::new(
            FieldKind::Select {
                options,
                empty_label: None,
            },
            key,
            label,
        )
    }

    /// Add the leading empty option to a select; other kinds are unchanged.
    /// A blank label means [`DEFAULT_EMPTY_LABEL`].
    pub fn with_empty(mut self, label: impl Into<String>) -> Self {
        if let FieldKind::Select { empty_label, .. } = &mut self.kind {
            let label = label.into();
            *empty_label = Some(if label.trim().is_empty() {
                DEFAULT_EMPTY_LABEL.to_string()
            } else {
                label
            });
        }
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn when(mut self, key: impl Into<String>, expected: impl Into<String>) -> Self {
        self.when = self.when.and(key, expected);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Maps a field key to the `id` and `name` of its input.
pub trait FieldNamer {
    fn field_id(&self, key: &str) -> String;
    fn field_name(&self, key: &str) -> String;
}

/// Widget-instance naming: `widget-<id_base>-<n>-<key>` and
/// `widget-<id_base>[<n>][<key>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetFieldNamer {
    pub id_base: String,
    pub number: u32,
}

impl WidgetFieldNamer {
    pub fn new(id_base: impl Into<String>, number: u32) -> Self {
        Self {
            id_base: id_base.into(),
            number,
        }
    }
}

impl FieldNamer for WidgetFieldNamer {
    fn field_id(&self, key: &str) -> String {
        format!("widget-{}-{}-{}", self.id_base, self.number, key)
    }

    fn field_name(&self, key: &str) -> String {
        format!("widget-{}[{}][{}]", self.id_base, self.number, key)
    }
}

/// Render every visible field, in schema order.
pub fn render_form(namer: &dyn FieldNamer, fields: &[Field], values: &FormValues) -> String {
    let mut out = String::new();
    for field in fields {
        if field.key.is_empty() || !field.when.passes(values) {
            continue;
        }
        out.push_str(&render_field(namer, field, values));
    }
    out
}

fn render_field(namer: &dyn FieldNamer, field: &Field, values: &FormValues) -> String {
    let id = namer.field_id(&field.key);
    let name = namer.field_name(&field.key);
    let value = values.get(&field.key);
    let text = value.map(ToString::to_string).unwrap_or_default();
    let attrs = HtmlAttributes::new().with("id", id.as_str()).merge(&field.attrs);

    let control = match &field.kind {
        FieldKind::Text => {
            let attrs = defaults(&[("class", "widefat"), ("type", "text")]).merge(&attrs);
            html::input("text", &name, Some(&text), &attrs)
        }
        FieldKind::Number { min, max, step } => {
            let mut base = defaults(&[("class", "tiny-text"), ("type", "number")]);
            base.set("step", *step);
            let mut bounds = HtmlAttributes::new();
            if let Some(min) = min {
                bounds.set("min", *min);
            }
            if let Some(max) = max {
                bounds.set("max", *max);
            }
            // Schema attrs still win over the typed bounds.
            let attrs = base.merge(&bounds.merge(&attrs));
            html::input("number", &name, Some(&text), &attrs)
        }
        FieldKind::Hidden => return html::input("hidden", &name, Some(&text), &attrs),
        FieldKind::Password => {
            let attrs = defaults(&[("class", "widefat"), ("type", "password")]).merge(&attrs);
            html::input("password", &name, Some(&text), &attrs)
        }
        FieldKind::File => {
            let attrs = defaults(&[("class", "widefat"), ("type", "file")]).merge(&attrs);
            html::input("file", &name, None, &attrs)
        }
        FieldKind::Textarea { rows } => {
            let mut base = defaults(&[("class", "widefat")]);
            base.set("rows", *rows);
            html::textarea(&name, &text, &base.merge(&attrs))
        }
        FieldKind::Checkbox { truthy } => {
            let checked = match value {
                Some(FieldValue::Bool(b)) => *b,
                Some(other) => other.to_string() == *truthy,
                None => false,
            };
            let control = html::checkbox(&name, truthy, checked, &attrs);
            let inline = if field.label.is_empty() {
                String::new()
            } else {
                format!(" {}", escape(&field.label))
            };
            return html::p(
                &format!(
                    "<label for=\"{}\">{}{}</label>{}",
                    escape(&id),
                    control,
                    inline,
                    help(field)
                ),
                &HtmlAttributes::new(),
            );
        }
        FieldKind::Select {
            options,
            empty_label,
        } => {
            let attrs = defaults(&[("class", "widefat")]).merge(&attrs);
            html::select(
                &name,
                value.map(|_| text.as_str()),
                options,
                &attrs,
                empty_label.as_deref(),
            )
        }
        FieldKind::Radio { options } => {
            html::radio_group(&name, value.map(|_| text.as_str()), options, " ", &field.attrs)
        }
    };

    let mut block = String::new();
    if !field.label.is_empty() {
        block.push_str(&html::label(
            &field.label,
            &HtmlAttributes::new().with("for", id.as_str()),
        ));
        block.push_str("<br />");
    }
    block.push_str(&control);
    block.push_str(&help(field));
    html::p(&block, &HtmlAttributes::new())
}

fn defaults(pairs: &[(&str, &str)]) -> HtmlAttributes {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn help(field: &Field) -> String {
    match field.help.as_deref().map(str::trim) {
        Some(help) if !help.is_empty() => {
            format!("<br /><small class=\"description\">{}</small>", escape(help))
        }
        _ => String::new(),
    }
}
