/*
 * html.rs
 * Copyright (c) 2025 Yivic
 */

//! Small element builders.
//!
//! Each builder starts from its own base attributes (`type`, `name`,
//! `value`, ...) and overlays the caller's, so callers can override any of
//! them. Text content is escaped except in [`p`], whose content is markup.

use indexmap::IndexMap;

use crate::attributes::{HtmlAttributes, escape};

/// Choice lists: value → label, in display order.
pub type Options = IndexMap<String, String>;

/// `<p>` around already-rendered markup.
pub fn p(content: &str, attrs: &HtmlAttributes) -> String {
    format!("<p{}>{}</p>", attrs.build(), content)
}

pub fn label(text: &str, attrs: &HtmlAttributes) -> String {
    format!("<label{}>{}</label>", attrs.build(), escape(text))
}

/// Self-closing `<input>`; `value` is omitted when `None`.
pub fn input(kind: &str, name: &str, value: Option<&str>, attrs: &HtmlAttributes) -> String {
    let mut base = HtmlAttributes::new().with("type", kind).with("name", name);
    if let Some(value) = value {
        base.set("value", value);
    }
    format!("<input{} />", base.merge(attrs).build())
}

pub fn textarea(name: &str, value: &str, attrs: &HtmlAttributes) -> String {
    let attrs = HtmlAttributes::new().with("name", name).merge(attrs);
    format!("<textarea{}>{}</textarea>", attrs.build(), escape(value))
}

/// `<select>` with one `<option>` per entry.
///
/// With `empty` set, a leading option with value `0` and that label is
/// added. An option is selected when its value equals `selected`; an empty
/// `selected` selects nothing.
pub fn select(
    name: &str,
    selected: Option<&str>,
    options: &Options,
    attrs: &HtmlAttributes,
    empty: Option<&str>,
) -> String {
    let attrs = HtmlAttributes::new().with("name", name).merge(attrs);
    let selected = selected.unwrap_or("");

    let mut html = String::new();
    if let Some(empty_label) = empty {
        html.push_str(&option("0", empty_label, selected == "0"));
    }
    for (value, label) in options {
        html.push_str(&option(value, label, !selected.is_empty() && selected == value));
    }

    format!("<select{}>{}</select>", attrs.build(), html)
}

pub fn checkbox(name: &str, value: &str, checked: bool, attrs: &HtmlAttributes) -> String {
    let mut attrs = HtmlAttributes::new()
        .with("type", "checkbox")
        .with("name", name)
        .with("value", value)
        .merge(attrs);
    if checked {
        attrs.set("checked", true);
    }
    format!("<input{} />", attrs.build())
}

/// One labelled radio input per option, each followed by `separator`.
pub fn radio_group(
    name: &str,
    selected: Option<&str>,
    options: &Options,
    separator: &str,
    attrs: &HtmlAttributes,
) -> String {
    let selected = selected.unwrap_or("");
    let mut out = String::new();
    for (value, label) in options {
        let mut input_attrs = HtmlAttributes::new()
            .with("type", "radio")
            .with("name", name)
            .with("value", value)
            .merge(attrs);
        if !selected.is_empty() && selected == value {
            input_attrs.set("checked", true);
        }
        out.push_str(&format!(
            "<label style=\"margin-right:8px;\"><input{} /> {}</label>{}",
            input_attrs.build(),
            escape(label),
            separator
        ));
    }
    out
}

fn option(value: &str, label: &str, selected: bool) -> String {
    let mut attrs = HtmlAttributes::new().with("value", value);
    if selected {
        attrs.set("selected", true);
    }
    format!("<option{}>{}</option>", attrs.build(), escape(label))
}
