/*
 * lib.rs
 * Copyright (c) 2025 Yivic
 */

//! HTML building blocks for theme admin screens and widgets.
//!
//! - [`HtmlAttributes`]: ordered, hardened attribute rendering
//! - [`html`]: element builders (`input`, `select`, `checkbox`, ...)
//! - [`form`]: schema-driven settings forms with conditional fields
//! - [`widget`]: widget settings normalization and the tabs widget
//!
//! # Example
//!
//! ```rust
//! use yivic_html::{Field, FormValues, WidgetFieldNamer, render_form};
//!
//! let namer = WidgetFieldNamer::new("search", 3);
//! let html = render_form(&namer, &[Field::text("title", "Title")], &FormValues::new());
//! assert!(html.contains(r#"name="widget-search[3][title]""#));
//! ```

pub mod attributes;
pub mod form;
pub mod html;
pub mod widget;

pub use attributes::{AttrValue, HtmlAttributes, escape};
pub use form::{
    Field, FieldKind, FieldNamer, FieldValue, FormValues, When, WidgetFieldNamer, render_form,
};
pub use html::Options;
pub use widget::{FeaturedSource, Instance, TabsWidget, Translator, Widget};
