/*
 * widgets.rs
 * Copyright (c) 2025 Yivic
 */

//! Front-end rendering of [`Widget`]s through the view layer.

use std::sync::Arc;

use serde_json::Value;
use yivic_html::{Instance, Translator, Widget};

use crate::context::ThemeContext;
use crate::error::Result;
use crate::view::{ViewData, ViewEngine, ViewFactory};

/// Markup the sidebar wraps around each widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarArgs {
    pub before_widget: String,
    pub after_widget: String,
    pub before_title: String,
    pub after_title: String,
}

/// Translator bound to the theme's text domain.
pub fn translator(context: &ThemeContext) -> Translator {
    let runtime = context.runtime().clone();
    let domain = context.text_domain().to_string();
    Arc::new(move |text: &str| runtime.translate(text, &domain))
}

/// Render a widget instance: `before_widget`, the widget view, `after_widget`.
///
/// `extra` carries host-provided data (posts, comments) and wins over the
/// widget's own values. The sidebar title wrappers are passed to the view
/// as `before_title` / `after_title`.
pub fn render_widget(
    widget: &dyn Widget,
    number: u32,
    args: &SidebarArgs,
    instance: &Instance,
    extra: ViewData,
    views: &ViewFactory,
    engine: &dyn ViewEngine,
) -> Result<String> {
    let mut data = widget.view_data(number, instance);
    data.insert(
        "before_title".to_string(),
        Value::String(args.before_title.clone()),
    );
    data.insert(
        "after_title".to_string(),
        Value::String(args.after_title.clone()),
    );

    let request = views.make(widget.view_name(), data, extra)?;
    let body = engine.render(&request)?;

    Ok(format!("{}{}{}", args.before_widget, body, args.after_widget))
}
