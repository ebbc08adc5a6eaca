/*
 * config.rs
 * Copyright (c) 2025 Yivic
 *
 * Configuration and context inspection
 */

use anyhow::Result;
use serde_json::Value;

use yivic_theme::ThemeApp;

/// Print the merged configuration, or the value under `key`.
///
/// A missing key prints `null`.
pub fn execute(app: &ThemeApp, key: Option<&str>) -> Result<()> {
    let config = app.config();
    let value = match key {
        Some(key) => config.get(key).cloned().unwrap_or(Value::Null),
        None => Value::Object(config.all().clone()),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn execute_context(app: &ThemeApp) -> Result<()> {
    let theme = app.theme()?;
    println!("{}", serde_json::to_string_pretty(&theme.to_json())?);
    Ok(())
}
