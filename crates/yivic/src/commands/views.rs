/*
 * views.rs
 * Copyright (c) 2025 Yivic
 *
 * View lookup commands
 */

use anyhow::Result;
use serde_json::Map;

use yivic_theme::{RawViewEngine, ThemeApp};

/// Print the view search paths, one per line, in lookup order.
pub fn execute_list(app: &ThemeApp) -> Result<()> {
    for path in app.theme()?.view_search_paths() {
        println!("{path}");
    }
    Ok(())
}

pub fn execute_find(app: &ThemeApp, name: &str) -> Result<()> {
    let path = app.views()?.finder().find(name)?;
    println!("{}", path.display());
    Ok(())
}

/// Print the resolved source of a view without any templating.
pub fn execute_render(app: &ThemeApp, name: &str) -> Result<()> {
    let engine = RawViewEngine::new(app.runtime().clone());
    let output = app.views()?.render(name, Map::new(), &engine)?;
    print!("{output}");
    Ok(())
}
