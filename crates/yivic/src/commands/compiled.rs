/*
 * compiled.rs
 * Copyright (c) 2025 Yivic
 */

use anyhow::Result;
use tracing::info;

use yivic_theme::ThemeApp;

pub fn execute_path(app: &ThemeApp) -> Result<()> {
    println!("{}", app.theme()?.compiled_cache_path());
    Ok(())
}

/// Create the compiled view directory; fails if it still does not exist.
pub fn execute_ensure(app: &ThemeApp) -> Result<()> {
    let theme = app.theme()?;
    let dir = theme.compiled_cache_path();
    if !theme.ensure_compiled_dir_exists() {
        anyhow::bail!("Compiled view directory is not available: {dir}");
    }
    info!(dir, "Compiled view directory ready");
    println!("{dir}");
    Ok(())
}
