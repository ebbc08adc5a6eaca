/*
 * asset.rs
 * Copyright (c) 2025 Yivic
 *
 * Asset and hashed-asset resolution commands
 */

use anyhow::Result;
use tracing::debug;

use yivic_theme::ThemeApp;

/// Print the URL `relative` resolves to.
pub fn execute(app: &ThemeApp, relative: &str) -> Result<()> {
    let theme = app.theme()?;
    println!("{}", theme.resolve_asset(relative));
    Ok(())
}

/// Print the hashed URL of a build asset.
///
/// Without `--manifest` the default manifest locations are searched.
pub fn execute_mix(app: &ThemeApp, relative: &str, manifests: &[String]) -> Result<()> {
    let theme = app.theme()?;
    let candidates: Vec<&str> = manifests.iter().map(String::as_str).collect();
    let url = theme.resolve_hashed_asset(relative, &candidates);
    debug!(relative, url = %url, "Resolved hashed asset");
    println!("{url}");
    Ok(())
}
