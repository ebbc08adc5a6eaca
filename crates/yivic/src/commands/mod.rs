//! Command implementations for the Yivic CLI
//!
//! Every command works on one bootstrapped [`ThemeApp`] built from the
//! global options, and delegates to yivic-theme for the actual lookups.

pub mod asset;
pub mod compiled;
pub mod config;
pub mod views;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tracing::debug;

use yivic_config::ConfigRepository;
use yivic_runtime::NativeRuntime;
use yivic_theme::ThemeApp;

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Child theme directory
    #[arg(long, global = true)]
    pub base_path: Option<String>,

    /// Public URL of the child theme directory
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Parent theme directory
    #[arg(long, global = true)]
    pub parent_path: Option<String>,

    /// Public URL of the parent theme directory
    #[arg(long, global = true)]
    pub parent_url: Option<String>,

    /// Configuration directory (defaults to <base-path>/wp-app-config)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Configuration override (KEY=VALUE, value parsed as JSON when possible)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

/// Build and bootstrap the application described by `args`.
pub fn load_app(args: &ThemeArgs) -> Result<ThemeApp> {
    let base_path = args
        .base_path
        .as_deref()
        .context("--base-path is required")?;

    let mut runtime = NativeRuntime::new();
    if let Some(url) = &args.base_url {
        runtime = runtime.with_stylesheet_root(base_path, url.as_str());
    }
    if let Some(parent) = &args.parent_path {
        runtime = runtime.with_template_root(
            parent.as_str(),
            args.parent_url.clone().unwrap_or_default(),
        );
    }

    let overrides = parse_overrides(&args.overrides)?;
    let mut app = ThemeApp::new(base_path, overrides, Arc::new(runtime))?;
    if let Some(dir) = &args.config_dir {
        app = app.with_config_dir(dir.clone());
    }
    app.bootstrap()?;

    debug!(base = base_path, config = %app.config_dir().display(), "Theme app bootstrapped");
    Ok(app)
}

/// Turn `KEY=VALUE` pairs into a nested override map.
///
/// Dotted keys build nested objects. Values that parse as JSON keep their
/// type (`true`, `3`, `["a"]`); anything else is taken as a string.
pub fn parse_overrides(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut repository = ConfigRepository::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Invalid override {pair:?}, expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid override {pair:?}, key is empty");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        repository.set(key, value);
    }
    Ok(repository.into_map())
}
