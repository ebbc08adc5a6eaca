//! Layered configuration for theme runtimes.
//!
//! Copyright (c) 2025 Yivic
//!
//! This crate provides:
//! - [`ConfigRepository`]: a merged snapshot with dotted-key lookups
//! - [`merge_replace_recursive`]: the layer merge rule (objects merge, everything else replaces)
//! - [`ConfigLoader`]: reads a `wp-app-config/` directory of JSON/TOML files
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use serde_json::Map;
//! use yivic_config::ConfigLoader;
//! use yivic_runtime::NativeRuntime;
//!
//! let runtime = NativeRuntime::new();
//! let config = ConfigLoader::new(&runtime).load(Path::new("/theme/wp-app-config"), &Map::new());
//! let compiled = config.get_str("view.compiled");
//! ```

mod loader;
mod repository;

pub use loader::{
    ConfigError, ConfigFormat, ConfigLoader, DEFAULT_CONFIG_DIR, parse_config_file,
    parse_config_str,
};
pub use repository::{ConfigRepository, merge_replace_recursive};
