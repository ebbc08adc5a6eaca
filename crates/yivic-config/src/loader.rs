/*
 * loader.rs
 * Copyright (c) 2025 Yivic
 */

//! Loading a configuration directory into a [`ConfigRepository`].
//!
//! Conventions:
//! - Configuration lives under `<theme>/wp-app-config/`.
//! - Each file holds one JSON or TOML object.
//! - `app.*` is merged at the root; every other file is merged under a
//!   top-level key named after its stem (`view.toml` → `view.*`).
//! - Runtime overrides are merged last and win over everything.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use yivic_runtime::{RuntimeError, SystemRuntime};

use crate::repository::ConfigRepository;

/// Default configuration directory name, relative to the theme root.
pub const DEFAULT_CONFIG_DIR: &str = "wp-app-config";

/// Stem of the file merged at the configuration root.
const ROOT_STEM: &str = "app";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file {path} does not contain a top-level object")]
    NotAnObject { path: PathBuf },

    #[error("unsupported config file format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(ConfigFormat::Json),
            Some("toml") => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Parse configuration file contents in the given format.
pub fn parse_config_str(
    contents: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<Map<String, Value>, ConfigError> {
    let value = match format {
        ConfigFormat::Json => {
            serde_json::from_str::<Value>(contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
        ConfigFormat::Toml => {
            let table = toml::from_str::<toml::Table>(contents).map_err(|source| {
                ConfigError::Toml {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            toml_to_json(toml::Value::Table(table))
        }
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Read and parse one configuration file through the runtime.
pub fn parse_config_file(
    runtime: &dyn SystemRuntime,
    path: &Path,
) -> Result<Map<String, Value>, ConfigError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let contents = runtime
        .file_read_string(path)
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_config_str(&contents, format, path)
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Loads a configuration directory.
///
/// Loading is lenient: a missing directory gives an empty repository and a
/// broken file is skipped with a warning, so a typo in one file never takes
/// the whole theme down.
pub struct ConfigLoader<'a> {
    runtime: &'a dyn SystemRuntime,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self { runtime }
    }

    pub fn load(&self, config_dir: &Path, overrides: &Map<String, Value>) -> ConfigRepository {
        let mut repository = ConfigRepository::new();

        let files = self.config_files(config_dir);
        let (root_files, named_files): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|path| file_stem(path) == Some(ROOT_STEM));

        for path in root_files {
            if let Some(map) = self.load_file(&path) {
                repository.merge(map);
            }
        }

        for path in named_files {
            let (Some(stem), Some(map)) = (file_stem(&path), self.load_file(&path)) else {
                continue;
            };
            let mut layer = Map::new();
            layer.insert(stem.to_string(), Value::Object(map));
            repository.merge(layer);
        }

        repository.merge(overrides.clone());
        repository
    }

    /// Supported files directly inside `config_dir`, sorted by name.
    fn config_files(&self, config_dir: &Path) -> Vec<PathBuf> {
        if !self.runtime.is_dir(config_dir).unwrap_or(false) {
            tracing::debug!(dir = %config_dir.display(), "No config directory");
            return Vec::new();
        }
        let mut files = match self.runtime.dir_list(config_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %config_dir.display(), error = %e, "Cannot list config directory");
                return Vec::new();
            }
        };
        files.retain(|p| ConfigFormat::from_path(p).is_some() && self.runtime.is_readable_file(p));
        files.sort();
        files
    }

    fn load_file(&self, path: &Path) -> Option<Map<String, Value>> {
        match parse_config_file(self.runtime, path) {
            Ok(map) => {
                tracing::debug!(file = %path.display(), keys = map.len(), "Loaded config file");
                Some(map)
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping config file");
                None
            }
        }
    }
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yivic_runtime::MemoryRuntime;

    #[test]
    fn test_parse_toml_to_json() {
        let map = parse_config_str(
            "debug = true\n[view]\npaths = [\"/a\"]\nratio = 1.5\n",
            ConfigFormat::Toml,
            Path::new("app.toml"),
        )
        .unwrap();
        assert_eq!(
            Value::Object(map),
            json!({ "debug": true, "view": { "paths": ["/a"], "ratio": 1.5 } })
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_config_str("[1, 2]", ConfigFormat::Json, Path::new("app.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject { .. }));
    }

    #[test]
    fn test_parse_config_file_unsupported_extension() {
        let rt = MemoryRuntime::new().with_file("/cfg/app.php", "<?php return [];");
        let err = parse_config_file(&rt, Path::new("/cfg/app.php")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_directory_gives_overrides_only() {
        let rt = MemoryRuntime::new();
        let mut overrides = Map::new();
        overrides.insert("debug".to_string(), json!(true));
        let repo = ConfigLoader::new(&rt).load(Path::new("/nowhere"), &overrides);
        assert_eq!(Value::Object(repo.into_map()), json!({ "debug": true }));
    }

    #[test]
    fn test_app_file_merges_at_root_others_under_stem() {
        let rt = MemoryRuntime::new()
            .with_file("/cfg/app.json", r#"{"themeSlug": "child", "view": {"compiled": "/c"}}"#)
            .with_file("/cfg/view.toml", "paths = [\"/extra\"]\n");
        let repo = ConfigLoader::new(&rt).load(Path::new("/cfg"), &Map::new());
        assert_eq!(repo.get_str("themeSlug"), Some("child"));
        assert_eq!(repo.get_str("view.compiled"), Some("/c"));
        assert_eq!(repo.get_str_list("view.paths"), vec!["/extra"]);
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let rt = MemoryRuntime::new()
            .with_file("/cfg/app.json", r#"{"env": "staging"}"#)
            .with_file("/cfg/cache.json", "{ not json");
        let repo = ConfigLoader::new(&rt).load(Path::new("/cfg"), &Map::new());
        assert_eq!(repo.get_str("env"), Some("staging"));
        assert!(!repo.has("cache"));
    }
}
