/*
 * view.rs
 * Copyright (c) 2025 Yivic
 */

//! View lookup across the layered search paths.
//!
//! The templating engine itself is external and plugs in through
//! [`ViewEngine`]. This module only decides *which* file a view name means,
//! where its compiled form lives, and what data it receives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use yivic_runtime::SharedRuntime;

use crate::context::ThemeContext;
use crate::error::{Result, ThemeError};

/// File extensions tried for each view name, in order.
pub const VIEW_EXTENSIONS: &[&str] = &["blade.php", "php"];

/// Data handed to a view.
pub type ViewData = Map<String, Value>;

/// Maps view names to files.
///
/// Names use dot notation: `partials.header` is `partials/header.blade.php`
/// (or `.php`) under the first search path that has it.
pub struct ViewFinder {
    runtime: SharedRuntime,
    paths: Vec<String>,
    extensions: Vec<String>,
    found: Mutex<HashMap<String, PathBuf>>,
}

impl std::fmt::Debug for ViewFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewFinder")
            .field("paths", &self.paths)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl ViewFinder {
    pub fn new(runtime: SharedRuntime, paths: Vec<String>) -> Self {
        Self {
            runtime,
            paths,
            extensions: VIEW_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            found: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the extension list (highest precedence first).
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Find the file for a view name.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        let relative = view_relative_path(name)?;

        if let Some(path) = self.cache().get(name) {
            return Ok(path.clone());
        }

        for base in &self.paths {
            for extension in &self.extensions {
                let candidate = PathBuf::from(format!("{}/{}.{}", base, relative, extension));
                if self.runtime.is_readable_file(&candidate) {
                    tracing::debug!(view = name, path = %candidate.display(), "Found view");
                    self.cache().insert(name.to_string(), candidate.clone());
                    return Ok(candidate);
                }
            }
        }

        Err(ThemeError::ViewNotFound {
            name: name.to_string(),
            searched: self.paths.clone(),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Forget memoized lookups.
    pub fn flush(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, PathBuf>> {
        self.found.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `partials.header` → `partials/header`; rejects names that could escape.
fn view_relative_path(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains("..") || trimmed.contains('\\') {
        return Err(ThemeError::InvalidViewName(name.to_string()));
    }
    let relative = trimmed.trim_start_matches('/').replace('.', "/");
    if relative.is_empty() || relative.split('/').any(str::is_empty) {
        return Err(ThemeError::InvalidViewName(name.to_string()));
    }
    Ok(relative)
}

/// Compiled-cache file for a view: `<compiled dir>/<sha1 of view path>.php`.
///
/// The key is the view's path, not its contents, and is 40 hex characters.
/// These names intentionally differ from the 32-hex names Blade's own
/// compiler writes, so an engine that compiles Blade keeps its own cache
/// naming inside the same directory.
pub fn compiled_path_for(compiled_dir: &str, view_file: &Path) -> PathBuf {
    let mut hasher = Sha1::new();
    hasher.update(view_file.to_string_lossy().as_bytes());
    let file = format!("{}.php", hex::encode(hasher.finalize()));
    if compiled_dir.is_empty() {
        PathBuf::from(file)
    } else {
        Path::new(compiled_dir).join(file)
    }
}

/// Everything an engine needs to render one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub name: String,
    pub path: PathBuf,
    pub compiled_path: PathBuf,
    pub data: ViewData,
}

/// A templating engine.
pub trait ViewEngine {
    fn render(&self, request: &ViewRequest) -> Result<String>;
}

/// Engine that returns the view file unchanged. Useful for static
/// partials and for inspecting which file won.
pub struct RawViewEngine {
    runtime: SharedRuntime,
}

impl RawViewEngine {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ViewEngine for RawViewEngine {
    fn render(&self, request: &ViewRequest) -> Result<String> {
        Ok(self.runtime.file_read_string(&request.path)?)
    }
}

/// Builds [`ViewRequest`]s from names and data.
#[derive(Debug)]
pub struct ViewFactory {
    finder: ViewFinder,
    compiled_dir: String,
    shared: RwLock<ViewData>,
}

impl ViewFactory {
    /// Create the factory for a context, making sure the compiled directory
    /// exists. `theme` and `config` are shared with every view.
    pub fn new(context: &ThemeContext) -> Self {
        context.ensure_compiled_dir_exists();

        let mut shared = Map::new();
        shared.insert("theme".to_string(), context.to_json());
        shared.insert(
            "config".to_string(),
            Value::Object(context.config().all().clone()),
        );

        Self {
            finder: ViewFinder::new(
                context.runtime().clone(),
                context.view_search_paths().to_vec(),
            ),
            compiled_dir: context.compiled_cache_path().to_string(),
            shared: RwLock::new(shared),
        }
    }

    pub fn finder(&self) -> &ViewFinder {
        &self.finder
    }

    pub fn compiled_dir(&self) -> &str {
        &self.compiled_dir
    }

    /// Share a value with every view made after this call.
    pub fn share(&self, key: impl Into<String>, value: Value) {
        self.shared
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    pub fn shared(&self) -> ViewData {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.finder.exists(name)
    }

    /// Resolve a view and assemble its data.
    ///
    /// Keys in `merge_data` beat keys in `data`, which beat shared keys.
    pub fn make(&self, name: &str, data: ViewData, merge_data: ViewData) -> Result<ViewRequest> {
        let path = self.finder.find(name)?;
        let compiled_path = compiled_path_for(&self.compiled_dir, &path);

        let mut merged = self.shared();
        merged.extend(data);
        merged.extend(merge_data);

        Ok(ViewRequest {
            name: name.to_string(),
            path,
            compiled_path,
            data: merged,
        })
    }

    pub fn render(&self, name: &str, data: ViewData, engine: &dyn ViewEngine) -> Result<String> {
        let request = self.make(name, data, Map::new())?;
        engine.render(&request)
    }
}
