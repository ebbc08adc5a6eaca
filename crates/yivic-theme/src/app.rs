/*
 * app.rs
 * Copyright (c) 2025 Yivic
 *
 * Theme application kernel: config loading, providers, lazily built services.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use yivic_config::{ConfigLoader, ConfigRepository, DEFAULT_CONFIG_DIR};
use yivic_runtime::SharedRuntime;

use crate::context::ThemeContext;
use crate::error::{Result, ThemeError};
use crate::factory::ThemeContextFactory;
use crate::paths::normalize_path;
use crate::view::ViewFactory;

/// A unit of application setup.
///
/// `register` runs for each provider in order, then `boot` runs for all of
/// them once every provider is registered.
pub trait ServiceProvider: Send + Sync {
    /// Unique name. A second provider with the same name is ignored.
    fn name(&self) -> &str;

    fn register(&self, _app: &ThemeApp) -> Result<()> {
        Ok(())
    }

    fn boot(&self, _app: &ThemeApp) -> Result<()> {
        Ok(())
    }
}

/// Builds the view layer during boot.
#[derive(Debug, Default)]
pub struct ViewServiceProvider;

impl ViewServiceProvider {
    pub const NAME: &'static str = "view";
}

impl ServiceProvider for ViewServiceProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn boot(&self, app: &ThemeApp) -> Result<()> {
        app.views().map(|_| ())
    }
}

pub struct ThemeApp {
    base_path: String,
    overrides: Map<String, Value>,
    runtime: SharedRuntime,
    config_dir: PathBuf,
    config: ConfigRepository,
    available: Vec<Arc<dyn ServiceProvider>>,
    registered: Vec<Arc<dyn ServiceProvider>>,
    bootstrapped: bool,
    theme: OnceLock<ThemeContext>,
    views: OnceLock<ViewFactory>,
}

impl fmt::Debug for ThemeApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeApp")
            .field("base_path", &self.base_path)
            .field("config_dir", &self.config_dir)
            .field("providers", &self.provider_names())
            .field("bootstrapped", &self.bootstrapped)
            .finish_non_exhaustive()
    }
}

impl ThemeApp {
    /// Create an application rooted at `base_path` (the child theme directory).
    ///
    /// `overrides` are merged over every config file. The view provider is
    /// available by default.
    pub fn new(
        base_path: &str,
        overrides: Map<String, Value>,
        runtime: SharedRuntime,
    ) -> Result<Self> {
        let base_path = normalize_path(base_path);
        if base_path.is_empty() {
            return Err(ThemeError::MissingBasePath);
        }
        let config_dir = Path::new(&base_path).join(DEFAULT_CONFIG_DIR);

        Ok(Self {
            base_path,
            overrides,
            runtime,
            config_dir,
            config: ConfigRepository::new(),
            available: vec![Arc::new(ViewServiceProvider)],
            registered: Vec::new(),
            bootstrapped: false,
            theme: OnceLock::new(),
            views: OnceLock::new(),
        })
    }

    /// Read configuration from `dir` instead of `<base>/wp-app-config`.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Make a provider available to the registration step.
    ///
    /// Available providers are registered in the order they were added,
    /// unless config `providers` lists names, in which case exactly those
    /// are registered in that order.
    pub fn with_provider(mut self, provider: Arc<dyn ServiceProvider>) -> Self {
        self.available.push(provider);
        self
    }

    /// Run the bootstrap pipeline once: load config, register providers,
    /// boot providers. Calling it again after success does nothing.
    ///
    /// A provider failing to boot leaves the app not bootstrapped, so the
    /// next call runs the pipeline again.
    pub fn bootstrap(&mut self) -> Result<()> {
        if self.bootstrapped {
            return Ok(());
        }

        self.load_configuration();
        self.register_configured_providers()?;
        // Providers may resolve services while booting.
        self.bootstrapped = true;
        if let Err(e) = self.boot_providers() {
            self.bootstrapped = false;
            return Err(e);
        }

        tracing::debug!(
            base_path = %self.base_path,
            providers = ?self.provider_names(),
            "Theme application bootstrapped"
        );
        Ok(())
    }

    fn load_configuration(&mut self) {
        self.config = ConfigLoader::new(&*self.runtime).load(&self.config_dir, &self.overrides);
    }

    fn register_configured_providers(&mut self) -> Result<()> {
        let wanted = self.config.get_str_list("providers");
        let providers: Vec<Arc<dyn ServiceProvider>> = if wanted.is_empty() {
            self.available.clone()
        } else {
            wanted
                .iter()
                .filter_map(|name| {
                    let found = self.available.iter().find(|p| p.name() == name).cloned();
                    if found.is_none() {
                        tracing::warn!(provider = %name, "Unknown service provider in config");
                    }
                    found
                })
                .collect()
        };

        for provider in providers {
            self.register_provider(provider)?;
        }
        Ok(())
    }

    /// Register a provider now. A provider whose name is already registered
    /// is ignored.
    pub fn register_provider(&mut self, provider: Arc<dyn ServiceProvider>) -> Result<()> {
        if self.registered.iter().any(|p| p.name() == provider.name()) {
            return Ok(());
        }
        provider.register(self)?;
        self.registered.push(provider);
        Ok(())
    }

    fn boot_providers(&self) -> Result<()> {
        for provider in &self.registered {
            provider.boot(self)?;
        }
        Ok(())
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.registered.iter().map(|p| p.name()).collect()
    }

    /// Path under the application root; `""` gives the root itself.
    pub fn base_path(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            self.base_path.clone()
        } else {
            format!("{}/{}", self.base_path, relative)
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Merged configuration; empty until [`bootstrap`](Self::bootstrap).
    pub fn config(&self) -> &ConfigRepository {
        &self.config
    }

    pub fn overrides(&self) -> &Map<String, Value> {
        &self.overrides
    }

    pub fn runtime(&self) -> &SharedRuntime {
        &self.runtime
    }

    /// The resolution context, built on first use.
    pub fn theme(&self) -> Result<&ThemeContext> {
        if !self.bootstrapped {
            return Err(ThemeError::NotBootstrapped);
        }
        Ok(self
            .theme
            .get_or_init(|| ThemeContextFactory::new().make(self)))
    }

    /// The view factory, built on first use.
    pub fn views(&self) -> Result<&ViewFactory> {
        let theme = self.theme()?;
        Ok(self.views.get_or_init(|| ViewFactory::new(theme)))
    }
}

/// Holds the one application of a request.
///
/// The first [`resolve`](Self::resolve) builds and bootstraps the app; later
/// calls return that same app and ignore their arguments.
#[derive(Debug, Default)]
pub struct ThemeAppSlot {
    app: OnceLock<ThemeApp>,
}

impl ThemeAppSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        base_path: &str,
        overrides: Map<String, Value>,
        runtime: SharedRuntime,
    ) -> Result<&ThemeApp> {
        self.resolve_with(|| ThemeApp::new(base_path, overrides, runtime))
    }

    /// Like [`resolve`](Self::resolve) with a custom builder, for apps that
    /// need extra providers or another config directory.
    pub fn resolve_with(&self, build: impl FnOnce() -> Result<ThemeApp>) -> Result<&ThemeApp> {
        if let Some(app) = self.app.get() {
            return Ok(app);
        }
        let mut app = build()?;
        app.bootstrap()?;
        Ok(self.app.get_or_init(|| app))
    }

    pub fn app(&self) -> Result<&ThemeApp> {
        self.app.get().ok_or(ThemeError::NotBootstrapped)
    }

    pub fn maybe_app(&self) -> Option<&ThemeApp> {
        self.app.get()
    }
}
