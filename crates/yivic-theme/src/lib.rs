/*
 * lib.rs
 * Copyright (c) 2025 Yivic
 */

//! Layered child/parent theme resolution.
//!
//! A child theme overrides a parent theme file by file. This crate answers,
//! for one request, where things live:
//!
//! - **assets**: child file if readable, else parent file, else the child URL
//! - **hashed assets**: logical names mapped through the build manifest
//! - **views**: first match across child, extra and parent view directories
//! - **compiled views**: one cache directory with deterministic file names
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::Map;
//! use yivic_runtime::NativeRuntime;
//! use yivic_theme::ThemeApp;
//!
//! # fn main() -> yivic_theme::Result<()> {
//! let mut app = ThemeApp::new("/var/www/wp-content/themes/child", Map::new(), Arc::new(NativeRuntime::new()))?;
//! app.bootstrap()?;
//! let theme = app.theme()?;
//! let css = theme.mix("css/main.css");
//! # Ok(())
//! # }
//! ```

mod app;
mod context;
mod error;
mod factory;
mod identity;
mod manifest;
pub mod paths;
mod view;
pub mod widgets;

pub use app::{ServiceProvider, ThemeApp, ThemeAppSlot, ViewServiceProvider};
pub use context::ThemeContext;
pub use error::{Result, ThemeError};
pub use factory::{COMPILED_VIEWS_DIR, ThemeContextFactory, VIEWS_DIR};
pub use identity::{DEFAULT_ENV, DEFAULT_SLUG, ThemeIdentity, ThemeRoots};
pub use manifest::{AssetManifest, DEFAULT_MANIFEST_CANDIDATES, DIST_ROOT};
pub use view::{
    RawViewEngine, VIEW_EXTENSIONS, ViewData, ViewEngine, ViewFactory, ViewFinder, ViewRequest,
    compiled_path_for,
};
