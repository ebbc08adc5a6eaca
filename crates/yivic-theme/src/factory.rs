/*
 * factory.rs
 * Copyright (c) 2025 Yivic
 */

//! Builds [`ThemeContext`] from configuration and host defaults.
//!
//! This is the only constructor of a context. Config values win; the host
//! runtime fills in what config leaves out. Apart from directory existence
//! checks for the view search paths it performs no I/O: manifests are read
//! lazily by the context and the compiled directory is created by the view
//! layer.

use std::path::Path;

use yivic_config::ConfigRepository;
use yivic_runtime::SharedRuntime;

use crate::app::ThemeApp;
use crate::context::ThemeContext;
use crate::identity::{DEFAULT_ENV, DEFAULT_SLUG, ThemeIdentity, ThemeRoots};
use crate::paths::{join_path, normalize_path};

/// Views live here under each theme root.
pub const VIEWS_DIR: &str = "resources/views";

/// Default compiled-view directory under the child root.
pub const COMPILED_VIEWS_DIR: &str = "storage/framework/views";

#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeContextFactory;

impl ThemeContextFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build the context for a bootstrapped application.
    pub fn make(&self, app: &ThemeApp) -> ThemeContext {
        self.build(app.config(), &app.base_path(""), app.runtime().clone())
    }

    /// Build a context from a config snapshot.
    ///
    /// `app_base_path` is the last-resort child root, used when neither the
    /// config nor the host names one.
    pub fn build(
        &self,
        config: &ConfigRepository,
        app_base_path: &str,
        runtime: SharedRuntime,
    ) -> ThemeContext {
        let slug = non_empty(config.get_str("themeSlug"), || DEFAULT_SLUG.to_string());
        let text_domain = non_empty(config.get_str("textDomain"), || slug.clone());
        let identity = ThemeIdentity {
            env: non_empty(config.get_str("env"), || DEFAULT_ENV.to_string()),
            debug: config.get_flag("debug"),
            slug,
            text_domain,
        };

        let child_path = config
            .get_str("basePath")
            .map(str::to_string)
            .or_else(|| runtime.stylesheet_directory())
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| app_base_path.to_string());
        let child_url = config
            .get_str("baseUrl")
            .map(str::to_string)
            .or_else(|| runtime.stylesheet_directory_uri())
            .unwrap_or_default();
        let parent_path = config
            .get_str("parentBasePath")
            .map(str::to_string)
            .or_else(|| runtime.template_directory())
            .unwrap_or_default();
        let parent_url = config
            .get_str("parentBaseUrl")
            .map(str::to_string)
            .or_else(|| runtime.template_directory_uri())
            .unwrap_or_default();

        let child = ThemeRoots::new(&child_path, &child_url);
        let parent = ThemeRoots::new(&parent_path, &parent_url);

        if identity.debug {
            if !child.is_complete() {
                tracing::warn!(
                    base_path = child.path(),
                    base_url = child.url(),
                    "Child roots missing (basePath/baseUrl); check wp-app-config/app"
                );
            }
            if !parent.is_complete() {
                tracing::info!(
                    parent_base_path = parent.path(),
                    parent_base_url = parent.url(),
                    "Parent roots missing; parent fallback for views and assets may be unavailable"
                );
            }
        }

        let view_paths = view_search_paths(
            &runtime,
            config,
            &child,
            &parent,
            &normalize_path(app_base_path),
        );

        let compiled = match config.get_str("view.compiled") {
            Some(compiled) => normalize_path(compiled),
            None if !child.path().is_empty() => child.join_path(COMPILED_VIEWS_DIR),
            None => join_path(app_base_path, COMPILED_VIEWS_DIR),
        };

        tracing::debug!(
            slug = %identity.slug,
            views = view_paths.len(),
            compiled = %compiled,
            "Built theme context"
        );

        ThemeContext::new(
            runtime,
            config.clone(),
            identity,
            child,
            parent,
            view_paths,
            compiled,
        )
    }
}

/// Child views, then configured extras in order, then parent views.
///
/// Only existing directories are kept and each appears once.
fn view_search_paths(
    runtime: &SharedRuntime,
    config: &ConfigRepository,
    child: &ThemeRoots,
    parent: &ThemeRoots,
    app_base_path: &str,
) -> Vec<String> {
    let child_views = if child.path().is_empty() {
        join_path(app_base_path, VIEWS_DIR)
    } else {
        child.join_path(VIEWS_DIR)
    };

    let mut candidates = vec![child_views];
    candidates.extend(
        config
            .get_str_list("view.paths")
            .iter()
            .map(|p| normalize_path(p)),
    );
    if !parent.path().is_empty() {
        candidates.push(parent.join_path(VIEWS_DIR));
    }

    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        if candidate.is_empty() || out.contains(&candidate) {
            continue;
        }
        if runtime.is_dir(Path::new(&candidate)).unwrap_or(false) {
            out.push(candidate);
        }
    }
    out
}

fn non_empty(value: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    value.map_or_else(fallback, str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use yivic_runtime::{MemoryRuntime, SystemRuntime};

    fn build(config: serde_json::Value, runtime: MemoryRuntime) -> ThemeContext {
        ThemeContextFactory::new().build(
            &ConfigRepository::from_value(config),
            "/app",
            Arc::new(runtime),
        )
    }

    #[test]
    fn test_identity_defaults_and_overrides() {
        let ctx = build(json!({}), MemoryRuntime::new());
        assert_eq!(ctx.slug(), "yivic-lite-child");
        assert_eq!(ctx.text_domain(), "yivic-lite-child");
        assert_eq!(ctx.env(), "production");
        assert!(!ctx.debug());

        let ctx = build(
            json!({"themeSlug": "acme", "env": " staging ", "debug": 1}),
            MemoryRuntime::new(),
        );
        assert_eq!(ctx.slug(), "acme");
        assert_eq!(ctx.text_domain(), "acme");
        assert_eq!(ctx.env(), "staging");
        assert!(ctx.debug());
    }

    #[test]
    fn test_roots_config_first_then_host() {
        let rt = MemoryRuntime::new()
            .with_stylesheet_root("/host/child", "https://host/child")
            .with_template_root("/host/parent/", "https://host/parent/");
        let ctx = build(json!({"baseUrl": "https://cfg/child/"}), rt);
        assert_eq!(ctx.child_roots().path(), "/host/child");
        assert_eq!(ctx.child_roots().url(), "https://cfg/child");
        assert_eq!(ctx.parent_roots().path(), "/host/parent");
        assert_eq!(ctx.parent_roots().url(), "https://host/parent");
        assert!(ctx.has_parent_roots());
    }

    #[test]
    fn test_child_path_falls_back_to_app_base() {
        let ctx = build(json!({}), MemoryRuntime::new());
        assert_eq!(ctx.child_roots().path(), "/app");
        assert_eq!(ctx.child_roots().url(), "");
        assert!(!ctx.has_parent_roots());
        assert_eq!(ctx.compiled_cache_path(), "/app/storage/framework/views");
    }

    #[test]
    fn test_view_paths_order_and_dedup() {
        let rt = MemoryRuntime::new()
            .with_dir("/child/resources/views")
            .with_dir("/extra/views")
            .with_dir("/parent/resources/views");
        let ctx = build(
            json!({
                "basePath": "/child",
                "parentBasePath": "/parent",
                "view": {"paths": ["/extra/views/", "/missing", "/child/resources/views", "/parent/resources/views"]}
            }),
            rt,
        );
        assert_eq!(
            ctx.view_search_paths(),
            &[
                "/child/resources/views".to_string(),
                "/extra/views".to_string(),
                "/parent/resources/views".to_string(),
            ]
        );
    }

    #[test]
    fn test_flat_view_paths_key() {
        let rt = MemoryRuntime::new().with_dir("/extra");
        let ctx = build(json!({"basePath": "/child", "view.paths": ["/extra"]}), rt);
        assert_eq!(ctx.view_search_paths(), &["/extra".to_string()]);
    }

    #[test]
    fn test_compiled_path() {
        let ctx = build(json!({"basePath": "/child"}), MemoryRuntime::new());
        assert_eq!(ctx.compiled_cache_path(), "/child/storage/framework/views");

        let ctx = build(
            json!({"basePath": "/child", "view": {"compiled": "/tmp/views/"}}),
            MemoryRuntime::new(),
        );
        assert_eq!(ctx.compiled_cache_path(), "/tmp/views");
    }

    #[test]
    fn test_build_does_not_create_directories() {
        let rt = Arc::new(MemoryRuntime::new());
        let _ctx = ThemeContextFactory::new().build(
            &ConfigRepository::from_value(json!({"basePath": "/child"})),
            "/app",
            rt.clone(),
        );
        assert!(!rt.is_dir(Path::new("/child/storage")).unwrap());
    }
}
