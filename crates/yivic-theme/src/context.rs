/*
 * context.rs
 * Copyright (c) 2025 Yivic
 *
 * ThemeContext: the per-request resolution context.
 */

//! Child-first, parent-fallback resolution of views and assets.
//!
//! A [`ThemeContext`] is built once per request by
//! [`ThemeContextFactory`](crate::ThemeContextFactory) and is read-only
//! afterwards. Every resolution method is total: it always returns a usable
//! string and degrades to a deterministic fallback instead of failing.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use yivic_config::ConfigRepository;
use yivic_runtime::SharedRuntime;

use crate::identity::{ThemeIdentity, ThemeRoots};
use crate::manifest::{AssetManifest, DEFAULT_MANIFEST_CANDIDATES, DIST_ROOT};
use crate::paths::sanitize_relative;

pub struct ThemeContext {
    runtime: SharedRuntime,
    config: ConfigRepository,
    identity: ThemeIdentity,
    child: ThemeRoots,
    parent: ThemeRoots,
    view_paths: Vec<String>,
    compiled_view_path: String,
    /// Unset until the first hashed-asset lookup; an empty manifest means
    /// "looked, found nothing usable".
    manifest: OnceLock<AssetManifest>,
    compiled_dir_ready: OnceLock<bool>,
}

impl fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeContext")
            .field("identity", &self.identity)
            .field("child", &self.child)
            .field("parent", &self.parent)
            .field("view_paths", &self.view_paths)
            .field("compiled_view_path", &self.compiled_view_path)
            .field("manifest_loaded", &self.manifest.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ThemeContext {
    pub(crate) fn new(
        runtime: SharedRuntime,
        config: ConfigRepository,
        identity: ThemeIdentity,
        child: ThemeRoots,
        parent: ThemeRoots,
        view_paths: Vec<String>,
        compiled_view_path: String,
    ) -> Self {
        Self {
            runtime,
            config,
            identity,
            child,
            parent,
            view_paths,
            compiled_view_path,
            manifest: OnceLock::new(),
            compiled_dir_ready: OnceLock::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Core accessors
    // ---------------------------------------------------------------------

    pub fn runtime(&self) -> &SharedRuntime {
        &self.runtime
    }

    /// Configuration snapshot the context was built from.
    pub fn config(&self) -> &ConfigRepository {
        &self.config
    }

    pub fn identity(&self) -> &ThemeIdentity {
        &self.identity
    }

    pub fn slug(&self) -> &str {
        &self.identity.slug
    }

    pub fn text_domain(&self) -> &str {
        &self.identity.text_domain
    }

    pub fn env(&self) -> &str {
        &self.identity.env
    }

    pub fn debug(&self) -> bool {
        self.identity.debug
    }

    // ---------------------------------------------------------------------
    // Roots
    // ---------------------------------------------------------------------

    pub fn child_roots(&self) -> &ThemeRoots {
        &self.child
    }

    pub fn parent_roots(&self) -> &ThemeRoots {
        &self.parent
    }

    pub fn has_parent_roots(&self) -> bool {
        self.parent.is_complete()
    }

    pub fn child_path(&self, relative: &str) -> String {
        self.child.join_path(relative)
    }

    pub fn child_url(&self, relative: &str) -> String {
        self.child.join_url(relative)
    }

    pub fn parent_path(&self, relative: &str) -> String {
        self.parent.join_path(relative)
    }

    pub fn parent_url(&self, relative: &str) -> String {
        self.parent.join_url(relative)
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// Directories searched for views, highest precedence first.
    pub fn view_search_paths(&self) -> &[String] {
        &self.view_paths
    }

    /// Directory the templating engine writes compiled views to.
    pub fn compiled_cache_path(&self) -> &str {
        &self.compiled_view_path
    }

    /// Make sure the compiled-view directory exists.
    ///
    /// Best effort: a failure is logged in debug mode and otherwise ignored.
    /// The check runs once per context; later calls return the first answer.
    /// Returns whether the directory exists.
    pub fn ensure_compiled_dir_exists(&self) -> bool {
        *self.compiled_dir_ready.get_or_init(|| {
            let dir = self.compiled_view_path.as_str();
            if dir.is_empty() {
                return false;
            }
            let dir_path = Path::new(dir);
            if self.runtime.is_dir(dir_path).unwrap_or(false) {
                return true;
            }

            let created = self.runtime.dir_create(dir_path, true);
            // Another worker may have created it in the meantime.
            let exists = self.runtime.is_dir(dir_path).unwrap_or(false);
            if let Err(e) = created {
                if !exists && self.identity.debug {
                    tracing::warn!(dir, error = %e, "Cannot create compiled view directory");
                }
            }
            exists
        })
    }

    // ---------------------------------------------------------------------
    // Assets
    // ---------------------------------------------------------------------

    /// Resolve an asset URL, child first and parent second.
    ///
    /// - child file readable → child URL
    /// - else parent file readable → parent URL
    /// - else child URL anyway
    ///
    /// A rejected relative path (empty or traversing) gives the child base URL.
    pub fn resolve_asset(&self, relative: &str) -> String {
        let relative = sanitize_relative(relative);
        if relative.is_empty() {
            return self.child.url().to_string();
        }

        if self.is_readable(&self.child_path(&relative)) {
            return self.child_url(&relative);
        }

        if self.is_readable(&self.parent_path(&relative)) {
            tracing::debug!(asset = %relative, "Asset resolved from parent theme");
            return self.parent_url(&relative);
        }

        self.child_url(&relative)
    }

    /// Resolve a build asset through the hashed-asset manifest.
    ///
    /// `relative` is relative to the build root (`css/main.css`). Manifest
    /// candidates are tried in order (each child first, then parent) and the
    /// first non-empty manifest is kept for the lifetime of the context. An
    /// empty candidate list means [`DEFAULT_MANIFEST_CANDIDATES`].
    ///
    /// Without a usable mapping this falls back to the unhashed file under
    /// the build root.
    pub fn resolve_hashed_asset(&self, relative: &str, manifest_candidates: &[&str]) -> String {
        let relative = sanitize_relative(relative);
        if relative.is_empty() {
            return self.child.url().to_string();
        }

        let manifest = self.asset_manifest(manifest_candidates);
        let mapped = manifest
            .get(&relative)
            .map(sanitize_relative)
            .filter(|mapped| !mapped.is_empty());

        match mapped {
            Some(mapped) => self.resolve_asset(&format!("{}/{}", DIST_ROOT, mapped)),
            None => self.resolve_asset(&format!("{}/{}", DIST_ROOT, relative)),
        }
    }

    /// [`resolve_hashed_asset`](Self::resolve_hashed_asset) with the default manifest locations.
    pub fn mix(&self, relative: &str) -> String {
        self.resolve_hashed_asset(relative, &[])
    }

    /// The memoized manifest, loading it on first use.
    pub fn asset_manifest(&self, manifest_candidates: &[&str]) -> &AssetManifest {
        self.manifest.get_or_init(|| {
            let candidates = if manifest_candidates.is_empty() {
                DEFAULT_MANIFEST_CANDIDATES
            } else {
                manifest_candidates
            };
            candidates
                .iter()
                .map(|candidate| self.load_manifest(candidate))
                .find(|manifest| !manifest.is_empty())
                .unwrap_or_default()
        })
    }

    /// Read one manifest file, child first and parent second.
    fn load_manifest(&self, candidate: &str) -> AssetManifest {
        let candidate = sanitize_relative(candidate);
        if candidate.is_empty() {
            return AssetManifest::default();
        }

        let child = self.child_path(&candidate);
        let parent = self.parent_path(&candidate);
        let source = if self.is_readable(&child) {
            child
        } else if self.is_readable(&parent) {
            parent
        } else {
            return AssetManifest::default();
        };

        match self.runtime.file_read_string(Path::new(&source)) {
            Ok(json) => {
                let manifest = AssetManifest::parse(&json);
                if manifest.is_empty() && self.identity.debug {
                    tracing::warn!(manifest = %source, "Asset manifest is empty or malformed");
                }
                manifest
            }
            Err(e) => {
                if self.identity.debug {
                    tracing::warn!(manifest = %source, error = %e, "Cannot read asset manifest");
                }
                AssetManifest::default()
            }
        }
    }

    fn is_readable(&self, path: &str) -> bool {
        !path.is_empty() && self.runtime.is_readable_file(Path::new(path))
    }

    // ---------------------------------------------------------------------
    // i18n
    // ---------------------------------------------------------------------

    /// Translate `text` in the theme's text domain.
    pub fn translate(&self, text: &str) -> String {
        self.runtime.translate(text, &self.identity.text_domain)
    }

    // ---------------------------------------------------------------------
    // Escaping
    // ---------------------------------------------------------------------

    /// Escape text content.
    pub fn e(&self, value: impl fmt::Display) -> String {
        yivic_html::escape(&value.to_string())
    }

    /// Escape an attribute value.
    pub fn attr(&self, value: impl fmt::Display) -> String {
        yivic_html::escape(&value.to_string())
    }

    /// Escape a URL for an `href`/`src` attribute.
    pub fn url(&self, value: impl fmt::Display) -> String {
        yivic_html::escape(&value.to_string())
    }

    /// Summary shared into every view as `theme`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "slug": self.identity.slug,
            "textDomain": self.identity.text_domain,
            "env": self.identity.env,
            "debug": self.identity.debug,
            "childBasePath": self.child.path(),
            "childBaseUrl": self.child.url(),
            "parentBasePath": self.parent.path(),
            "parentBaseUrl": self.parent.url(),
            "viewPaths": self.view_paths,
            "compiledViewPath": self.compiled_view_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use yivic_runtime::{MemoryRuntime, SystemRuntime};

    fn context(runtime: MemoryRuntime, parent: bool, debug: bool) -> ThemeContext {
        let parent = if parent {
            ThemeRoots::new("/parent", "https://x/parent")
        } else {
            ThemeRoots::default()
        };
        ThemeContext::new(
            Arc::new(runtime),
            ConfigRepository::new(),
            ThemeIdentity {
                debug,
                ..ThemeIdentity::default()
            },
            ThemeRoots::new("/child", "https://x/child"),
            parent,
            Vec::new(),
            "/child/storage/framework/views".to_string(),
        )
    }

    #[test]
    fn test_resolve_asset_child_first() {
        let rt = MemoryRuntime::new()
            .with_file("/child/js/app.js", "")
            .with_file("/parent/js/app.js", "");
        let ctx = context(rt, true, false);
        assert_eq!(ctx.resolve_asset("js/app.js"), "https://x/child/js/app.js");
    }

    #[test]
    fn test_resolve_asset_parent_fallback() {
        let rt = MemoryRuntime::new().with_file("/parent/js/app.js", "");
        let ctx = context(rt, true, false);
        assert_eq!(ctx.resolve_asset("js/app.js"), "https://x/parent/js/app.js");
    }

    #[test]
    fn test_resolve_asset_missing_everywhere_uses_child() {
        let ctx = context(MemoryRuntime::new(), true, false);
        assert_eq!(ctx.resolve_asset("/js/app.js"), "https://x/child/js/app.js");
    }

    #[test]
    fn test_resolve_asset_traversal_returns_base_url() {
        let rt = MemoryRuntime::new().with_file("/etc/passwd", "");
        let ctx = context(rt, true, false);
        assert_eq!(ctx.resolve_asset("../etc/passwd"), "https://x/child");
        assert_eq!(ctx.resolve_asset(".."), "https://x/child");
        assert_eq!(ctx.resolve_asset(""), "https://x/child");
    }

    #[test]
    fn test_directory_is_not_an_asset() {
        let rt = MemoryRuntime::new().with_dir("/child/css").with_file("/parent/css/x", "");
        let ctx = context(rt, true, false);
        // "css" exists in the child only as a directory.
        assert_eq!(ctx.resolve_asset("css"), "https://x/child/css");
    }

    #[test]
    fn test_mix_uses_manifest_mapping() {
        let rt = MemoryRuntime::new().with_file(
            "/child/public-assets/dist/manifest/manifest.json",
            r#"{"css/main.css": "css/main.ab12cd34.css"}"#,
        );
        let ctx = context(rt, false, false);
        assert_eq!(
            ctx.mix("css/main.css"),
            "https://x/child/public-assets/dist/css/main.ab12cd34.css"
        );
    }

    #[test]
    fn test_mix_second_default_candidate() {
        let rt = MemoryRuntime::new().with_file(
            "/parent/public-assets/dist/manifest.json",
            r#"{"js/main.js": "js/main.1.js"}"#,
        );
        let ctx = context(rt, true, false);
        // Hashed file is missing on disk, so it resolves to the child URL.
        assert_eq!(
            ctx.mix("js/main.js"),
            "https://x/child/public-assets/dist/js/main.1.js"
        );
    }

    #[test]
    fn test_mapped_traversal_falls_back_to_unhashed() {
        let rt = MemoryRuntime::new().with_file(
            "/child/public-assets/dist/manifest.json",
            r#"{"css/main.css": "../../secret.css"}"#,
        );
        let ctx = context(rt, false, false);
        assert_eq!(
            ctx.mix("css/main.css"),
            "https://x/child/public-assets/dist/css/main.css"
        );
    }

    #[test]
    fn test_manifest_is_memoized() {
        let rt = Arc::new(MemoryRuntime::new().with_file(
            "/child/public-assets/dist/manifest.json",
            r#"{"css/main.css": "css/main.v1.css"}"#,
        ));
        let ctx = ThemeContext::new(
            rt.clone(),
            ConfigRepository::new(),
            ThemeIdentity::default(),
            ThemeRoots::new("/child", "https://x/child"),
            ThemeRoots::default(),
            Vec::new(),
            String::new(),
        );
        let first = ctx.mix("css/main.css");
        rt.add_file(
            "/child/public-assets/dist/manifest.json",
            r#"{"css/main.css": "css/main.v2.css"}"#,
        );
        assert_eq!(ctx.mix("css/main.css"), first);
        assert!(first.ends_with("css/main.v1.css"));
    }

    #[test]
    fn test_absent_manifest_is_memoized_too() {
        let rt = Arc::new(MemoryRuntime::new());
        let ctx = ThemeContext::new(
            rt.clone(),
            ConfigRepository::new(),
            ThemeIdentity::default(),
            ThemeRoots::new("/child", "https://x/child"),
            ThemeRoots::default(),
            Vec::new(),
            String::new(),
        );
        let before = ctx.mix("css/main.css");
        rt.add_file(
            "/child/public-assets/dist/manifest.json",
            r#"{"css/main.css": "css/main.v2.css"}"#,
        );
        assert_eq!(ctx.mix("css/main.css"), before);
        assert!(ctx.asset_manifest(&[]).is_empty());
    }

    #[test]
    fn test_ensure_compiled_dir_creates_once() {
        let rt = Arc::new(MemoryRuntime::new());
        let ctx = ThemeContext::new(
            rt.clone(),
            ConfigRepository::new(),
            ThemeIdentity::default(),
            ThemeRoots::new("/child", "https://x/child"),
            ThemeRoots::default(),
            Vec::new(),
            "/child/storage/framework/views".to_string(),
        );
        assert!(ctx.ensure_compiled_dir_exists());
        assert!(rt.is_dir(Path::new("/child/storage/framework/views")).unwrap());
        assert!(ctx.ensure_compiled_dir_exists());
    }

    #[test]
    fn test_ensure_compiled_dir_failure_is_silent() {
        let ctx = context(MemoryRuntime::read_only(), false, true);
        assert!(!ctx.ensure_compiled_dir_exists());
    }

    #[test]
    fn test_translate_and_escape() {
        let rt = MemoryRuntime::new().with_translation("yivic-lite-child", "Search", "Tìm kiếm");
        let ctx = context(rt, false, false);
        assert_eq!(ctx.translate("Search"), "Tìm kiếm");
        assert_eq!(ctx.e("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#039;y&#039;&lt;/b&gt;");
        assert_eq!(ctx.attr(42), "42");
    }
}
