/*
 * identity.rs
 * Copyright (c) 2025 Yivic
 */

//! Theme identity and per-layer roots.

use crate::paths::{join_path, join_url, normalize_path, normalize_url};

/// Slug used when configuration does not name the theme.
pub const DEFAULT_SLUG: &str = "yivic-lite-child";

/// Environment assumed when configuration does not set one.
pub const DEFAULT_ENV: &str = "production";

/// Who the theme is and how it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeIdentity {
    pub slug: String,
    pub text_domain: String,
    pub env: String,
    pub debug: bool,
}

impl Default for ThemeIdentity {
    fn default() -> Self {
        Self {
            slug: DEFAULT_SLUG.to_string(),
            text_domain: DEFAULT_SLUG.to_string(),
            env: DEFAULT_ENV.to_string(),
            debug: false,
        }
    }
}

/// Filesystem path and base URL of one theme layer (child or parent).
///
/// Both are normalized on construction and either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeRoots {
    path: String,
    url: String,
}

impl ThemeRoots {
    pub fn new(path: &str, url: &str) -> Self {
        Self {
            path: normalize_path(path),
            url: normalize_url(url),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether both the path and the URL are known.
    pub fn is_complete(&self) -> bool {
        !self.path.is_empty() && !self.url.is_empty()
    }

    pub fn join_path(&self, relative: &str) -> String {
        join_path(&self.path, relative)
    }

    pub fn join_url(&self, relative: &str) -> String {
        join_url(&self.url, relative)
    }
}
