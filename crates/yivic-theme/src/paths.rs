/*
 * paths.rs
 * Copyright (c) 2025 Yivic
 */

//! Path and URL normalization shared by every resolver.
//!
//! All roots are stored with forward slashes and no trailing slash. Relative
//! inputs go through [`sanitize_relative`] before they are joined to a root.

/// Normalize a filesystem path: trim, forward slashes, no trailing slash.
///
/// A blank input stays empty. Note that `"/"` normalizes to `""`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }
    path.replace('\\', "/").trim_end_matches('/').to_string()
}

/// Normalize a base URL: trim, no trailing slash.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    url.trim_end_matches('/').to_string()
}

/// Sanitize a relative path so it can be joined under a root.
///
/// Trims whitespace, converts backslashes, strips leading slashes, and
/// rejects traversal: `""`, `"."`, `".."` and anything containing `"../"`
/// come back as an empty string.
///
/// The `"../"` check is a plain substring test, so `"a..b/../c"` and
/// `"foo../bar"` are rejected too.
pub fn sanitize_relative(relative: &str) -> String {
    let relative = relative.trim().replace('\\', "/");
    let relative = relative.trim_start_matches('/');

    if relative.is_empty() || relative == "." || relative == ".." || relative.contains("../") {
        return String::new();
    }

    relative.to_string()
}

/// Join a relative path under a filesystem root.
///
/// An empty root yields an empty string; an empty (or rejected) relative
/// part yields the root itself.
pub fn join_path(base: &str, relative: &str) -> String {
    join(&normalize_path(base), relative)
}

/// Join a relative path under a base URL, with the same rules as [`join_path`].
pub fn join_url(base: &str, relative: &str) -> String {
    join(&normalize_url(base), relative)
}

fn join(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return String::new();
    }
    let relative = sanitize_relative(relative);
    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, relative)
    }
}
