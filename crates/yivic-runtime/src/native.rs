/*
 * native.rs
 * Copyright (c) 2025 Yivic
 *
 * NativeRuntime implementation backed by std::fs.
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::traits::{HostRoot, HostRoots, PathKind, RuntimeResult, SystemRuntime};

/// Runtime with full access to the local filesystem.
///
/// Host theme roots are optional; attach them with the `with_*` builders when
/// the process knows where the active and parent themes live.
#[derive(Debug, Clone, Default)]
pub struct NativeRuntime {
    host: HostRoots,
}

impl NativeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path`/`url` as the active (child) theme root.
    pub fn with_stylesheet_root(mut self, path: impl Into<String>, url: impl Into<String>) -> Self {
        self.host.stylesheet = HostRoot::new(path, url);
        self
    }

    /// Report `path`/`url` as the parent theme root.
    pub fn with_template_root(mut self, path: impl Into<String>, url: impl Into<String>) -> Self {
        self.host.template = HostRoot::new(path, url);
        self
    }

    pub fn host_roots(&self) -> &HostRoots {
        &self.host
    }
}

impl SystemRuntime for NativeRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()> {
        Ok(fs::write(path, contents)?)
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let metadata = match kind {
            Some(PathKind::Symlink) => fs::symlink_metadata(path),
            _ => fs::metadata(path),
        };
        let metadata = match metadata {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        Ok(match kind {
            None => true,
            Some(PathKind::File) => metadata.is_file(),
            Some(PathKind::Directory) => metadata.is_dir(),
            Some(PathKind::Symlink) => metadata.file_type().is_symlink(),
        })
    }

    fn is_readable_file(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() || !self.is_file(path).unwrap_or(false) {
            return false;
        }
        // Opening is the only portable readability check.
        match fs::File::open(path) {
            Ok(_) => true,
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "File exists but is not readable");
                false
            }
        }
    }

    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        if recursive {
            fs::create_dir_all(path)?;
        } else {
            fs::create_dir(path)?;
        }
        Ok(())
    }

    fn dir_list(&self, path: &Path) -> RuntimeResult<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::debug!(name, "Ignoring non-UTF-8 environment variable");
                Ok(None)
            }
        }
    }

    fn stylesheet_directory(&self) -> Option<String> {
        self.host.stylesheet.path.clone()
    }

    fn stylesheet_directory_uri(&self) -> Option<String> {
        self.host.stylesheet.url.clone()
    }

    fn template_directory(&self) -> Option<String> {
        self.host.template.path.clone()
    }

    fn template_directory_uri(&self) -> Option<String> {
        self.host.template.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_runtime_file_operations() {
        let rt = NativeRuntime::new();
        let temp = tempfile::tempdir().unwrap();

        let file_path = temp.path().join("test.txt");
        rt.file_write(&file_path, b"hello").unwrap();

        assert!(rt.path_exists(&file_path, None).unwrap());
        assert!(rt.is_file(&file_path).unwrap());
        assert!(!rt.is_dir(&file_path).unwrap());
        assert!(rt.is_readable_file(&file_path));
        assert_eq!(rt.file_read(&file_path).unwrap(), b"hello");
    }

    #[test]
    fn test_missing_path_is_not_an_error() {
        let rt = NativeRuntime::new();
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(!rt.path_exists(&missing, None).unwrap());
        assert!(!rt.is_readable_file(&missing));
    }

    #[test]
    fn test_dir_create_recursive_and_list() {
        let rt = NativeRuntime::new();
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b/c");
        rt.dir_create(&nested, true).unwrap();
        assert!(rt.is_dir(&nested).unwrap());

        let listed = rt.dir_list(&temp.path().join("a")).unwrap();
        assert_eq!(listed, vec![temp.path().join("a/b")]);
    }

    #[test]
    fn test_host_roots_builder() {
        let rt = NativeRuntime::new()
            .with_stylesheet_root("/themes/child", "https://x/child")
            .with_template_root("/themes/parent", "https://x/parent");
        assert_eq!(rt.stylesheet_directory().as_deref(), Some("/themes/child"));
        assert_eq!(rt.stylesheet_directory_uri().as_deref(), Some("https://x/child"));
        assert_eq!(rt.template_directory().as_deref(), Some("/themes/parent"));
        assert_eq!(rt.template_directory_uri().as_deref(), Some("https://x/parent"));
    }
}
