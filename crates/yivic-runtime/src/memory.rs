/*
 * memory.rs
 * Copyright (c) 2025 Yivic
 *
 * MemoryRuntime: an in-memory filesystem runtime for tests and previews.
 */

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::{HostRoot, HostRoots, PathKind, RuntimeError, RuntimeResult, SystemRuntime};

fn not_found_error(path: &Path) -> RuntimeError {
    RuntimeError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("Path not found: {}", path.display()),
    ))
}

/// In-memory file tree.
///
/// Directories are created implicitly for every file added.
#[derive(Debug, Default)]
pub struct VirtualFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
}

impl VirtualFileSystem {
    pub fn new() -> Self {
        let mut vfs = Self::default();
        vfs.directories.insert(PathBuf::from("/"));
        vfs
    }

    /// Add a file, creating all parent directories.
    pub fn add_file(&mut self, path: &Path, contents: Vec<u8>) {
        let normalized = normalize_components(path);
        if let Some(parent) = normalized.parent() {
            self.add_directory_and_parents(parent);
        }
        self.files.insert(normalized, contents);
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.files.remove(&normalize_components(path)).is_some()
    }

    pub fn add_directory(&mut self, path: &Path) {
        let normalized = normalize_components(path);
        self.add_directory_and_parents(&normalized);
    }

    pub fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_components(path))
    }

    pub fn is_directory(&self, path: &Path) -> bool {
        self.directories.contains(&normalize_components(path))
    }

    pub fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let normalized = normalize_components(path);
        self.files
            .get(&normalized)
            .cloned()
            .ok_or_else(|| not_found_error(&normalized))
    }

    /// Direct children of a directory, sorted.
    pub fn list_directory(&self, path: &Path) -> RuntimeResult<Vec<PathBuf>> {
        let normalized = normalize_components(path);
        if !self.directories.contains(&normalized) {
            return Err(not_found_error(&normalized));
        }

        let mut entries: Vec<PathBuf> = self
            .files
            .keys()
            .chain(self.directories.iter())
            .filter(|p| p.parent() == Some(normalized.as_path()) && **p != normalized)
            .cloned()
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn add_directory_and_parents(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

/// Normalize path components (remove `.` and resolve `..`).
fn normalize_components(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Runtime over a [`VirtualFileSystem`].
///
/// Useful for exercising resolution logic without touching disk. A runtime
/// built with [`MemoryRuntime::read_only`] refuses every mutation, which
/// mimics hosting environments where the theme directory is not writable.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    vfs: RwLock<VirtualFileSystem>,
    host: HostRoots,
    env: HashMap<String, String>,
    read_only: bool,
    translations: HashMap<(String, String), String>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self {
            vfs: RwLock::new(VirtualFileSystem::new()),
            ..Self::default()
        }
    }

    /// A runtime whose writes and directory creation always fail.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::new()
        }
    }

    pub fn with_file(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.write_vfs().add_directory(path.as_ref());
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn with_stylesheet_root(mut self, path: impl Into<String>, url: impl Into<String>) -> Self {
        self.host.stylesheet = HostRoot::new(path, url);
        self
    }

    pub fn with_template_root(mut self, path: impl Into<String>, url: impl Into<String>) -> Self {
        self.host.template = HostRoot::new(path, url);
        self
    }

    /// Register a translation for `text` in `domain`.
    pub fn with_translation(
        mut self,
        domain: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        self.translations
            .insert((domain.into(), text.into()), translated.into());
        self
    }

    /// Add a file after construction (bypasses the read-only flag).
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        self.write_vfs()
            .add_file(path.as_ref(), contents.as_ref().to_vec());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) -> bool {
        self.write_vfs().remove_file(path.as_ref())
    }

    fn read_vfs(&self) -> RwLockReadGuard<'_, VirtualFileSystem> {
        self.vfs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_vfs(&self) -> RwLockWriteGuard<'_, VirtualFileSystem> {
        self.vfs.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn deny_if_read_only(&self, path: &Path) -> RuntimeResult<()> {
        if self.read_only {
            return Err(RuntimeError::PermissionDenied(format!(
                "read-only filesystem: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

impl SystemRuntime for MemoryRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.read_vfs().read_file(path)
    }

    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()> {
        self.deny_if_read_only(path)?;
        self.write_vfs().add_file(path, contents.to_vec());
        Ok(())
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let vfs = self.read_vfs();
        Ok(match kind {
            None => vfs.is_file(path) || vfs.is_directory(path),
            Some(PathKind::File) => vfs.is_file(path),
            Some(PathKind::Directory) => vfs.is_directory(path),
            Some(PathKind::Symlink) => false,
        })
    }

    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        self.deny_if_read_only(path)?;
        let mut vfs = self.write_vfs();
        if !recursive {
            let parent_exists = path.parent().is_none_or(|p| vfs.is_directory(p));
            if !parent_exists {
                return Err(not_found_error(path));
            }
        }
        vfs.add_directory(path);
        Ok(())
    }

    fn dir_list(&self, path: &Path) -> RuntimeResult<Vec<PathBuf>> {
        self.read_vfs().list_directory(path)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        Ok(self.env.get(name).cloned())
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

    fn translate(&self, text: &str, domain: &str) -> String {
        self.translations
            .get(&(domain.to_string(), text.to_string()))
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let rt = MemoryRuntime::new().with_file("/child/css/main.css", "body{}");
        assert!(rt.is_file(Path::new("/child/css/main.css")).unwrap());
        assert!(rt.is_dir(Path::new("/child/css")).unwrap());
        assert!(rt.is_dir(Path::new("/child")).unwrap());
        assert_eq!(
            rt.file_read_string(Path::new("/child/css/main.css")).unwrap(),
            "body{}"
        );
    }

    #[test]
    fn test_normalizes_dot_segments() {
        let rt = MemoryRuntime::new().with_file("/a/b/file.txt", "x");
        assert!(rt.is_file(Path::new("/a/./b/../b/file.txt")).unwrap());
    }

    #[test]
    fn test_read_only_refuses_mutation() {
        let rt = MemoryRuntime::read_only();
        assert!(matches!(
            rt.dir_create(Path::new("/cache"), true),
            Err(RuntimeError::PermissionDenied(_))
        ));
        assert!(rt.file_write(Path::new("/x"), b"x").is_err());
        assert!(!rt.is_dir(Path::new("/cache")).unwrap());
    }

    #[test]
    fn test_non_recursive_create_needs_parent() {
        let rt = MemoryRuntime::new();
        assert!(rt.dir_create(Path::new("/a/b"), false).is_err());
        rt.dir_create(Path::new("/a"), false).unwrap();
        rt.dir_create(Path::new("/a/b"), false).unwrap();
        assert!(rt.is_dir(Path::new("/a/b")).unwrap());
    }

    #[test]
    fn test_list_directory_direct_children() {
        let rt = MemoryRuntime::new()
            .with_file("/cfg/app.json", "{}")
            .with_file("/cfg/view.toml", "")
            .with_file("/cfg/nested/deep.json", "{}");
        let entries = rt.dir_list(Path::new("/cfg")).unwrap();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/cfg/app.json"),
                PathBuf::from("/cfg/nested"),
                PathBuf::from("/cfg/view.toml"),
            ]
        );
    }

    #[test]
    fn test_translations_and_env() {
        let rt = MemoryRuntime::new()
            .with_translation("yivic-lite-child", "Title", "Tiêu đề")
            .with_env("WP_ENV", "staging");
        assert_eq!(rt.translate("Title", "yivic-lite-child"), "Tiêu đề");
        assert_eq!(rt.translate("Title", "other"), "Title");
        assert_eq!(rt.env_get("WP_ENV").unwrap().as_deref(), Some("staging"));
    }
}
