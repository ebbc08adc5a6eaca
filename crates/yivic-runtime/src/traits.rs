/*
 * traits.rs
 * Copyright (c) 2025 Yivic
 *
 * Defines the SystemRuntime trait and supporting types for the runtime abstraction layer.
 *
 * This abstraction allows theme code to run against different backends:
 * - NativeRuntime: Full system access using std
 * - MemoryRuntime: In-memory filesystem for tests and previews
 */

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Permission denied (with detailed reason)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Operation not supported on this runtime
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// File content could not be decoded
    #[error("Invalid data in {path}: {message}")]
    InvalidData { path: PathBuf, message: String },
}

/// Type of filesystem path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
}

/// Filesystem path and public URL of one theme layer as reported by the host.
///
/// In WordPress terms the stylesheet root is the active (child) theme and the
/// template root is its parent theme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRoot {
    pub path: Option<String>,
    pub url: Option<String>,
}

impl HostRoot {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            url: Some(url.into()),
        }
    }
}

/// Host theme roots, queried only when configuration does not supply them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRoots {
    pub stylesheet: HostRoot,
    pub template: HostRoot,
}

/// Trait defining the low-level operations theme resolution needs.
///
/// Implementations provide the actual system interaction. Resolution code only
/// ever talks to the filesystem and host through this trait, so a context can
/// be built against a real theme directory or an in-memory tree.
pub trait SystemRuntime: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| RuntimeError::InvalidData {
            path: path.to_path_buf(),
            message: format!("invalid UTF-8: {}", e),
        })
    }

    /// Write bytes to file (creates or overwrites).
    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()>;

    /// Check if path exists, optionally filtering by type.
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool>;

    /// Check if path exists and is a file.
    fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::File))
    }

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::Directory))
    }

    /// Whether the path is a file this process can read.
    ///
    /// Never fails: any error while probing counts as "not readable".
    fn is_readable_file(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return false;
        }
        self.is_file(path).unwrap_or(false)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DIRECTORY OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Create directory (optionally with parents).
    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// List directory entries (excluding . and ..).
    fn dir_list(&self, path: &Path) -> RuntimeResult<Vec<PathBuf>>;

    // ═══════════════════════════════════════════════════════════════════════
    // ENVIRONMENT
    // ═══════════════════════════════════════════════════════════════════════

    /// Get single environment variable.
    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>>;

    // ═══════════════════════════════════════════════════════════════════════
    // HOST THEME QUERIES
    //
    // Fallbacks for roots the configuration does not provide. A runtime with
    // no host attached answers `None` for all of them.
    // ═══════════════════════════════════════════════════════════════════════

    /// Active theme directory (`get_stylesheet_directory`).
    fn stylesheet_directory(&self) -> Option<String> {
        None
    }

    /// Active theme URL (`get_stylesheet_directory_uri`).
    fn stylesheet_directory_uri(&self) -> Option<String> {
        None
    }

    /// Parent theme directory (`get_template_directory`).
    fn template_directory(&self) -> Option<String> {
        None
    }

    /// Parent theme URL (`get_template_directory_uri`).
    fn template_directory_uri(&self) -> Option<String> {
        None
    }

    /// Translate `text` within a text domain.
    ///
    /// Default implementation returns the text unchanged.
    fn translate(&self, text: &str, domain: &str) -> String {
        let _ = domain;
        text.to_string()
    }
}

/// Shared, thread-safe handle to a runtime.
pub type SharedRuntime = Arc<dyn SystemRuntime>;
