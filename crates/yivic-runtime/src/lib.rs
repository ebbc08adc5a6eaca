/*
 * yivic-runtime
 * Copyright (c) 2025 Yivic
 *
 * Runtime abstraction layer for theme resolution.
 *
 * Theme code never touches std::fs or host globals directly; it goes through
 * a SystemRuntime so the same resolution logic runs against:
 *
 * - NativeRuntime: the local filesystem (default)
 * - MemoryRuntime: an in-memory tree (tests, previews, read-only hosts)
 */

mod memory;
mod native;
mod traits;

pub use traits::{
    HostRoot, HostRoots, PathKind, RuntimeError, RuntimeResult, SharedRuntime, SystemRuntime,
};

pub use memory::{MemoryRuntime, VirtualFileSystem};
pub use native::NativeRuntime;

/// Create a default runtime for the current platform.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
