//! # dvp-cli: Plugin Toolchain Command-Line Interface
//!
//! ## Subcommands
//!
//! - `init`: scaffold a plugin project
//! - `validate`: check a plugin config and, optionally, its schema
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; behavior lives in `dvp-plugin`.
//! - Handlers return an exit code: 0 success, 1 failure. Errors bubble up
//!   as `anyhow::Error` and are reported by `main`.

use std::path::{Path, PathBuf};

pub mod init;
pub mod validate;

/// Resolve a possibly relative path against the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
