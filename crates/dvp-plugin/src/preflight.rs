//! # Path Preflight
//!
//! Read-only check that none of the paths scaffolding is about to create
//! already exist.

use std::io;
use std::path::Path;

use crate::error::{PluginError, PluginResult};

/// Fail with [`PluginError::PathExists`] naming the first path that is
/// already present.
///
/// A dangling symlink counts as present.
///
/// # Errors
///
/// [`PluginError::PathExists`] on conflict, [`PluginError::Io`] when a path
/// cannot be inspected.
pub fn check_no_conflict<I, P>(paths: I) -> PluginResult<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        match std::fs::symlink_metadata(path) {
            Ok(_) => {
                tracing::debug!(path = %path.display(), "path already exists");
                return Err(PluginError::PathExists {
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(PluginError::Io(e)),
        }
    }
    Ok(())
}
