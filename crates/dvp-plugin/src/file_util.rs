//! # File Utilities
//!
//! Path resolution relative to a plugin config, best-effort deletion, and
//! the [`FsPort`] seam through which scaffolding performs every write.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::PluginConfig;
use crate::error::PluginResult;

/// Filesystem side effects used by scaffolding.
///
/// [`LocalFs`] is the real implementation. Tests inject ports that fail on
/// demand to exercise cleanup.
pub trait FsPort {
    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create the file at `path` and write `contents`. Fails if the file
    /// already exists.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Serialize `config` as YAML and [`write`](FsPort::write) it to `path`.
    fn write_config(&self, path: &Path, config: &PluginConfig) -> PluginResult<()> {
        let yaml = config.to_yaml()?;
        self.write(path, yaml.as_bytes())?;
        Ok(())
    }

    /// Remove each path, returning those that could not be removed.
    fn delete_paths(&self, paths: &[PathBuf]) -> Vec<(PathBuf, io::Error)>;
}

/// [`FsPort`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FsPort for LocalFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn delete_paths(&self, paths: &[PathBuf]) -> Vec<(PathBuf, io::Error)> {
        delete_paths(paths)
    }
}

/// Remove files and directories (recursively).
///
/// Paths that do not exist are skipped. Every other failure is collected
/// and returned; deletion continues with the next path.
pub fn delete_paths<I, P>(paths: I) -> Vec<(PathBuf, io::Error)>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut failures = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let result = match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
            Ok(_) => std::fs::remove_file(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "nothing to delete");
                continue;
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "deleted"),
            Err(e) => failures.push((path.to_path_buf(), e)),
        }
    }
    failures
}

/// Resolve `relative` against the directory containing `base_file`.
///
/// Absolute paths are returned unchanged.
pub fn resolve_relative(base_file: &Path, relative: impl AsRef<Path>) -> PathBuf {
    let relative = relative.as_ref();
    if relative.is_absolute() {
        return relative.to_path_buf();
    }
    match base_file.parent() {
        Some(dir) => dir.join(relative),
        None => relative.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_paths_removes_files_and_trees() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        let tree = dir.path().join("src");
        std::fs::write(&file, "x").unwrap();
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/b.py"), "y").unwrap();

        let failures = delete_paths([&file, &tree]);
        assert!(failures.is_empty());
        assert!(!file.exists());
        assert!(!tree.exists());
    }

    #[test]
    fn delete_paths_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let failures = delete_paths([dir.path().join("never-created")]);
        assert!(failures.is_empty());
    }

    #[test]
    fn local_fs_write_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        LocalFs.write(&path, b"{}").unwrap();
        let err = LocalFs.write(&path, b"{\"x\": 1}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn write_config_writes_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin_config.yml");
        let config = PluginConfig::new(
            dvp_core::PluginId::generate(),
            Some("demo"),
            dvp_core::PluginType::Direct,
            "plugin_runner:plugin",
            "src",
            "schema.json",
        );
        LocalFs.write_config(&path, &config).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("name: demo"), "{text}");
        assert!(LocalFs.write_config(&path, &config).is_err());
    }

    #[test]
    fn resolve_relative_uses_config_directory() {
        let resolved = resolve_relative(Path::new("/work/plugin/plugin_config.yml"), "src");
        assert_eq!(resolved, PathBuf::from("/work/plugin/src"));
    }

    #[test]
    fn resolve_relative_keeps_absolute_paths() {
        let resolved = resolve_relative(Path::new("/work/plugin_config.yml"), "/opt/schema.json");
        assert_eq!(resolved, PathBuf::from("/opt/schema.json"));
    }

    #[test]
    fn resolve_relative_with_bare_file_name() {
        let resolved = resolve_relative(Path::new("plugin_config.yml"), "schema.json");
        assert_eq!(resolved, PathBuf::from("schema.json"));
    }
}
