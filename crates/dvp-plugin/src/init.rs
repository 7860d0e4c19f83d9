//! # Project Initializer
//!
//! Scaffolds a new plugin project: config file, schema file, and a source
//! directory holding the entry-point module.
//!
//! Scaffolding is all-or-nothing. Each path is entered in a ledger before
//! its creation is attempted; when any step fails, every ledger entry is
//! deleted (config, then schema, then source directory) and the original
//! error is returned. The target directory itself is never removed.

use std::path::{Path, PathBuf};

use dvp_core::{PluginId, PluginType};

use crate::config::PluginConfig;
use crate::error::{PluginError, PluginResult};
use crate::file_util::{FsPort, LocalFs};
use crate::preflight::check_no_conflict;
use crate::templates::{entry_point_contents, SCHEMA_TEMPLATE};

pub const DEFAULT_PLUGIN_CONFIG_FILE: &str = "plugin_config.yml";
pub const DEFAULT_SCHEMA_FILE: &str = "schema.json";
pub const DEFAULT_SRC_DIRECTORY: &str = "src";
pub const DEFAULT_ENTRY_POINT_FILE: &str = "plugin_runner.py";
pub const DEFAULT_ENTRY_POINT_SYMBOL: &str = "plugin";
pub const DEFAULT_ENTRY_POINT: &str = "plugin_runner:plugin";

/// The three top-level artifacts of a scaffolded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldPaths {
    pub config: PathBuf,
    pub schema: PathBuf,
    pub src: PathBuf,
}

impl ScaffoldPaths {
    pub fn under(target_dir: &Path) -> Self {
        Self {
            config: target_dir.join(DEFAULT_PLUGIN_CONFIG_FILE),
            schema: target_dir.join(DEFAULT_SCHEMA_FILE),
            src: target_dir.join(DEFAULT_SRC_DIRECTORY),
        }
    }

    pub fn entry_point_file(&self) -> PathBuf {
        self.src.join(DEFAULT_ENTRY_POINT_FILE)
    }

    /// Config, schema, source directory.
    pub fn in_cleanup_order(&self) -> [&Path; 3] {
        [&self.config, &self.schema, &self.src]
    }
}

/// Paths whose creation has been attempted.
#[derive(Debug, Default)]
struct Ledger {
    config: bool,
    schema: bool,
    src: bool,
}

impl Ledger {
    fn recorded(&self, paths: &ScaffoldPaths) -> Vec<PathBuf> {
        [
            (self.config, &paths.config),
            (self.schema, &paths.schema),
            (self.src, &paths.src),
        ]
        .into_iter()
        .filter(|(attempted, _)| *attempted)
        .map(|(_, path)| path.clone())
        .collect()
    }
}

/// Scaffolds plugin projects through a [`FsPort`].
#[derive(Debug, Clone, Default)]
pub struct Initializer<F: FsPort = LocalFs> {
    fs: F,
}

impl Initializer<LocalFs> {
    pub fn new() -> Self {
        Self { fs: LocalFs }
    }
}

impl<F: FsPort> Initializer<F> {
    /// Perform every side effect through `fs`.
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Scaffold a project in `target_dir`.
    ///
    /// An empty or absent `plugin_name` makes the name equal the generated
    /// id.
    ///
    /// # Errors
    ///
    /// - [`PluginError::PathExists`] if any artifact already exists. Nothing
    ///   is written in that case.
    /// - [`PluginError::Scaffold`] if a step fails after preflight. Every
    ///   attempted artifact has been removed by then.
    pub fn init(
        &self,
        target_dir: &Path,
        strategy: PluginType,
        plugin_name: Option<&str>,
    ) -> PluginResult<PluginConfig> {
        tracing::info!(
            target_dir = %target_dir.display(),
            strategy = %strategy,
            plugin_name = plugin_name.unwrap_or_default(),
            "initializing plugin"
        );

        let paths = ScaffoldPaths::under(target_dir);
        check_no_conflict(paths.in_cleanup_order())?;

        let mut ledger = Ledger::default();
        match self.scaffold(target_dir, &paths, &mut ledger, strategy, plugin_name) {
            Ok(config) => {
                tracing::info!(plugin = %config.id, name = %config.name, "plugin initialized");
                Ok(config)
            }
            Err(err) => {
                self.cleanup(&ledger.recorded(&paths));
                Err(err)
            }
        }
    }

    fn scaffold(
        &self,
        target_dir: &Path,
        paths: &ScaffoldPaths,
        ledger: &mut Ledger,
        strategy: PluginType,
        plugin_name: Option<&str>,
    ) -> PluginResult<PluginConfig> {
        if !target_dir.exists() {
            self.fs
                .create_dir_all(target_dir)
                .scaffold_context(|| format!("could not create {}", target_dir.display()))?;
        }

        let id = PluginId::generate();
        tracing::debug!(plugin = %id, "generated plugin id");

        ledger.schema = true;
        self.fs
            .write(&paths.schema, SCHEMA_TEMPLATE.as_bytes())
            .scaffold_context(|| format!("could not write {}", paths.schema.display()))?;

        ledger.src = true;
        self.fs
            .create_dir_all(&paths.src)
            .scaffold_context(|| format!("could not create {}", paths.src.display()))?;
        let entry_point = entry_point_contents(id.as_str(), strategy)
            .scaffold_context(|| "could not render the entry point template".to_string())?;
        let entry_file = paths.entry_point_file();
        self.fs
            .write(&entry_file, entry_point.as_bytes())
            .scaffold_context(|| format!("could not write {}", entry_file.display()))?;

        let config = PluginConfig::new(
            id,
            plugin_name,
            strategy,
            DEFAULT_ENTRY_POINT,
            DEFAULT_SRC_DIRECTORY,
            DEFAULT_SCHEMA_FILE,
        );
        ledger.config = true;
        self.fs
            .write_config(&paths.config, &config)
            .scaffold_context(|| format!("could not write {}", paths.config.display()))?;

        Ok(config)
    }

    fn cleanup(&self, paths: &[PathBuf]) {
        tracing::debug!(paths = ?paths, "cleaning up after failed init");
        for (path, err) in self.fs.delete_paths(paths) {
            tracing::error!(path = %path.display(), error = %err, "cleanup failed");
        }
    }
}

/// Scaffold a project in `target_dir` on the local filesystem.
///
/// # Errors
///
/// See [`Initializer::init`].
pub fn init(
    target_dir: &Path,
    strategy: PluginType,
    plugin_name: Option<&str>,
) -> PluginResult<PluginConfig> {
    Initializer::new().init(target_dir, strategy, plugin_name)
}

trait ScaffoldContext<T> {
    fn scaffold_context(self, reason: impl FnOnce() -> String) -> PluginResult<T>;
}

impl<T, E: Into<PluginError>> ScaffoldContext<T> for Result<T, E> {
    fn scaffold_context(self, reason: impl FnOnce() -> String) -> PluginResult<T> {
        self.map_err(|e| PluginError::Scaffold {
            reason: reason(),
            source: Box::new(e.into()),
        })
    }
}
