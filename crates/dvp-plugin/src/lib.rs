//! # dvp-plugin: Plugin Project Scaffolding and Config Validation
//!
//! ## Scaffolding
//!
//! [`init()`] creates a new plugin project from the embedded templates:
//!
//! ```text
//! <target>/
//!   plugin_config.yml
//!   schema.json
//!   src/
//!     plugin_runner.py
//! ```
//!
//! It refuses to touch a directory that already holds any of these, and a
//! failed run removes whatever it had created. Use
//! [`Initializer::with_fs`] to route writes through a custom [`FsPort`].
//!
//! ## Validation
//!
//! [`read_and_validate_plugin_config_file`] checks a config file, the
//! layout it describes, and optionally its schema file (via `dvp-schema`).
//! Structural problems are errors; layout and schema problems are
//! warnings that callers may escalate.
//!
//! ## Log download
//!
//! [`logs::download_logs`] drives an [`EngineClient`] supplied by the
//! caller. No transport ships with this crate.

pub mod config;
pub mod error;
pub mod file_util;
pub mod init;
pub mod logs;
pub mod preflight;
pub mod templates;

pub use config::{
    read_and_validate_plugin_config_file, validate_plugin_config_content, PluginConfig,
    ValidationResult,
};
pub use error::{PluginError, PluginResult};
pub use file_util::{delete_paths, FsPort, LocalFs};
pub use init::{init, Initializer, ScaffoldPaths};
pub use logs::{download_logs, DownloadLogsRequest, EngineClient};
pub use preflight::check_no_conflict;
pub use templates::TemplateError;
