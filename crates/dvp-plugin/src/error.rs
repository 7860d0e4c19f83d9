//! Plugin toolchain error types.
//!
//! Every failure a user can trigger (an existing path, a malformed config,
//! a scaffold that could not be written) maps to one variant carrying the
//! offending path or a description of the broken rule.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by scaffolding and plugin config validation.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A path that scaffolding would create already exists.
    #[error("path already exists: {path}")]
    PathExists { path: PathBuf },

    /// Scaffolding failed part-way; created paths have been cleaned up.
    #[error("failed to initialize plugin: {reason}")]
    Scaffold {
        reason: String,
        #[source]
        source: Box<PluginError>,
    },

    /// A document broke a structural rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// Validation produced warnings and the caller asked for them to fail.
    #[error("{} warning(s) treated as errors:\n{}", .warnings.len(), .warnings.join("\n"))]
    WarningsAsErrors { warnings: Vec<String> },

    /// A required file was not found.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A template could not be rendered.
    #[error("template error: {0}")]
    Template(#[from] crate::templates::TemplateError),

    /// Schema validation error (delegated from dvp-schema).
    #[error("schema error: {0}")]
    Schema(#[from] dvp_schema::SchemaValidationError),

    /// The remote engine rejected a request.
    #[error("engine error: {0}")]
    Engine(String),

    /// Text normalization of an argument failed.
    #[error(transparent)]
    Core(#[from] dvp_core::CoreError),

    /// YAML serialization failed.
    #[error("failed to serialize YAML: {0}")]
    YamlSerialize(serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias.
pub type PluginResult<T> = Result<T, PluginError>;
