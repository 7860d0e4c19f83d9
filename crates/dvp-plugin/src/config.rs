//! # Plugin Config Validation
//!
//! Reads `plugin_config.yml`, checks it, and binds it to [`PluginConfig`].
//!
//! Checks run in three groups:
//!
//! 1. **Structure** (always fail-fast): required keys, recognized
//!    `pluginType` and `hostTypes`, `entryPoint` shaped `module:symbol`.
//!    Expressed as the embedded `plugin-config.schema.json`.
//! 2. **Layout** (warnings): `srcDir` is a directory, the entry-point
//!    module exists under it, and the module assigns the entry-point symbol
//!    at top level.
//! 3. **Schema** (warnings, optional): the file named by `schemaFile`
//!    passes [`dvp_schema::SchemaValidator`].

use std::path::{Path, PathBuf};

use dvp_core::{HostType, PluginId, PluginType};
use dvp_schema::{
    Accumulator, MetaSchema, SchemaValidationError, SchemaValidator, ValidationMode, Violation,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PluginError, PluginResult};
use crate::file_util::resolve_relative;

/// File name of the plugin config meta-schema, used in diagnostics.
pub const PLUGIN_CONFIG_SCHEMA_NAME: &str = "plugin-config.schema.json";

/// Source of the plugin config meta-schema.
pub const PLUGIN_CONFIG_SCHEMA: &str = include_str!("../schemas/plugin-config.schema.json");

pub const DEFAULT_VERSION: &str = "0.1.0";
pub const DEFAULT_BUILD_NUMBER: &str = "0.1.0";
pub const DEFAULT_LANGUAGE: &str = "PYTHON38";
pub const DEFAULT_LOCALE: &str = "en-us";

/// A plugin's identity and layout descriptor.
///
/// Field order is the order keys are written to `plugin_config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub id: PluginId,
    /// Display name. Empty or absent on disk means "same as `id`"; after
    /// binding it is never empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_host_types")]
    pub host_types: Vec<HostType>,
    pub plugin_type: PluginType,
    /// `module:symbol`, module relative to `src_dir`.
    pub entry_point: String,
    pub src_dir: String,
    pub schema_file: String,
    #[serde(default = "default_build_number")]
    pub build_number: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_host_types() -> Vec<HostType> {
    vec![HostType::Unix]
}

fn default_build_number() -> String {
    DEFAULT_BUILD_NUMBER.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PluginConfig {
    /// Config for a freshly scaffolded plugin.
    pub fn new(
        id: PluginId,
        name: Option<&str>,
        plugin_type: PluginType,
        entry_point: impl Into<String>,
        src_dir: impl Into<String>,
        schema_file: impl Into<String>,
    ) -> Self {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => id.to_string(),
        };
        Self {
            id,
            name,
            version: default_version(),
            language: default_language(),
            host_types: default_host_types(),
            plugin_type,
            entry_point: entry_point.into(),
            src_dir: src_dir.into(),
            schema_file: schema_file.into(),
            build_number: default_build_number(),
            default_locale: default_locale(),
        }
    }

    /// Module and symbol halves of `entry_point`.
    pub fn entry_point_parts(&self) -> Option<(&str, &str)> {
        self.entry_point.split_once(':')
    }

    /// Path of the entry-point module relative to the config's directory:
    /// `src_dir`, then the module with dots as separators, plus `.py`.
    pub fn entry_module_path(&self) -> Option<PathBuf> {
        let (module, _) = self.entry_point_parts()?;
        let mut path = PathBuf::from(&self.src_dir);
        for segment in module.split('.') {
            path.push(segment);
        }
        path.set_extension("py");
        Some(path)
    }

    /// Serialize as the contents of `plugin_config.yml`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::YamlSerialize`] if serialization fails.
    pub fn to_yaml(&self) -> PluginResult<String> {
        serde_yaml::to_string(self).map_err(PluginError::YamlSerialize)
    }

    fn fill_default_name(&mut self) {
        if self.name.is_empty() {
            self.name = self.id.to_string();
        }
    }
}

/// Outcome of reading and validating a plugin config file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub plugin_config_content: PluginConfig,
    /// Advisory problems found, in check order.
    pub warnings: Vec<String>,
    /// Whether the caller asked for warnings to count as failure.
    pub treat_warnings_as_errors: bool,
}

impl ValidationResult {
    /// False only when there are warnings and they are to be treated as
    /// errors.
    pub fn passed(&self) -> bool {
        self.warnings.is_empty() || !self.treat_warnings_as_errors
    }

    /// Turn a failing result into [`PluginError::WarningsAsErrors`].
    ///
    /// # Errors
    ///
    /// When [`Self::passed`] is false.
    pub fn into_checked(self) -> PluginResult<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(PluginError::WarningsAsErrors {
                warnings: self.warnings,
            })
        }
    }
}

/// Read, check and bind a plugin config file.
///
/// With `validate_schema`, the schema file it names is also validated and
/// its warnings are merged into the result.
///
/// # Errors
///
/// - [`PluginError::FileNotFound`] for a missing config or schema file.
/// - [`PluginError::YamlParse`] / [`PluginError::JsonParse`] for malformed
///   files.
/// - [`PluginError::Validation`] for the first structural problem.
pub fn read_and_validate_plugin_config_file(
    path: &Path,
    validate_schema: bool,
    treat_warnings_as_errors: bool,
) -> PluginResult<ValidationResult> {
    tracing::info!(path = %path.display(), validate_schema, "validating plugin config");

    let document = load_yaml_as_value(path)?;
    let label = document_label(path);
    validate_structure(&label, &document, ValidationMode::Error)?;

    let mut config: PluginConfig = serde_json::from_value(document)
        .map_err(|e| PluginError::Validation(format!("{label}: {e}")))?;
    config.fill_default_name();

    let mut acc = Accumulator::new(ValidationMode::Warning);
    check_layout(path, &label, &config, &mut acc).map_err(into_plugin_error)?;
    let mut warnings: Vec<String> = acc
        .into_violations()
        .iter()
        .map(ToString::to_string)
        .collect();

    if validate_schema {
        let schema_path = resolve_relative(path, &config.schema_file);
        let schema_doc = load_json_as_value(&schema_path)?;
        let result = SchemaValidator::new()?.validate(
            &document_label(&schema_path),
            &schema_doc,
            ValidationMode::Warning,
        )?;
        warnings.extend(result.warnings.iter().map(ToString::to_string));
    }

    tracing::debug!(
        plugin = %config.id,
        warnings = warnings.len(),
        "plugin config validated"
    );
    Ok(ValidationResult {
        plugin_config_content: config,
        warnings,
        treat_warnings_as_errors,
    })
}

/// Run the structural rules over a parsed plugin config document.
///
/// Returns the warnings collected in [`ValidationMode::Warning`]; always
/// empty in [`ValidationMode::Error`].
///
/// # Errors
///
/// In [`ValidationMode::Error`], [`PluginError::Validation`] describing the
/// first broken rule.
pub fn validate_plugin_config_content(
    document: &Value,
    mode: ValidationMode,
) -> PluginResult<Vec<String>> {
    let violations = validate_structure("plugin config", document, mode)?;
    Ok(violations.iter().map(ToString::to_string).collect())
}

/// Whether `source` assigns `symbol` at module top level
/// (`symbol = ...` or `symbol: T = ...` on an unindented line).
pub fn defines_top_level_symbol(source: &str, symbol: &str) -> bool {
    source.lines().any(|line| {
        let Some(rest) = line.strip_prefix(symbol) else {
            return false;
        };
        let rest = rest.trim_start();
        if let Some(value) = rest.strip_prefix('=') {
            !value.starts_with('=')
        } else if let Some(annotation) = rest.strip_prefix(':') {
            annotation.contains('=')
        } else {
            false
        }
    })
}

fn validate_structure(
    label: &str,
    document: &Value,
    mode: ValidationMode,
) -> PluginResult<Vec<Violation>> {
    if !document.is_object() {
        let violation = Violation::new(label, "", "plugin config must be a mapping");
        return match mode {
            ValidationMode::Error => Err(PluginError::Validation(violation.to_string())),
            ValidationMode::Warning => Ok(vec![violation]),
        };
    }
    let meta = MetaSchema::compile(PLUGIN_CONFIG_SCHEMA_NAME, PLUGIN_CONFIG_SCHEMA)?;
    let mut acc = Accumulator::new(mode);
    meta.check(label, document, &mut acc)
        .map_err(into_plugin_error)?;
    Ok(acc.into_violations())
}

fn check_layout(
    config_path: &Path,
    label: &str,
    config: &PluginConfig,
    acc: &mut Accumulator,
) -> Result<(), SchemaValidationError> {
    let src_dir = resolve_relative(config_path, &config.src_dir);
    if !src_dir.is_dir() {
        return acc.report(Violation::new(
            label,
            "/srcDir",
            format!("source directory does not exist: {}", src_dir.display()),
        ));
    }

    let (Some(module_path), Some((_, symbol))) =
        (config.entry_module_path(), config.entry_point_parts())
    else {
        return acc.report(Violation::new(
            label,
            "/entryPoint",
            format!("entry point '{}' is not module:symbol", config.entry_point),
        ));
    };
    let module_file = resolve_relative(config_path, &module_path);

    match std::fs::read_to_string(&module_file) {
        Ok(source) if defines_top_level_symbol(&source, symbol) => Ok(()),
        Ok(_) => acc.report(Violation::new(
            label,
            "/entryPoint",
            format!(
                "entry point symbol '{symbol}' is not assigned at top level of {}",
                module_file.display()
            ),
        )),
        Err(e) => acc.report(Violation::new(
            label,
            "/entryPoint",
            format!("cannot read entry point module {}: {e}", module_file.display()),
        )),
    }
}

fn into_plugin_error(err: SchemaValidationError) -> PluginError {
    match err {
        SchemaValidationError::ValidationFailed { violation } => {
            PluginError::Validation(violation.to_string())
        }
        other => PluginError::Schema(other),
    }
}

fn document_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}

fn read_file(path: &Path) -> PluginResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PluginError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PluginError::Io(e)
        }
    })
}

/// Load a YAML file into a JSON value.
fn load_yaml_as_value(path: &Path) -> PluginResult<Value> {
    let content = read_file(path)?;
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| PluginError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    yaml_to_json_value(yaml)
}

fn load_json_as_value(path: &Path) -> PluginResult<Value> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| PluginError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn yaml_to_json_value(yaml: serde_yaml::Value) -> PluginResult<Value> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            let number = if let Some(i) = n.as_i64() {
                Some(serde_json::Number::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(serde_json::Number::from(u))
            } else {
                n.as_f64().and_then(serde_json::Number::from_f64)
            };
            number
                .map(Value::Number)
                .ok_or_else(|| PluginError::Validation(format!("unrepresentable number: {n}")))
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => seq
            .into_iter()
            .map(yaml_to_json_value)
            .collect::<PluginResult<Vec<_>>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    other => {
                        return Err(PluginError::Validation(format!(
                            "unsupported mapping key: {other:?}"
                        )))
                    }
                };
                obj.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(obj))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(tagged.value),
    }
}
