//! # Embedded Meta-Schemas
//!
//! Structural rules are expressed as JSON Schema (Draft 7) documents
//! compiled into the binary. A [`MetaSchema`] compiles one of them with the
//! `jsonschema` crate and feeds every error it finds into an
//! [`Accumulator`].
//!
//! Only internal `#/definitions/...` references are used, so compilation
//! never touches the network.

use std::fmt;

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::error::SchemaValidationError;
use crate::mode::{Accumulator, Violation};

/// File name of the plugin schema meta-schema, used in diagnostics.
pub const PLUGIN_META_SCHEMA_NAME: &str = "plugin-meta.schema.json";

/// Source of the plugin schema meta-schema.
pub const PLUGIN_META_SCHEMA: &str = include_str!("../schemas/plugin-meta.schema.json");

/// A compiled meta-schema.
pub struct MetaSchema {
    name: String,
    validator: Validator,
}

impl MetaSchema {
    /// Parse and compile a meta-schema from its JSON source.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::MetaSchemaBuild`] if the source is
    /// not JSON or is not a valid Draft 7 schema.
    pub fn compile(name: &str, source: &str) -> Result<Self, SchemaValidationError> {
        let schema: Value =
            serde_json::from_str(source).map_err(|e| SchemaValidationError::MetaSchemaBuild {
                schema_name: name.to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;

        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft7);
        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaValidationError::MetaSchemaBuild {
                schema_name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            validator,
        })
    }

    /// The plugin schema meta-schema.
    pub fn plugin_schema() -> Result<Self, SchemaValidationError> {
        Self::compile(PLUGIN_META_SCHEMA_NAME, PLUGIN_META_SCHEMA)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check `instance`, reporting each structural error against
    /// `document`.
    ///
    /// Returns `Ok(true)` when the instance satisfied every rule.
    ///
    /// # Errors
    ///
    /// Propagates the accumulator's rejection in `Error` mode.
    pub fn check(
        &self,
        document: &str,
        instance: &Value,
        acc: &mut Accumulator,
    ) -> Result<bool, SchemaValidationError> {
        let mut passed = true;
        for error in self.validator.iter_errors(instance) {
            passed = false;
            acc.report(Violation::new(
                document,
                error.instance_path.to_string(),
                error.to_string(),
            ))?;
        }
        Ok(passed)
    }
}

impl fmt::Debug for MetaSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaSchema").field("name", &self.name).finish()
    }
}
