//! # dvp-schema: Plugin Schema Validation
//!
//! Validates the schema file a plugin ships (`schema.json`): the five
//! sub-definitions describing its repository, source config, linked
//! source, virtual source and snapshot objects.
//!
//! ## Severity
//!
//! Every check runs under a [`ValidationMode`]. `Error` fails fast with the
//! first [`Violation`]; `Warning` logs and collects every violation so a
//! build can report them together. See [`mode`].
//!
//! ## Passes
//!
//! - [`meta`]: the embedded Draft 7 meta-schema, compiled with `jsonschema`.
//! - [`validate`]: cross-field rules on the typed [`SchemaDefinition`].
//!
//! ## Crate Policy
//!
//! - Depends on no other `dvp-*` crate; `dvp-plugin` builds on it.
//! - Meta-schemas are embedded and reference only `#/definitions/...`.

pub mod definition;
pub mod error;
pub mod meta;
pub mod mode;
pub mod validate;

pub use definition::{DefinitionKind, SchemaDefinition, SubDefinition};
pub use error::SchemaValidationError;
pub use meta::MetaSchema;
pub use mode::{Accumulator, ValidationMode, Violation};
pub use validate::{load_json_document, SchemaValidationResult, SchemaValidator};
