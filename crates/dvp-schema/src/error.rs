//! Schema validation error types.

use thiserror::Error;

use crate::mode::Violation;

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// A document broke a rule while validating in
    /// [`ValidationMode::Error`](crate::ValidationMode::Error).
    ///
    /// Carries only the first violation: the check stops there.
    #[error("validation failed: {violation}")]
    ValidationFailed {
        /// The first rule that was broken.
        violation: Violation,
    },

    /// An embedded meta-schema did not compile.
    #[error("meta-schema '{schema_name}' failed to compile: {reason}")]
    MetaSchemaBuild {
        /// Meta-schema name.
        schema_name: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
        /// True when the file does not exist.
        not_found: bool,
    },
}
