//! # Validation Severity
//!
//! One validation routine serves both severities. The caller's
//! [`ValidationMode`] picks how an [`Accumulator`] reacts to a broken rule:
//!
//! - [`ValidationMode::Error`] returns the first violation as an error and
//!   the routine unwinds through `?`.
//! - [`ValidationMode::Warning`] records the violation, logs it, and lets
//!   the routine carry on to the next rule.
//!
//! Rule code never branches on the mode. It calls [`Accumulator::report`]
//! and propagates with `?`.

use std::fmt;

use crate::error::SchemaValidationError;

/// How broken rules affect control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Stop at the first broken rule.
    Error,
    /// Record every broken rule and finish.
    Warning,
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Document the rule was checked against (usually a file name).
    pub document: String,
    /// JSON Pointer to the offending value; empty for the document root.
    pub instance_path: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    pub fn new(
        document: impl Into<String>,
        instance_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            instance_path: instance_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{} (root): {}", self.document, self.message)
        } else {
            write!(f, "{} {}: {}", self.document, self.instance_path, self.message)
        }
    }
}

/// Collects or rejects violations according to a [`ValidationMode`].
#[derive(Debug)]
pub struct Accumulator {
    mode: ValidationMode,
    violations: Vec<Violation>,
}

impl Accumulator {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            violations: Vec::new(),
        }
    }

    /// Report a broken rule.
    ///
    /// # Errors
    ///
    /// In [`ValidationMode::Error`], always returns
    /// [`SchemaValidationError::ValidationFailed`] carrying `violation`.
    pub fn report(&mut self, violation: Violation) -> Result<(), SchemaValidationError> {
        match self.mode {
            ValidationMode::Error => Err(SchemaValidationError::ValidationFailed { violation }),
            ValidationMode::Warning => {
                tracing::warn!(
                    document = %violation.document,
                    path = %violation.instance_path,
                    "{}",
                    violation.message
                );
                self.violations.push(violation);
                Ok(())
            }
        }
    }

    /// Violations recorded so far. Always empty in `Error` mode.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consume the accumulator, returning the recorded violations in
    /// report order.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
