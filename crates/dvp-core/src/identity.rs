//! # Plugin Identifiers
//!
//! A [`PluginId`] is the stable identifier an engine uses to tell plugin
//! uploads apart. Scaffolded plugins get a random UUID v4; hand-written
//! configs may use any identifier matching `^[A-Za-z0-9][A-Za-z0-9_.-]*$`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Stable plugin identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    /// Generate a fresh identifier from a random UUID v4.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Validate and wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        let mut chars = id.chars();
        let Some(first) = chars.next() else {
            return Err(CoreError::InvalidPluginId {
                input: id,
                reason: "must not be empty".to_string(),
            });
        };
        if !first.is_ascii_alphanumeric() {
            return Err(CoreError::InvalidPluginId {
                reason: format!("must start with an ASCII letter or digit, found {first:?}"),
                input: id,
            });
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
        if let Some(bad) = chars.find(|&c| !allowed(c)) {
            return Err(CoreError::InvalidPluginId {
                reason: format!("contains invalid character {bad:?}"),
                input: id,
            });
        }
        Ok(Self(id))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is a UUID (the scaffolded form).
    pub fn is_uuid(&self) -> bool {
        Uuid::parse_str(&self.0).is_ok()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PluginId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
