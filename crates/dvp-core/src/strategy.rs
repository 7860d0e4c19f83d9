//! # Ingestion Strategies and Host Types
//!
//! [`PluginType`] is the ingestion strategy a plugin declares in its
//! config file. It decides which linked-source operations the scaffolded
//! entry point carries. On the wire it is the upper-case name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How a plugin's linked sources ingest data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginType {
    /// The engine copies data straight from the source environment.
    Direct,
    /// The plugin stages data on a mount the engine provides.
    Staged,
}

impl PluginType {
    /// All strategies, in declaration order.
    pub const ALL: [PluginType; 2] = [PluginType::Direct, PluginType::Staged];

    /// Wire name as written in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "DIRECT",
            Self::Staged => "STAGED",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = CoreError;

    /// Case-insensitive parse, for command-line input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECT" => Ok(Self::Direct),
            "STAGED" => Ok(Self::Staged),
            _ => Err(CoreError::UnknownPluginType(s.to_string())),
        }
    }
}

/// Platform a plugin can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostType {
    /// Unix and Linux hosts.
    Unix,
    /// Windows hosts.
    Windows,
}

impl HostType {
    /// Wire name as written in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unix => "UNIX",
            Self::Windows => "WINDOWS",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UNIX" => Ok(Self::Unix),
            "WINDOWS" => Ok(Self::Windows),
            _ => Err(CoreError::UnknownHostType(s.to_string())),
        }
    }
}
