//! # Typed Schema Definitions
//!
//! A plugin's schema file carries five sub-definitions. After the
//! meta-schema has accepted a document it is bound to [`SchemaDefinition`]
//! so cross-field rules read named fields instead of probing a map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which of the five sub-definitions a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Repository,
    SourceConfig,
    LinkedSource,
    VirtualSource,
    Snapshot,
}

impl DefinitionKind {
    /// All kinds, in the order they are validated and reported.
    pub const ALL: [DefinitionKind; 5] = [
        DefinitionKind::Repository,
        DefinitionKind::SourceConfig,
        DefinitionKind::LinkedSource,
        DefinitionKind::VirtualSource,
        DefinitionKind::Snapshot,
    ];

    /// Top-level key in the schema file.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Repository => "repositoryDefinition",
            Self::SourceConfig => "sourceConfigDefinition",
            Self::LinkedSource => "linkedSourceDefinition",
            Self::VirtualSource => "virtualSourceDefinition",
            Self::Snapshot => "snapshotDefinition",
        }
    }
}

/// One sub-definition: a JSON-schema object description plus the
/// display-name and identity annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubDefinition {
    /// Field name to type descriptor. Order carries no meaning.
    #[serde(default)]
    pub properties: Map<String, Value>,

    /// Property used as the entity's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,

    /// Properties that together identify an entity, in key order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_fields: Option<Vec<String>>,

    /// Remaining JSON-schema keywords (`type`, `required`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubDefinition {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Identity fields, or an empty slice when absent.
    pub fn identity_fields(&self) -> &[String] {
        self.identity_fields.as_deref().unwrap_or(&[])
    }
}

/// The whole schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaDefinition {
    pub repository_definition: SubDefinition,
    pub source_config_definition: SubDefinition,
    pub linked_source_definition: SubDefinition,
    pub virtual_source_definition: SubDefinition,
    pub snapshot_definition: SubDefinition,
}

impl SchemaDefinition {
    /// Bind a parsed document.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the document does not have the
    /// five-definition shape.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn get(&self, kind: DefinitionKind) -> &SubDefinition {
        match kind {
            DefinitionKind::Repository => &self.repository_definition,
            DefinitionKind::SourceConfig => &self.source_config_definition,
            DefinitionKind::LinkedSource => &self.linked_source_definition,
            DefinitionKind::VirtualSource => &self.virtual_source_definition,
            DefinitionKind::Snapshot => &self.snapshot_definition,
        }
    }

    /// Sub-definitions in [`DefinitionKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (DefinitionKind, &SubDefinition)> {
        DefinitionKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
