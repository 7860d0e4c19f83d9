//! # Plugin Schema Validation
//!
//! Validates a plugin's schema file in two passes:
//!
//! 1. **Structure.** The document must satisfy the embedded
//!    `plugin-meta.schema.json`: five sub-definitions, identifier-shaped
//!    property names, well-formed type descriptors at every depth.
//! 2. **Cross-field rules.** On the typed [`SchemaDefinition`]: `nameField`
//!    names a property, every `identityFields` entry names a property, and
//!    identity fields are not repeated.
//!
//! Pass 2 binds each sub-definition on its own. In `Warning` mode a
//! sub-definition whose subtree broke pass 1 is not bound and its
//! cross-field rules are skipped; the other sub-definitions are still
//! checked. In `Error` mode the first problem of either pass ends
//! validation.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::definition::{DefinitionKind, SchemaDefinition, SubDefinition};
use crate::error::SchemaValidationError;
use crate::meta::MetaSchema;
use crate::mode::{Accumulator, ValidationMode, Violation};

/// Outcome of a validation run that did not fail fast.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidationResult {
    /// Every violation found, in check order. Empty in `Error` mode.
    pub warnings: Vec<Violation>,
    /// The bound document, when the structure allowed binding.
    pub definition: Option<SchemaDefinition>,
}

impl SchemaValidationResult {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validator for plugin schema files.
///
/// Compiles the meta-schema once; reuse one instance for many documents.
#[derive(Debug)]
pub struct SchemaValidator {
    meta: MetaSchema,
}

impl SchemaValidator {
    /// Compile the embedded meta-schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::MetaSchemaBuild`] if the embedded
    /// meta-schema does not compile.
    pub fn new() -> Result<Self, SchemaValidationError> {
        Ok(Self {
            meta: MetaSchema::plugin_schema()?,
        })
    }

    /// Validate a parsed schema document.
    ///
    /// `document_name` labels violations (typically the file name).
    ///
    /// # Errors
    ///
    /// In [`ValidationMode::Error`], returns
    /// [`SchemaValidationError::ValidationFailed`] with the first broken
    /// rule.
    pub fn validate(
        &self,
        document_name: &str,
        document: &Value,
        mode: ValidationMode,
    ) -> Result<SchemaValidationResult, SchemaValidationError> {
        let mut acc = Accumulator::new(mode);

        let structure_ok = self.meta.check(document_name, document, &mut acc)?;

        let broken: HashSet<DefinitionKind> = DefinitionKind::ALL
            .into_iter()
            .filter(|kind| touches(acc.violations(), kind.key()))
            .collect();

        let mut bound = Vec::with_capacity(DefinitionKind::ALL.len());
        for kind in DefinitionKind::ALL {
            let sub = if broken.contains(&kind) {
                tracing::debug!(
                    document = document_name,
                    definition = kind.key(),
                    "skipping cross-field rules after structural violations"
                );
                None
            } else {
                bind_sub_definition(document_name, document, kind, &mut acc)?
            };
            if let Some(sub) = &sub {
                check_cross_field_rules(document_name, kind, sub, &mut acc)?;
            }
            bound.push(sub);
        }

        let definition = if structure_ok {
            assemble(bound)
        } else {
            None
        };

        let warnings = acc.into_violations();
        tracing::debug!(
            document = document_name,
            warnings = warnings.len(),
            "schema validation finished"
        );
        Ok(SchemaValidationResult {
            warnings,
            definition,
        })
    }

    /// Load a JSON schema file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::DocumentLoadError`] if the file
    /// cannot be read or is not JSON, plus anything [`Self::validate`]
    /// returns.
    pub fn validate_file(
        &self,
        path: &Path,
        mode: ValidationMode,
    ) -> Result<SchemaValidationResult, SchemaValidationError> {
        let document = load_json_document(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or_else(|| path.display().to_string(), str::to_string);
        self.validate(&name, &document, mode)
    }
}

/// Validate a schema document with a freshly compiled validator.
///
/// # Errors
///
/// See [`SchemaValidator::validate`].
pub fn validate(
    document: &Value,
    mode: ValidationMode,
) -> Result<SchemaValidationResult, SchemaValidationError> {
    SchemaValidator::new()?.validate("schema", document, mode)
}

/// Read and parse a JSON document.
///
/// # Errors
///
/// Returns [`SchemaValidationError::DocumentLoadError`]; `not_found` is set
/// when the file does not exist.
pub fn load_json_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SchemaValidationError::DocumentLoadError {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
            not_found: e.kind() == std::io::ErrorKind::NotFound,
        }
    })?;
    serde_json::from_str(&content).map_err(|e| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
        not_found: false,
    })
}

/// Whether any violation points into the subtree at `/{key}`.
fn touches(violations: &[Violation], key: &str) -> bool {
    violations.iter().any(|v| {
        v.instance_path
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(key))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Bind one sub-definition. An absent key yields `None` without a report;
/// the meta-schema has already flagged it.
fn bind_sub_definition(
    document_name: &str,
    document: &Value,
    kind: DefinitionKind,
    acc: &mut Accumulator,
) -> Result<Option<SubDefinition>, SchemaValidationError> {
    let key = kind.key();
    let Some(value) = document.get(key) else {
        return Ok(None);
    };
    match SubDefinition::deserialize(value) {
        Ok(sub) => Ok(Some(sub)),
        Err(e) => {
            acc.report(Violation::new(
                document_name,
                format!("/{key}"),
                format!("{key} does not bind to the definition structure: {e}"),
            ))?;
            Ok(None)
        }
    }
}

/// Sub-definitions in [`DefinitionKind::ALL`] order; `None` if any is
/// missing.
fn assemble(bound: Vec<Option<SubDefinition>>) -> Option<SchemaDefinition> {
    let mut subs = bound.into_iter();
    Some(SchemaDefinition {
        repository_definition: subs.next()??,
        source_config_definition: subs.next()??,
        linked_source_definition: subs.next()??,
        virtual_source_definition: subs.next()??,
        snapshot_definition: subs.next()??,
    })
}

fn check_cross_field_rules(
    document_name: &str,
    kind: DefinitionKind,
    sub: &SubDefinition,
    acc: &mut Accumulator,
) -> Result<(), SchemaValidationError> {
    let key = kind.key();

    if let Some(name_field) = &sub.name_field {
        if !sub.has_property(name_field) {
            acc.report(Violation::new(
                document_name,
                format!("/{key}/nameField"),
                format!("nameField '{name_field}' is not one of the properties of {key}"),
            ))?;
        }
    }

    let mut seen = HashSet::new();
    for (i, field) in sub.identity_fields().iter().enumerate() {
        if !sub.has_property(field) {
            acc.report(Violation::new(
                document_name,
                format!("/{key}/identityFields/{i}"),
                format!("identity field '{field}' is not one of the properties of {key}"),
            ))?;
        }
        if !seen.insert(field.as_str()) {
            acc.report(Violation::new(
                document_name,
                format!("/{key}/identityFields/{i}"),
                format!("identity field '{field}' is listed more than once"),
            ))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_doc() -> Value {
        json!({
            "repositoryDefinition": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "port": {"type": "integer"}
                },
                "nameField": "name",
                "identityFields": ["name", "port"]
            },
            "sourceConfigDefinition": {
                "type": "object",
                "required": ["name"],
                "additionalProperties": false,
                "properties": {"name": {"type": "string"}},
                "nameField": "name",
                "identityFields": ["name"]
            },
            "linkedSourceDefinition": {"type": "object", "properties": {}},
            "virtualSourceDefinition": {
                "type": "object",
                "properties": {
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "conn": {
                        "type": "object",
                        "properties": {"host": {"type": ["string", "null"]}}
                    }
                }
            },
            "snapshotDefinition": {"type": "object", "properties": {}}
        })
    }

    fn validator() -> SchemaValidator {
        SchemaValidator::new().unwrap()
    }

    #[test]
    fn valid_document_has_no_warnings() {
        let result = validator()
            .validate("schema.json", &valid_doc(), ValidationMode::Warning)
            .unwrap();
        assert!(result.is_clean(), "{:?}", result.warnings);
        assert!(result.definition.is_some());
    }

    #[test]
    fn valid_document_passes_error_mode() {
        validator()
            .validate("schema.json", &valid_doc(), ValidationMode::Error)
            .unwrap();
    }

    #[test]
    fn name_field_must_be_a_property() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["nameField"] = json!("title");
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].instance_path,
            "/repositoryDefinition/nameField"
        );
        assert!(result.warnings[0].message.contains("title"));
    }

    #[test]
    fn identity_fields_must_be_properties() {
        let mut doc = valid_doc();
        doc["sourceConfigDefinition"]["identityFields"] = json!(["name", "uuid"]);
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].instance_path,
            "/sourceConfigDefinition/identityFields/1"
        );
    }

    #[test]
    fn duplicate_identity_fields_are_reported() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["identityFields"] = json!(["name", "name"]);
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("more than once"));
    }

    #[test]
    fn warning_mode_collects_every_cross_field_violation() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["nameField"] = json!("missing");
        doc["repositoryDefinition"]["identityFields"] = json!(["gone"]);
        doc["sourceConfigDefinition"]["nameField"] = json!("absent");
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        let paths: Vec<&str> = result
            .warnings
            .iter()
            .map(|w| w.instance_path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/repositoryDefinition/nameField",
                "/repositoryDefinition/identityFields/0",
                "/sourceConfigDefinition/nameField",
            ]
        );
    }

    #[test]
    fn error_mode_stops_at_first_violation() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["nameField"] = json!("missing");
        doc["sourceConfigDefinition"]["nameField"] = json!("absent");
        let err = validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { violation } => {
                assert_eq!(violation.instance_path, "/repositoryDefinition/nameField");
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn invalid_property_name_is_structural() {
        let mut doc = valid_doc();
        doc["linkedSourceDefinition"]["properties"] = json!({"not valid": {"type": "string"}});
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert!(!result.is_clean());
        assert!(result.definition.is_none());
    }

    #[test]
    fn structural_problem_does_not_hide_other_definitions() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["nameField"] = json!("title");
        doc["repositoryDefinition"]["identityFields"] = json!(["uuid"]);
        doc["snapshotDefinition"]["properties"] = json!({"1st": {"type": "string"}});
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        let paths: Vec<&str> = result
            .warnings
            .iter()
            .map(|w| w.instance_path.as_str())
            .collect();
        assert!(paths.iter().any(|p| p.starts_with("/snapshotDefinition")), "{paths:?}");
        assert!(paths.contains(&"/repositoryDefinition/nameField"), "{paths:?}");
        assert!(paths.contains(&"/repositoryDefinition/identityFields/0"), "{paths:?}");
        assert!(result.definition.is_none());
    }

    #[test]
    fn structurally_broken_definition_skips_its_own_cross_field_rules() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["properties"]["not valid"] = json!({"type": "string"});
        doc["repositoryDefinition"]["nameField"] = json!("title");
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert!(!result.is_clean());
        assert!(result
            .warnings
            .iter()
            .all(|w| w.instance_path != "/repositoryDefinition/nameField"));
    }

    #[test]
    fn touches_matches_whole_key_segments() {
        let violations = [Violation::new("schema.json", "/snapshotDefinition/properties", "x")];
        assert!(touches(&violations, "snapshotDefinition"));
        assert!(!touches(&violations, "snapshot"));
        assert!(!touches(&[Violation::new("schema.json", "", "x")], "snapshotDefinition"));
    }

    #[test]
    fn property_name_may_not_start_with_digit() {
        let mut doc = valid_doc();
        doc["snapshotDefinition"]["properties"] = json!({"1st": {"type": "string"}});
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn nested_type_descriptor_is_checked_recursively() {
        let mut doc = valid_doc();
        doc["virtualSourceDefinition"]["properties"]["conn"]["properties"]["host"] =
            json!({"type": "text"});
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert!(!result.is_clean());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.instance_path.starts_with("/virtualSourceDefinition/properties/conn")));
    }

    #[test]
    fn array_items_are_checked() {
        let mut doc = valid_doc();
        doc["virtualSourceDefinition"]["properties"]["tags"]["items"] = json!({"format": "x"});
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn type_descriptor_without_type_or_ref_is_rejected() {
        let mut doc = valid_doc();
        doc["snapshotDefinition"]["properties"] = json!({"size": {"description": "bytes"}});
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn ref_type_descriptor_is_accepted() {
        let mut doc = valid_doc();
        let supplier = "https://delphix.com/platform/api#/definitions/keyCredentialsSupplier";
        doc["snapshotDefinition"]["properties"] = json!({"creds": {"$ref": supplier}});
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert!(result.is_clean(), "{:?}", result.warnings);
    }

    #[test]
    fn missing_definition_is_reported() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("virtualSourceDefinition");
        let result = validator()
            .validate("schema.json", &doc, ValidationMode::Warning)
            .unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("virtualSourceDefinition")));
    }

    #[test]
    fn unknown_top_level_definition_is_reported() {
        let mut doc = valid_doc();
        doc["extraDefinition"] = json!({"properties": {}});
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn repository_requires_identity_annotations() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]
            .as_object_mut()
            .unwrap()
            .remove("identityFields");
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn empty_identity_fields_rejected_for_repository() {
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["identityFields"] = json!([]);
        assert!(validator()
            .validate("schema.json", &doc, ValidationMode::Error)
            .is_err());
    }

    #[test]
    fn non_object_document_is_rejected() {
        let result = validator()
            .validate("schema.json", &json!([1, 2]), ValidationMode::Warning)
            .unwrap();
        assert!(!result.is_clean());
    }

    #[test]
    fn free_function_uses_default_label() {
        let result = validate(&valid_doc(), ValidationMode::Warning).unwrap();
        assert!(result.is_clean());
    }

    #[test]
    fn validate_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = validator()
            .validate_file(&dir.path().join("schema.json"), ValidationMode::Warning)
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::DocumentLoadError { not_found: true, .. }
        ));
    }

    #[test]
    fn validate_file_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{ \"repositoryDefinition\": ").unwrap();
        let err = validator()
            .validate_file(&path, ValidationMode::Warning)
            .unwrap_err();
        match err {
            SchemaValidationError::DocumentLoadError { reason, not_found, .. } => {
                assert!(reason.contains("invalid JSON"));
                assert!(!not_found);
            }
            other => panic!("expected DocumentLoadError, got {other}"),
        }
    }

    #[test]
    fn validate_file_labels_violations_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_schema.json");
        let mut doc = valid_doc();
        doc["repositoryDefinition"]["nameField"] = json!("nope");
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        let result = validator()
            .validate_file(&path, ValidationMode::Warning)
            .unwrap();
        assert_eq!(result.warnings[0].document, "my_schema.json");
    }
}
