//! # Template Store
//!
//! The files a fresh plugin project starts from, compiled into the binary,
//! and the `{{ key }}` substitution that fills them in.

use dvp_core::PluginType;
use thiserror::Error;

/// Canonical schema file for a new plugin.
pub const SCHEMA_TEMPLATE: &str = include_str!("../templates/schema_template.json");

/// Entry-point module. Placeholders: `name`, `linked_operations`.
pub const ENTRY_POINT_TEMPLATE: &str = include_str!("../templates/entry_point.py.template");

/// Linked-source operations for a DIRECT plugin.
pub const DIRECT_OPERATIONS_TEMPLATE: &str =
    include_str!("../templates/direct_operations.py.template");

/// Linked-source operations for a STAGED plugin.
pub const STAGED_OPERATIONS_TEMPLATE: &str =
    include_str!("../templates/staged_operations.py.template");

/// Template rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no value supplied for placeholder '{key}' at byte {offset}")]
    UnknownPlaceholder { key: String, offset: usize },

    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },
}

/// Linked-source operations body for an ingestion strategy.
pub fn operations_template(strategy: PluginType) -> &'static str {
    match strategy {
        PluginType::Direct => DIRECT_OPERATIONS_TEMPLATE,
        PluginType::Staged => STAGED_OPERATIONS_TEMPLATE,
    }
}

/// Substitute every `{{ key }}` in `template`.
///
/// Whitespace inside the braces is optional. Substituted values are
/// inserted as-is and never scanned for further placeholders.
///
/// # Errors
///
/// Returns [`TemplateError::UnknownPlaceholder`] when `values` has no entry
/// for a placeholder, and [`TemplateError::Unterminated`] when `{{` has no
/// closing `}}`.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let offset = consumed + open;
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated { offset })?;
        let key = after_open[..close].trim();
        let value = values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| TemplateError::UnknownPlaceholder {
                key: key.to_string(),
                offset,
            })?;
        out.push_str(value);

        let advance = open + 2 + close + 2;
        consumed += advance;
        rest = &rest[advance..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Quote `text` as a single-quoted Python string literal.
pub fn python_string_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Entry-point module source for a plugin.
///
/// # Errors
///
/// Returns a [`TemplateError`] only if the embedded templates are broken.
pub fn entry_point_contents(
    plugin_id: &str,
    strategy: PluginType,
) -> Result<String, TemplateError> {
    let name = python_string_literal(plugin_id);
    render(
        ENTRY_POINT_TEMPLATE,
        &[
            ("name", name.as_str()),
            ("linked_operations", operations_template(strategy)),
        ],
    )
}
