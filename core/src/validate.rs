//! Schema validation.
//!
//! Validates the structural invariants of a form schema: every field has a
//! non-empty id, ids are unique, and choice fields (select, radio) define at
//! least one option. All problems are reported, one error per offending
//! field, so a form author can fix a schema in a single pass.
//!
//! # Examples
//!
//! ```
//! use form_schema_core::*;
//!
//! let schema = FormSchema::new("Permit")
//!     .with_field(FormField::text("name", "Name"))
//!     .with_field(FormField::radio("kind", "Kind", ["new", "renewal"]));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: radio without options
//! let bad = FormSchema::new("Permit")
//!     .with_field(FormField::new("kind", FieldKind::Radio, "Kind"));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::FormSchema;

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Field at the given position has an empty or whitespace-only id.
    #[error("field #{0} has an empty id")]
    EmptyFieldId(usize),
    /// Two fields share an id.
    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(String),
    /// A select or radio field defines no options.
    #[error("field '{id}' of type {kind} must define at least one option")]
    MissingOptions {
        /// Offending field id.
        id: String,
        /// Field type tag.
        kind: String,
    },
}

/// Validates a form schema.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let schema = FormSchema::new("Permit")
///     .with_field(FormField::text("name", "Name"))
///     .with_field(FormField::text("name", "Full name"));
///
/// assert_eq!(
///     validate_schema(&schema),
///     vec![SchemaError::DuplicateFieldId("name".into())]
/// );
/// ```
pub fn validate_schema(schema: &FormSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (position, field) in schema.fields.iter().enumerate() {
        let id = field.id.trim();
        if id.is_empty() {
            errors.push(SchemaError::EmptyFieldId(position));
            continue;
        }
        if !seen.insert(id) {
            errors.push(SchemaError::DuplicateFieldId(id.to_string()));
        }
        if field.kind.is_choice() && field.options().is_empty() {
            errors.push(SchemaError::MissingOptions {
                id: id.to_string(),
                kind: field.kind.to_string(),
            });
        }
    }

    errors
}
