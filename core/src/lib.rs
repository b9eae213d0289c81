//! Core form schema types and shared value primitives.
//!
//! This crate defines the foundational types for describing dynamic forms
//! and the values collected against them:
//!
//! - [`FormSchema`]: a form title plus an ordered list of fields.
//! - [`FormField`]: one field: id, [`FieldKind`], label, placeholder,
//!   required flag and options.
//! - [`FieldValue`] / [`FormValues`]: values keyed by field id, shaped by
//!   the field kind ([`ValueShape`]).
//!
//! Parsing is forward-compatible: unknown keys on a schema or field are
//! ignored and a missing field list is read as an empty one.
//!
//! Validation ([`validate_schema`]) catches structural errors such as
//! duplicate ids and choice fields without options.
//!
//! [`FieldMapping`] resolves submitted values by label for services that map
//! submissions onto their own records.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let schema = FormSchema::from_json(r#"{
//!     "title": "Contact",
//!     "fields": [
//!         {"id": "name", "type": "text", "label": "Name", "required": true},
//!         {"id": "topic", "type": "select", "label": "Topic", "options": ["Tax", "Permits"]}
//!     ]
//! }"#).unwrap();
//!
//! assert!(validate_schema(&schema).is_empty());
//! assert_eq!(schema.find_field("topic").unwrap().kind, FieldKind::Select);
//! assert_eq!(schema.required_fields().count(), 1);
//! ```

mod mapping;
mod types;
mod validate;
mod value;

pub use mapping::FieldMapping;
pub use types::*;
pub use validate::{SchemaError, validate_schema};
pub use value::{FieldValue, FileHandle, FormValues, ValueShape};
