//! Form session: the explicit values record behind a rendered form.
//!
//! A [`FormSession`] owns one schema and the values entered against it.
//! Values start empty, change only through the setter calls (one entry per
//! call), and are handed to the submission callback as a whole once every
//! required field is present.

use form_schema_core::{
    FieldValue, FileHandle, FormField, FormSchema, FormValues, SchemaError, ValueShape,
    validate_schema,
};
use thiserror::Error;
use tracing::{debug, info};

/// Label of the submit control when none is configured.
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit Form";

/// Decides when a required field counts as missing.
///
/// # Examples
///
/// ```
/// use form_schema_core::FieldValue;
/// use form_schema_render::RequiredPolicy;
///
/// let unchecked = FieldValue::Bool(false);
/// assert!(RequiredPolicy::Falsy.is_missing(Some(&unchecked)));
/// assert!(!RequiredPolicy::TypeAware.is_missing(Some(&unchecked)));
/// assert!(RequiredPolicy::TypeAware.is_missing(None));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredPolicy {
    /// Absent, empty text and `false` are all missing. A required checkbox
    /// can therefore only be satisfied by checking it.
    #[default]
    Falsy,
    /// Absent or empty text is missing; any explicit boolean answer and any
    /// picked file satisfy the field.
    TypeAware,
}

impl RequiredPolicy {
    /// Returns `true` when `value` does not satisfy a required field.
    pub fn is_missing(self, value: Option<&FieldValue>) -> bool {
        match (self, value) {
            (_, None) => true,
            (Self::Falsy, Some(value)) => value.is_falsy(),
            (Self::TypeAware, Some(FieldValue::Text(text))) => text.is_empty(),
            (Self::TypeAware, Some(_)) => false,
        }
    }
}

/// Rejected field change. The stored values are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// No field with this id exists in the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The value's shape does not match the field kind.
    #[error("field '{id}' expects a {expected:?} value, got {actual:?}")]
    ShapeMismatch {
        /// Field id.
        id: String,
        /// Shape required by the field kind.
        expected: ValueShape,
        /// Shape of the rejected value.
        actual: ValueShape,
    },
    /// A select or radio value outside the field's options.
    #[error("'{value}' is not an option of field '{id}'")]
    NotAnOption {
        /// Field id.
        id: String,
        /// Rejected value.
        value: String,
    },
}

/// Submission blocked because required fields are missing.
///
/// The `Display` text is the message shown to the user.
///
/// # Examples
///
/// ```
/// use form_schema_render::MissingFields;
///
/// let missing = MissingFields { labels: vec!["Name".into(), "Email".into()] };
/// assert_eq!(
///     missing.to_string(),
///     "Please fill in the following required fields:\n• Name\n• Email"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill in the following required fields:\n• {}", .labels.join("\n• "))]
pub struct MissingFields {
    /// Labels of the missing fields, in display order.
    pub labels: Vec<String>,
}

/// Values state for one rendered form.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FormField, FormSchema};
/// use form_schema_render::FormSession;
///
/// let schema = FormSchema::new("Contact")
///     .with_field(FormField::text("name", "Name").required());
/// let mut session = FormSession::new(schema);
///
/// let mut received = Vec::new();
/// assert!(session.submit(|values| received.push(values)).is_err());
/// assert!(received.is_empty());
///
/// session.set_text("name", "Alice").unwrap();
/// session.submit(|values| received.push(values)).unwrap();
/// assert_eq!(received.len(), 1);
/// assert!(session.values().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormSchema,
    values: FormValues,
    submit_label: String,
    policy: RequiredPolicy,
}

impl FormSession {
    /// Creates a session with empty values.
    ///
    /// The schema is not validated; see [`checked`](Self::checked).
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            values: FormValues::new(),
            submit_label: DEFAULT_SUBMIT_LABEL.to_string(),
            policy: RequiredPolicy::default(),
        }
    }

    /// Creates a session after validating the schema.
    ///
    /// # Errors
    ///
    /// Returns every [`SchemaError`] found in the schema.
    pub fn checked(schema: FormSchema) -> Result<Self, Vec<SchemaError>> {
        let errors = validate_schema(&schema);
        if errors.is_empty() {
            Ok(Self::new(schema))
        } else {
            Err(errors)
        }
    }

    /// Sets the submit control label.
    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Sets the required-field policy.
    pub fn with_policy(mut self, policy: RequiredPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    pub fn policy(&self) -> RequiredPolicy {
        self.policy
    }

    /// Current value of a field.
    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// Applies one field change.
    ///
    /// The value shape must match the field kind, and select/radio values
    /// must be one of the options or the empty "no selection" value.
    ///
    /// # Errors
    ///
    /// Returns a [`ChangeError`] and leaves all values untouched when the
    /// field is unknown or the value does not fit it.
    pub fn set_value(&mut self, id: &str, value: impl Into<FieldValue>) -> Result<(), ChangeError> {
        let value = value.into();
        let field = self.field(id)?;
        check_value(field, &value)?;
        debug!(field = id, kind = %field.kind, "field value changed");
        self.values.set(id, value);
        Ok(())
    }

    /// Sets a text-shaped field.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), ChangeError> {
        self.set_value(id, FieldValue::from(text))
    }

    /// Sets a checkbox.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), ChangeError> {
        self.set_value(id, FieldValue::Bool(checked))
    }

    /// Sets a file field.
    pub fn set_file(&mut self, id: &str, handle: FileHandle) -> Result<(), ChangeError> {
        self.set_value(id, FieldValue::File(handle))
    }

    /// Removes a field's value, as if it had never been touched.
    pub fn clear(&mut self, id: &str) -> Result<Option<FieldValue>, ChangeError> {
        self.field(id)?;
        Ok(self.values.remove(id))
    }

    /// Labels of required fields currently missing, in display order.
    pub fn missing_required(&self) -> Vec<&str> {
        self.schema
            .required_fields()
            .filter(|f| self.policy.is_missing(self.values.get(&f.id)))
            .map(|f| f.label.as_str())
            .collect()
    }

    /// Submits the form.
    ///
    /// When required fields are missing the callback is not invoked and the
    /// values are kept. Otherwise `on_submit` runs once with the full values
    /// mapping, which the session then forgets. The session does not wait on
    /// anything the callback starts.
    ///
    /// # Errors
    ///
    /// Returns [`MissingFields`] naming the labels of the missing fields.
    pub fn submit<F>(&mut self, on_submit: F) -> Result<(), MissingFields>
    where
        F: FnOnce(FormValues),
    {
        let missing = self.missing_required();
        if !missing.is_empty() {
            info!(missing = missing.len(), "submission blocked by required fields");
            return Err(MissingFields {
                labels: missing.into_iter().map(String::from).collect(),
            });
        }

        let values = std::mem::take(&mut self.values);
        info!(fields = values.len(), "submitting form values");
        on_submit(values);
        Ok(())
    }

    fn field(&self, id: &str) -> Result<&FormField, ChangeError> {
        self.schema
            .find_field(id)
            .ok_or_else(|| ChangeError::UnknownField(id.to_string()))
    }
}

fn check_value(field: &FormField, value: &FieldValue) -> Result<(), ChangeError> {
    let expected = field.kind.value_shape();
    if value.shape() != expected {
        return Err(ChangeError::ShapeMismatch {
            id: field.id.clone(),
            expected,
            actual: value.shape(),
        });
    }
    if field.kind.is_choice() {
        if let Some(text) = value.as_text() {
            if !text.is_empty() && !field.allows_option(text) {
                return Err(ChangeError::NotAnOption {
                    id: field.id.clone(),
                    value: text.to_string(),
                });
            }
        }
    }
    Ok(())
}
