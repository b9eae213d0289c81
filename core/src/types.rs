//! Schema type definitions for declarative forms.
//!
//! This module defines the data model used to describe a form: an optional
//! title and an ordered list of field definitions. The types are designed for
//! serialization with [`serde`] and parse leniently, so that schemas produced
//! by visual form designers (which attach their own metadata) are accepted
//! as long as the known keys have the expected shape.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ValueShape;

/// Kind of a form field, taken from the `type` key of a field definition.
///
/// The kind is the only thing that decides which input affordance a field
/// gets and which [`ValueShape`] its value has. Tags outside the known set
/// are kept verbatim in [`FieldKind::Other`] and treated as text-like input.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldKind, ValueShape};
///
/// assert_eq!(FieldKind::from("checkbox"), FieldKind::Checkbox);
/// assert_eq!(FieldKind::from("email"), FieldKind::Other("email".into()));
/// assert_eq!(FieldKind::from("email").value_shape(), ValueShape::Text);
/// assert_eq!(FieldKind::Select.as_str(), "select");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Single-line text input (the default).
    #[default]
    Text,
    /// Multi-line text box.
    Textarea,
    /// Single-choice dropdown over `options`.
    Select,
    /// Boolean toggle.
    Checkbox,
    /// Exclusive choice among `options`.
    Radio,
    /// File picker; the value is a handle, never the content.
    File,
    /// Calendar date.
    Date,
    /// Colour picker with a hex text companion.
    Color,
    /// Any other tag (email, number, tel, url, time, ...).
    Other(String),
}

impl FieldKind {
    /// Returns the raw `type` tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::File => "file",
            Self::Date => "date",
            Self::Color => "color",
            Self::Other(tag) => tag,
        }
    }

    /// Returns the shape of values this kind accepts.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::{FieldKind, ValueShape};
    ///
    /// assert_eq!(FieldKind::Checkbox.value_shape(), ValueShape::Boolean);
    /// assert_eq!(FieldKind::File.value_shape(), ValueShape::File);
    /// assert_eq!(FieldKind::Radio.value_shape(), ValueShape::Text);
    /// ```
    pub fn value_shape(&self) -> ValueShape {
        match self {
            Self::Checkbox => ValueShape::Boolean,
            Self::File => ValueShape::File,
            _ => ValueShape::Text,
        }
    }

    /// Returns `true` for kinds whose value must be one of the field options.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "" | "text" => Self::Text,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "file" => Self::File,
            "date" => Self::Date,
            "color" => Self::Color,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of a single form field.
///
/// Use the kind-specific constructors ([`text`](FormField::text),
/// [`select`](FormField::select), [`checkbox`](FormField::checkbox), ...)
/// and chain builder methods such as [`required`](FormField::required).
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldKind, FormField};
///
/// let country = FormField::select("country", "Country", ["Ghana", "Kenya"])
///     .required()
///     .with_placeholder("Pick a country");
///
/// assert_eq!(country.kind, FieldKind::Select);
/// assert!(country.required);
/// assert!(country.allows_option("Kenya"));
/// assert!(!country.allows_option("Peru"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Identifier, unique within one schema; values are keyed by it.
    #[serde(default)]
    pub id: String,
    /// Field kind (serialized as `type`).
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Human-readable label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Placeholder / hint text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether a value must be supplied before submission.
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    /// Choices for select and radio fields, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FormField {
    /// Creates an optional field of any kind.
    pub fn new(id: &str, kind: FieldKind, label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            placeholder: None,
            required: false,
            options: None,
        }
    }

    /// Creates a single-line text field.
    pub fn text(id: &str, label: &str) -> Self {
        Self::new(id, FieldKind::Text, label)
    }

    /// Creates a multi-line text field.
    pub fn textarea(id: &str, label: &str) -> Self {
        Self::new(id, FieldKind::Textarea, label)
    }

    /// Creates a dropdown over `options`.
    pub fn select<I, S>(id: &str, label: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, FieldKind::Select, label).with_options(options)
    }

    /// Creates a radio group over `options`.
    pub fn radio<I, S>(id: &str, label: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, FieldKind::Radio, label).with_options(options)
    }

    /// Creates a checkbox.
    pub fn checkbox(id: &str, label: &str) -> Self {
        Self::new(id, FieldKind::Checkbox, label)
    }

    /// Creates a file picker.
    pub fn file(id: &str, label: &str) -> Self {
        Self::new(id, FieldKind::File, label)
    }

    /// Creates a date input.
    pub fn date(id: &str, label: &str) -> Self {
        Self::new(id, FieldKind::Date, label)
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Replaces the option list.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns the option list, empty when none is defined.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Checks whether `value` is one of the field's options.
    pub fn allows_option(&self, value: &str) -> bool {
        self.options().iter().any(|opt| opt == value)
    }
}

/// A complete form description: optional title plus fields in display order.
///
/// A schema is treated as immutable input once constructed or fetched.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FormField, FormSchema};
///
/// let schema = FormSchema::new("Business licence")
///     .with_field(FormField::text("name", "Name").required())
///     .with_field(FormField::textarea("notes", "Notes"));
///
/// assert_eq!(schema.field_ids(), vec!["name", "notes"]);
/// assert_eq!(schema.required_fields().count(), 1);
/// assert!(schema.find_field("notes").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Form title shown above the fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Field definitions; order is display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FormField>,
}

impl FormSchema {
    /// Creates an empty schema with a title.
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Parses a schema from JSON, ignoring unknown keys.
    ///
    /// A document without a `fields` entry (or with `"fields": null`, or a
    /// bare `null`) yields a schema with zero fields rather than an error.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] when the text is not JSON or a known
    /// key has the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::FormSchema;
    ///
    /// let schema = FormSchema::from_json(r#"{
    ///     "title": "Contact",
    ///     "display": "form",
    ///     "fields": [
    ///         {"id": "name", "type": "text", "label": "Name", "required": true, "key": "x"}
    ///     ]
    /// }"#).unwrap();
    /// assert_eq!(schema.fields.len(), 1);
    ///
    /// let empty = FormSchema::from_json(r#"{"title": "Draft"}"#).unwrap();
    /// assert!(empty.fields.is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: Option<Self> = serde_json::from_str(json)?;
        match parsed {
            Some(schema) => Ok(schema),
            None => {
                tracing::warn!("schema document is null, treating it as an empty form");
                Ok(Self::default())
            }
        }
    }

    /// Serializes the schema to a compact JSON string (the `schemaJson`
    /// representation used by the form registry).
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Finds a field by id.
    pub fn find_field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Iterates over required fields in display order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Gets all field ids in display order.
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
