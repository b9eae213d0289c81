//! Field values collected against a schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shape of the value a field holds, fixed by its [`FieldKind`](crate::FieldKind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A string (text, textarea, select, radio, date, color, other kinds).
    Text,
    /// A boolean (checkbox).
    Boolean,
    /// A [`FileHandle`] (file).
    File,
}

/// Opaque handle to a picked file. Carries metadata only, never content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// File name as chosen by the user.
    pub name: String,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileHandle {
    /// Creates a handle from a file name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: None,
            content_type: None,
        }
    }
}

/// Value of a single field.
///
/// Serialized untagged: a JSON boolean, a JSON string or a file object.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldValue, ValueShape};
///
/// let v: FieldValue = serde_json::from_str("\"Alice\"").unwrap();
/// assert_eq!(v, FieldValue::from("Alice"));
/// assert_eq!(v.shape(), ValueShape::Text);
///
/// assert!(FieldValue::from("").is_falsy());
/// assert!(FieldValue::Bool(false).is_falsy());
/// assert!(!FieldValue::Bool(true).is_falsy());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox state.
    Bool(bool),
    /// Text-like value.
    Text(String),
    /// Picked file.
    File(FileHandle),
}

impl FieldValue {
    /// Returns the shape of this value.
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Bool(_) => ValueShape::Boolean,
            Self::Text(_) => ValueShape::Text,
            Self::File(_) => ValueShape::File,
        }
    }

    /// Coarse emptiness check: empty text and `false` count as missing.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Text(s) => s.is_empty(),
            Self::File(_) => false,
        }
    }

    /// Returns the text when this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag when this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Plain string rendering, used when mapping submissions to records.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
            Self::File(handle) => handle.name.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(handle: FileHandle) -> Self {
        Self::File(handle)
    }
}

/// Values keyed by field id.
///
/// Only fields that were actually set appear; there is no null padding for
/// untouched fields.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldValue, FormValues};
///
/// let mut values = FormValues::new();
/// values.set("name", "Alice");
/// values.set("agree", true);
/// values.set("name", "Bob");
///
/// assert_eq!(values.len(), 2);
/// assert_eq!(values.get("name"), Some(&FieldValue::from("Bob")));
/// assert_eq!(values.to_json_string().unwrap(), r#"{"agree":true,"name":"Bob"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    entries: BTreeMap<String, FieldValue>,
}

impl FormValues {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one entry, leaving every other entry untouched.
    pub fn set(&mut self, id: &str, value: impl Into<FieldValue>) {
        self.entries.insert(id.to_string(), value.into());
    }

    /// Looks up the value for a field id.
    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.entries.get(id)
    }

    /// Removes an entry, returning the previous value.
    pub fn remove(&mut self, id: &str) -> Option<FieldValue> {
        self.entries.remove(id)
    }

    /// Returns `true` if a value is stored for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, value)` pairs ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the stored ids ordered by id.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Encodes the mapping as a JSON object string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a mapping from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
