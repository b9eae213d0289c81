//! Wire records exchanged with the form registry service.
//!
//! The registry stores each schema as a JSON string (`schemaJson`) next to
//! bookkeeping metadata, and each submission as a JSON-encoded values
//! object (`submissionData`). Field names are camelCase on the wire;
//! timestamps are zone-less ISO-8601 datetimes.

use chrono::NaiveDateTime;
use form_schema_core::{FormSchema, FormValues};
use serde::{Deserialize, Serialize};

/// A stored form definition.
///
/// # Examples
///
/// ```
/// use form_schema_registry::FormRecord;
///
/// let record: FormRecord = serde_json::from_str(r#"{
///     "id": 7,
///     "title": "Book intake",
///     "schemaJson": "{\"fields\":[{\"id\":\"title\",\"type\":\"text\",\"label\":\"Title\",\"required\":true}]}",
///     "context": "BOOK",
///     "createdBy": "system",
///     "createdAt": "2025-03-02T09:15:00.123",
///     "active": true
/// }"#).unwrap();
///
/// assert_eq!(record.context.as_deref(), Some("BOOK"));
/// assert_eq!(record.schema().unwrap().fields.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    /// Registry-assigned id; absent for forms not stored yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Form title.
    #[serde(default)]
    pub title: Option<String>,
    /// String-encoded [`FormSchema`].
    #[serde(default)]
    pub schema_json: Option<String>,
    /// Usage context (e.g. `"BOOK"`); at most one form per context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    /// Soft-delete flag; records without it count as active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl FormRecord {
    /// Wraps a schema into an unsaved record.
    pub fn from_schema(schema: &FormSchema, context: Option<&str>) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            title: schema.title.clone(),
            schema_json: Some(schema.to_json_string()?),
            context: context.map(String::from),
            created_by: None,
            created_at: None,
            updated_at: None,
            active: Some(true),
        })
    }

    /// Decodes the embedded schema.
    ///
    /// A missing or blank `schemaJson` decodes to an empty form. When the
    /// embedded schema has no title, the record title is used.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if `schemaJson` is not valid JSON.
    pub fn schema(&self) -> serde_json::Result<FormSchema> {
        let mut schema = match self.schema_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => FormSchema::from_json(json)?,
            _ => {
                tracing::warn!(id = ?self.id, "form record has no schema json");
                FormSchema::default()
            }
        };
        if schema.title.is_none() {
            schema.title = self.title.clone();
        }
        Ok(schema)
    }

    /// Whether the form is active (not soft-deleted).
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    /// Title for listings: the record title, or `"(untitled)"`.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForm {
    pub title: String,
    pub schema_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl NewForm {
    /// Builds a request body from a schema. The title falls back to
    /// `"Untitled form"` when the schema has none.
    pub fn from_schema(schema: &FormSchema, context: Option<&str>) -> serde_json::Result<Self> {
        Ok(Self {
            title: schema
                .title
                .clone()
                .unwrap_or_else(|| "Untitled form".to_string()),
            schema_json: schema.to_json_string()?,
            context: context.map(String::from),
        })
    }
}

/// Body of a submission request: the values, JSON-encoded, for one form.
///
/// # Examples
///
/// ```
/// use form_schema_core::FormValues;
/// use form_schema_registry::NewSubmission;
///
/// let values: FormValues = [("name", "Alice")].into_iter().collect();
/// let body = NewSubmission::from_values(3, &values).unwrap();
/// assert_eq!(
///     serde_json::to_string(&body).unwrap(),
///     r#"{"formSchemaId":3,"submissionData":"{\"name\":\"Alice\"}"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub form_schema_id: i64,
    pub submission_data: String,
}

impl NewSubmission {
    /// Encodes `values` for the form with id `form_schema_id`.
    pub fn from_values(form_schema_id: i64, values: &FormValues) -> serde_json::Result<Self> {
        Ok(Self {
            form_schema_id,
            submission_data: values.to_json_string()?,
        })
    }
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub form_schema_id: i64,
    pub submission_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
}

impl SubmissionRecord {
    /// Decodes the submitted values.
    pub fn values(&self) -> serde_json::Result<FormValues> {
        FormValues::from_json(&self.submission_data)
    }
}
