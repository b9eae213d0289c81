//! Resolving submitted values by human-facing names.
//!
//! Services that turn a submission into a domain record (a book, a product,
//! a licence application) know the names they expect ("Title", "Price") but
//! not the ids a form author picked. [`FieldMapping`] indexes a schema's
//! labels so those names can be resolved to field ids.

use std::collections::BTreeMap;

use crate::{FormSchema, FormValues};

/// Label → field id index built from a schema.
///
/// Every labelled field is indexed twice: by its lower-cased, trimmed label
/// and by its lower-cased label with spaces removed.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let schema = FormSchema::new("Book")
///     .with_field(FormField::text("f_1", "Book Title"))
///     .with_field(FormField::text("f_2", "Unit Price"));
/// let mapping = FieldMapping::from_schema(&schema);
///
/// let values: FormValues = [("f_1", "Dune"), ("f_2", "12.50")].into_iter().collect();
/// assert_eq!(mapping.lookup(&values, &["title", "Book Title"]).as_deref(), Some("Dune"));
/// assert_eq!(mapping.get_f64(&values, &["price"]), Some(12.5));
/// assert_eq!(mapping.get_i64(&values, &["price"]), Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    label_to_id: BTreeMap<String, String>,
}

impl FieldMapping {
    /// Builds the index from a schema. Fields without id or label are skipped.
    pub fn from_schema(schema: &FormSchema) -> Self {
        let mut label_to_id = BTreeMap::new();
        for field in &schema.fields {
            if field.id.is_empty() || field.label.is_empty() {
                continue;
            }
            let lower = field.label.to_lowercase();
            label_to_id.insert(lower.trim().to_string(), field.id.clone());
            label_to_id.insert(lower.replace(' ', ""), field.id.clone());
        }
        Self { label_to_id }
    }

    /// Builds the index from a `schemaJson` string.
    ///
    /// Unparseable JSON yields an empty mapping (logged at warn level), in
    /// which case lookups only match submitted keys directly.
    pub fn from_schema_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        match FormSchema::from_json(json) {
            Ok(schema) => Self::from_schema(&schema),
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse schema json for field mapping");
                Self::default()
            }
        }
    }

    /// Returns `true` if no labels were indexed.
    pub fn is_empty(&self) -> bool {
        self.label_to_id.is_empty()
    }

    /// Resolves the field id indexed for a label, if any.
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        let normalized = label.to_lowercase();
        let normalized = normalized.trim();
        self.label_to_id
            .get(normalized)
            .or_else(|| self.label_to_id.get(&normalized.replace(' ', "")))
            .map(String::as_str)
    }

    /// Finds the submitted value for the first matching candidate name.
    ///
    /// Resolution order:
    /// 1. a submitted key equal to a candidate;
    /// 2. a candidate resolved through the label index;
    /// 3. an indexed label containing a lower-cased candidate;
    /// 4. a submitted key equal to a candidate ignoring case, then ignoring
    ///    case and spaces.
    ///
    /// The returned text is trimmed.
    pub fn lookup(&self, values: &FormValues, names: &[&str]) -> Option<String> {
        let found = names
            .iter()
            .find_map(|name| values.get(name))
            .or_else(|| {
                names
                    .iter()
                    .filter_map(|name| self.id_for_label(name))
                    .find_map(|id| values.get(id))
            })
            .or_else(|| {
                self.label_to_id.iter().find_map(|(label, id)| {
                    names
                        .iter()
                        .any(|name| label.contains(&name.to_lowercase()))
                        .then(|| values.get(id))
                        .flatten()
                })
            })
            .or_else(|| {
                values.iter().find_map(|(key, value)| {
                    names
                        .iter()
                        .any(|name| {
                            key.eq_ignore_ascii_case(name)
                                || squash(key) == squash(name)
                        })
                        .then_some(value)
                })
            })?;
        Some(found.to_plain_string().trim().to_string())
    }

    /// Resolves a value and parses it as a float.
    ///
    /// Empty values yield `None`; unparseable ones are logged and yield `None`.
    pub fn get_f64(&self, values: &FormValues, names: &[&str]) -> Option<f64> {
        let raw = self.lookup(values, names)?;
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::warn!(names = ?names, value = %raw, "invalid number format");
                None
            }
        }
    }

    /// Resolves a value, parses it as a float and truncates toward zero.
    pub fn get_i64(&self, values: &FormValues, names: &[&str]) -> Option<i64> {
        self.get_f64(values, names).map(|n| n as i64)
    }
}

fn squash(s: &str) -> String {
    s.replace(' ', "").to_lowercase()
}
