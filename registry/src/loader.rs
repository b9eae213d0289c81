//! Local form catalog with builder pattern and fallback chains.
//!
//! Provides [`FormCatalog`] for in-memory form lookup without a running
//! registry, and [`CatalogBuilder`] for constructing a catalog from multiple
//! sources with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use form_schema_registry::FormCatalog;
//!
//! // Load from a directory of JSON form files
//! let catalog = FormCatalog::from_dir("forms/").unwrap();
//! assert!(catalog.by_context("BOOK").is_some());
//!
//! // Load from a single bundle (a JSON array of form records)
//! let catalog = FormCatalog::from_bundle("forms.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let catalog = FormCatalog::builder()
//!     .from_dir("forms/")
//!     .from_bundle("forms.json")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Lookups by id and by context go through `HashMap` indexes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use form_schema_core::FormSchema;
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};
use crate::records::FormRecord;

/// Describes where a [`FormCatalog`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Loaded from a directory of individual JSON form files.
    Directory(PathBuf),
    /// Loaded from a single JSON array of [`FormRecord`]s.
    Bundle(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

/// In-memory collection of form records, indexed by id and by context.
///
/// Records keep their load order. Inserting a record whose id or context is
/// already present replaces the earlier record.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FormField, FormSchema};
/// use form_schema_registry::{FormCatalog, FormRecord};
///
/// let schema = FormSchema::new("Book").with_field(FormField::text("title", "Title").required());
/// let mut record = FormRecord::from_schema(&schema, Some("BOOK")).unwrap();
/// record.id = Some(1);
///
/// let mut catalog = FormCatalog::default();
/// catalog.insert(record);
///
/// assert_eq!(catalog.get(1).and_then(|r| r.context.as_deref()), Some("BOOK"));
/// assert_eq!(catalog.by_context("BOOK").unwrap().schema().unwrap(), schema);
/// ```
#[derive(Debug, Default)]
pub struct FormCatalog {
    records: Vec<FormRecord>,
    by_id: HashMap<i64, usize>,
    by_context: HashMap<String, usize>,
    source: Option<CatalogSource>,
}

impl FormCatalog {
    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Loads forms from a directory of `*.json` files.
    ///
    /// Each file is read with [`read_form_file`]. Files are visited in name
    /// order so that later files win on conflicting ids or contexts.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory cannot be read or a
    /// file cannot be opened, or [`RegistryError::JsonError`] if any file
    /// contains invalid JSON.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(file_path);
            }
        }
        files.sort();

        let mut catalog = Self {
            source: Some(CatalogSource::Directory(path.to_path_buf())),
            ..Self::default()
        };
        for file in &files {
            catalog.insert(read_form_file(file)?);
        }
        debug!(dir = %path.display(), forms = catalog.len(), "loaded form catalog");
        Ok(catalog)
    }

    /// Loads forms from a single JSON file holding an array of
    /// [`FormRecord`]s, as returned by the registry's list endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the file cannot be read, or
    /// [`RegistryError::JsonError`] if parsing fails.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let records: Vec<FormRecord> = serde_json::from_reader(reader)?;

        let mut catalog = Self {
            source: Some(CatalogSource::Bundle(path.to_path_buf())),
            ..Self::default()
        };
        for record in records {
            catalog.insert(record);
        }
        debug!(bundle = %path.display(), forms = catalog.len(), "loaded form bundle");
        Ok(catalog)
    }

    /// Looks up a form by registry id.
    pub fn get(&self, id: i64) -> Option<&FormRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    /// Looks up the form registered for a context.
    pub fn by_context(&self, context: &str) -> Option<&FormRecord> {
        self.by_context.get(context).map(|&i| &self.records[i])
    }

    /// Adds a record, replacing any record with the same id or context.
    pub fn insert(&mut self, record: FormRecord) {
        let replaced = [
            record.id.and_then(|id| self.by_id.get(&id).copied()),
            record
                .context
                .as_deref()
                .and_then(|c| self.by_context.get(c).copied()),
        ];
        let slot = match replaced {
            [Some(a), Some(b)] if a != b => {
                self.remove_at(b);
                // remove_at shifts later slots down by one
                Some(if a > b { a - 1 } else { a })
            }
            [Some(a), _] | [None, Some(a)] => Some(a),
            [None, None] => None,
        };

        match slot {
            Some(i) => {
                self.unindex(i);
                self.records[i] = record;
                self.index(i);
            }
            None => {
                self.records.push(record);
                self.index(self.records.len() - 1);
            }
        }
    }

    /// Returns the number of forms in the catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the catalog holds no forms.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &FormRecord> {
        self.records.iter()
    }

    /// Iterates over records that are not soft-deleted.
    pub fn active(&self) -> impl Iterator<Item = &FormRecord> {
        self.records.iter().filter(|r| r.is_active())
    }

    /// Returns where the catalog was loaded from; `None` for catalogs built
    /// in memory.
    pub fn source(&self) -> Option<&CatalogSource> {
        self.source.as_ref()
    }

    fn index(&mut self, i: usize) {
        let record = &self.records[i];
        if let Some(id) = record.id {
            self.by_id.insert(id, i);
        }
        if let Some(context) = &record.context {
            self.by_context.insert(context.clone(), i);
        }
    }

    fn unindex(&mut self, i: usize) {
        let record = &self.records[i];
        if let Some(id) = record.id {
            self.by_id.remove(&id);
        }
        if let Some(context) = &record.context {
            self.by_context.remove(context);
        }
    }

    fn remove_at(&mut self, i: usize) {
        self.records.remove(i);
        self.by_id.clear();
        self.by_context.clear();
        for j in 0..self.records.len() {
            self.index(j);
        }
    }
}

/// Reads one form file.
///
/// A JSON object with a `schemaJson` key is read as a [`FormRecord`].
/// Anything else is read as a bare [`FormSchema`] and wrapped in a record
/// whose context is the file stem (`BOOK.json` → `"BOOK"`).
///
/// # Errors
///
/// Returns [`RegistryError::IoError`] if the file cannot be read, or
/// [`RegistryError::JsonError`] if it is not valid JSON.
pub fn read_form_file(path: impl AsRef<Path>) -> Result<FormRecord> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    if value.get("schemaJson").is_some() {
        return Ok(serde_json::from_value(value)?);
    }

    let schema = FormSchema::from_json(&text)?;
    let context = path.file_stem().and_then(|s| s.to_str());
    if context.is_none() {
        warn!(file = %path.display(), "form file has no usable stem, leaving context empty");
    }
    Ok(FormRecord::from_schema(&schema, context)?)
}

/// Builder for constructing a [`FormCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`RegistryError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use form_schema_registry::FormCatalog;
///
/// let catalog = FormCatalog::builder()
///     .from_dir("/etc/formctl/forms/")
///     .from_bundle("/usr/share/formctl/forms.json")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of JSON form files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Adds a bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Bundle(path.into()));
        self
    }

    /// Attempts to load forms from configured sources in order.
    ///
    /// Returns the first successfully loaded catalog. If all sources fail,
    /// returns [`RegistryError::NoSourcesAvailable`].
    pub fn build(self) -> Result<FormCatalog> {
        for source in &self.sources {
            let result = match source {
                CatalogSource::Directory(path) => FormCatalog::from_dir(path),
                CatalogSource::Bundle(path) => FormCatalog::from_bundle(path),
                CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) => {
                    catalog.source = Some(CatalogSource::Multiple(self.sources.clone()));
                    return Ok(catalog);
                }
                Err(err) => debug!(?source, %err, "catalog source failed, trying next"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}

#[cfg(test)]
mod tests {
    use form_schema_core::FormField;

    use super::*;

    fn record(id: i64, context: &str, title: &str) -> FormRecord {
        let schema = FormSchema::new(title).with_field(FormField::text("name", "Name"));
        let mut record = FormRecord::from_schema(&schema, Some(context)).unwrap();
        record.id = Some(id);
        record
    }

    #[test]
    fn test_from_dir_reads_records_and_bare_schemas() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("book.json"),
            serde_json::to_string(&record(1, "BOOK", "Book")).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("PRODUCT.json"),
            r#"{"title": "Product", "fields": [{"id": "sku", "type": "text", "label": "SKU"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = FormCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().display_title(), "Book");

        let product = catalog.by_context("PRODUCT").unwrap();
        assert_eq!(product.id, None);
        assert_eq!(product.schema().unwrap().fields[0].id, "sku");
        assert_eq!(
            catalog.source(),
            Some(&CatalogSource::Directory(dir.path().to_path_buf()))
        );
    }

    #[test]
    fn test_from_dir_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        assert!(matches!(
            FormCatalog::from_dir(dir.path()),
            Err(RegistryError::JsonError(_))
        ));
    }

    #[test]
    fn test_from_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.json");
        let records = vec![record(1, "BOOK", "Book"), record(2, "PRODUCT", "Product")];
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let catalog = FormCatalog::from_bundle(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.by_context("PRODUCT").unwrap().id, Some(2));
    }

    #[test]
    fn test_insert_replaces_same_context() {
        let mut catalog = FormCatalog::default();
        catalog.insert(record(1, "BOOK", "Old"));
        catalog.insert(record(2, "PRODUCT", "Product"));
        catalog.insert(record(3, "BOOK", "New"));

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(1).is_none());
        assert_eq!(catalog.by_context("BOOK").unwrap().display_title(), "New");
        assert_eq!(catalog.get(2).unwrap().display_title(), "Product");
    }

    #[test]
    fn test_insert_merges_conflicting_id_and_context() {
        let mut catalog = FormCatalog::default();
        catalog.insert(record(1, "BOOK", "Book"));
        catalog.insert(record(2, "PRODUCT", "Product"));
        // id 2 and context BOOK point at different records
        catalog.insert(record(2, "BOOK", "Merged"));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(2).unwrap().display_title(), "Merged");
        assert_eq!(catalog.by_context("BOOK").unwrap().id, Some(2));
        assert!(catalog.get(1).is_none());
        assert!(catalog.by_context("PRODUCT").is_none());
    }

    #[test]
    fn test_active_skips_soft_deleted() {
        let mut catalog = FormCatalog::default();
        let mut gone = record(1, "OLD", "Old");
        gone.active = Some(false);
        catalog.insert(gone);
        catalog.insert(record(2, "NEW", "New"));

        let active: Vec<_> = catalog.active().filter_map(|r| r.id).collect();
        assert_eq!(active, vec![2]);
        assert_eq!(catalog.iter().count(), 2);
    }

    #[test]
    fn test_builder_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("forms.json");
        std::fs::write(&bundle, serde_json::to_string(&vec![record(5, "X", "X")]).unwrap()).unwrap();

        let catalog = FormCatalog::builder()
            .from_dir(dir.path().join("missing"))
            .from_bundle(&bundle)
            .build()
            .unwrap();
        assert!(catalog.get(5).is_some());
        assert!(matches!(catalog.source(), Some(CatalogSource::Multiple(s)) if s.len() == 2));
    }

    #[test]
    fn test_builder_no_sources() {
        assert!(matches!(
            FormCatalog::builder().build(),
            Err(RegistryError::NoSourcesAvailable)
        ));
        assert!(matches!(
            FormCatalog::builder().from_bundle("/nonexistent/forms.json").build(),
            Err(RegistryError::NoSourcesAvailable)
        ));
    }
}
