//! Registry access for declarative form schemas.
//!
//! This crate covers everything outside the form itself: the wire records
//! the form registry service exchanges, an async HTTP client for it, a local
//! catalog that loads the same records from disk, and client configuration.
//!
//! # Quick start
//!
//! ```no_run
//! use form_schema_registry::{ClientConfig, FormCatalog, RegistryClient};
//!
//! # async fn run() -> form_schema_registry::Result<()> {
//! // Remote: fetch the form registered for a context
//! let client = RegistryClient::new(&ClientConfig::from_env())?;
//! if let Some(record) = client.get_form_by_context("BOOK").await? {
//!     println!("{} has {} fields", record.display_title(), record.schema()?.fields.len());
//! }
//!
//! // Local: a directory of form files, falling back to a bundle
//! let catalog = FormCatalog::builder()
//!     .from_dir("forms/")
//!     .from_bundle("forms.json")
//!     .build()?;
//! println!("{} forms available offline", catalog.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod loader;
mod records;

pub use client::RegistryClient;
pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL, TOKEN_ENV};
pub use error::{RegistryError, Result};
pub use loader::{CatalogBuilder, CatalogSource, FormCatalog, read_form_file};
pub use records::{FormRecord, NewForm, NewSubmission, SubmissionRecord};
