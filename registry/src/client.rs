//! Async HTTP client for the form registry service.
//!
//! Endpoints:
//!
//! | operation | request |
//! |---|---|
//! | [`list_forms`](RegistryClient::list_forms) | `GET /api/forms[?context=]` |
//! | [`get_form`](RegistryClient::get_form) | `GET /api/forms/{id}` |
//! | [`get_form_by_context`](RegistryClient::get_form_by_context) | `GET /api/forms/by-context/{context}` |
//! | [`create_form`](RegistryClient::create_form) | `POST /api/forms` |
//! | [`update_form`](RegistryClient::update_form) | `PUT /api/forms/{id}` |
//! | [`delete_form`](RegistryClient::delete_form) | `DELETE /api/forms/{id}` |
//! | [`submit`](RegistryClient::submit) | `POST /api/submissions` |
//! | [`list_submissions`](RegistryClient::list_submissions) | `GET /api/submissions/form/{id}` |
//!
//! Requests are not retried; failures are returned to the caller.

use std::time::Duration;

use form_schema_core::{FormSchema, FormValues};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{RegistryError, Result};
use crate::records::{FormRecord, NewForm, NewSubmission, SubmissionRecord};

/// Client for one registry instance.
///
/// # Examples
///
/// ```no_run
/// use form_schema_registry::{ClientConfig, RegistryClient};
///
/// # async fn run() -> form_schema_registry::Result<()> {
/// let client = RegistryClient::new(&ClientConfig::from_env())?;
/// for form in client.list_forms(None).await? {
///     println!("{:?} {}", form.id, form.display_title());
/// }
/// if let Some(form) = client.get_form_by_context("BOOK").await? {
///     let schema = form.schema()?;
///     println!("{} fields", schema.fields.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](RegistryError::InvalidConfig) for a bad
    /// configuration, or [`HttpError`](RegistryError::HttpError) if the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: Url::parse(&config.base_url)?,
            token: config.token.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists active forms, optionally restricted to one context.
    pub async fn list_forms(&self, context: Option<&str>) -> Result<Vec<FormRecord>> {
        let mut url = self.endpoint(&["api", "forms"])?;
        if let Some(context) = context {
            url.query_pairs_mut().append_pair("context", context);
        }
        self.fetch_json(Method::GET, url).await
    }

    /// Fetches one form by id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](RegistryError::NotFound) when the id is unknown.
    pub async fn get_form(&self, id: i64) -> Result<FormRecord> {
        let url = self.endpoint(&["api", "forms", id.to_string().as_str()])?;
        self.fetch_json(Method::GET, url).await
    }

    /// Fetches the form registered for a context, `None` when there is none.
    pub async fn get_form_by_context(&self, context: &str) -> Result<Option<FormRecord>> {
        let url = self.endpoint(&["api", "forms", "by-context", context])?;
        match self.fetch_json(Method::GET, url).await {
            Ok(record) => Ok(Some(record)),
            Err(RegistryError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetches a form by id and decodes its schema.
    pub async fn fetch_schema(&self, id: i64) -> Result<FormSchema> {
        Ok(self.get_form(id).await?.schema()?)
    }

    /// Stores a new form.
    pub async fn create_form(&self, form: &NewForm) -> Result<FormRecord> {
        let url = self.endpoint(&["api", "forms"])?;
        info!(title = %form.title, "creating form");
        let response = self.request(Method::POST, url.clone()).json(form).send().await?;
        read_json(response, &url).await
    }

    /// Replaces the title and schema of an existing form.
    pub async fn update_form(&self, id: i64, form: &NewForm) -> Result<FormRecord> {
        let url = self.endpoint(&["api", "forms", id.to_string().as_str()])?;
        info!(id, title = %form.title, "updating form");
        let response = self.request(Method::PUT, url.clone()).json(form).send().await?;
        read_json(response, &url).await
    }

    /// Deactivates a form. The registry keeps the record (soft delete).
    pub async fn delete_form(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&["api", "forms", id.to_string().as_str()])?;
        info!(id, "deleting form");
        let response = self.request(Method::DELETE, url.clone()).send().await?;
        check_status(&response, &url)?;
        Ok(())
    }

    /// Posts submitted values for a form.
    pub async fn submit(&self, form_schema_id: i64, values: &FormValues) -> Result<SubmissionRecord> {
        let url = self.endpoint(&["api", "submissions"])?;
        let body = NewSubmission::from_values(form_schema_id, values)?;
        info!(form_schema_id, fields = values.len(), "posting submission");
        let response = self.request(Method::POST, url.clone()).json(&body).send().await?;
        read_json(response, &url).await
    }

    /// Lists submissions received for a form.
    pub async fn list_submissions(&self, form_schema_id: i64) -> Result<Vec<SubmissionRecord>> {
        let url = self.endpoint(&["api", "submissions", "form", form_schema_id.to_string().as_str()])?;
        self.fetch_json(Method::GET, url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RegistryError::InvalidConfig(format!("base_url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "registry request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        let response = self.request(method, url.clone()).send().await?;
        read_json(response, &url).await
    }
}

fn check_status(response: &Response, url: &Url) -> Result<()> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(RegistryError::NotFound(url.path().to_string()));
    }
    if !status.is_success() {
        return Err(RegistryError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T> {
    check_status(&response, url)?;
    Ok(response.json::<T>().await?)
}
