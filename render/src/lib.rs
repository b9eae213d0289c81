//! Rendering and submission handling for dynamic forms.
//!
//! Given a [`FormSchema`](form_schema_core::FormSchema), this crate provides:
//!
//! - [`FormSession`]: the explicit values record of one rendered form,
//!   updated one field at a time and submitted through an injected callback
//!   once every required field is present ([`RequiredPolicy`]).
//! - [`Widget`]: the per-kind input affordance, chosen in one place from
//!   the field kind with a generic input as fallback.
//! - [`render_html`]: HTML markup for a session's schema and values.
//!
//! The session performs no I/O. Persisting a submission (for example by
//! posting it to a submissions API) is the callback's job.
//!
//! # Example
//!
//! ```
//! use form_schema_core::{FormField, FormSchema, FormValues};
//! use form_schema_render::FormSession;
//!
//! let schema = FormSchema::new("Registration")
//!     .with_field(FormField::text("name", "Name").required())
//!     .with_field(FormField::checkbox("newsletter", "Newsletter"));
//! let mut session = FormSession::new(schema);
//!
//! let blocked = session.submit(|_| unreachable!()).unwrap_err();
//! assert!(blocked.to_string().contains("Name"));
//!
//! session.set_text("name", "Alice").unwrap();
//! let mut submitted = FormValues::new();
//! session.submit(|values| submitted = values).unwrap();
//! assert_eq!(submitted.to_json_string().unwrap(), r#"{"name":"Alice"}"#);
//! ```

mod html;
mod session;
mod widget;

pub use html::{escape, render_html};
pub use session::{ChangeError, DEFAULT_SUBMIT_LABEL, FormSession, MissingFields, RequiredPolicy};
pub use widget::{DEFAULT_COLOR, NO_SELECTION_LABEL, TEXTAREA_ROWS, Widget};
