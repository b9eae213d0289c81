//! HTML rendering of a form session.
//!
//! Produces a self-contained `<form>` fragment. Controls reflect the
//! session's current values; styling is left to the host page, so only
//! structural class names are emitted.

use std::fmt::Write;

use form_schema_core::{FieldValue, FormField};

use crate::session::FormSession;
use crate::widget::{DEFAULT_COLOR, Widget};

/// Renders the session's schema and current values as an HTML form.
///
/// A schema without fields renders a form containing only the title and the
/// submit control.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FormField, FormSchema};
/// use form_schema_render::{FormSession, render_html};
///
/// let schema = FormSchema::new("Contact")
///     .with_field(FormField::text("name", "Name").required());
/// let mut session = FormSession::new(schema).with_submit_label("Send");
/// session.set_text("name", "Ada & co").unwrap();
///
/// let html = render_html(&session);
/// assert!(html.contains(r#"value="Ada &amp; co""#));
/// assert!(html.contains(">Send</button>"));
/// ```
pub fn render_html(session: &FormSession) -> String {
    let mut out = String::new();
    out.push_str("<form class=\"dynamic-form\" method=\"post\">\n");
    if let Some(title) = &session.schema().title {
        let _ = writeln!(out, "  <h2 class=\"form-title\">{}</h2>", escape(title));
    }
    for field in &session.schema().fields {
        render_field(&mut out, field, session.value(&field.id));
    }
    let _ = writeln!(
        out,
        "  <div class=\"form-actions\"><button type=\"submit\">{}</button></div>",
        escape(session.submit_label())
    );
    out.push_str("</form>\n");
    out
}

fn render_field(out: &mut String, field: &FormField, value: Option<&FieldValue>) {
    let widget = Widget::for_field(field);
    let id = escape(&field.id);
    let text = value.and_then(FieldValue::as_text).unwrap_or_default();
    let required = if field.required { " required" } else { "" };

    let _ = writeln!(out, "  <div class=\"form-field\" data-field-id=\"{id}\">");
    if widget.shows_label() {
        let marker = if field.required {
            " <span class=\"required\">*</span>"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "    <label for=\"field-{id}\">{}{marker}</label>",
            escape(&field.label)
        );
    }

    match widget {
        Widget::Input { input_type } => {
            let _ = writeln!(
                out,
                "    <input id=\"field-{id}\" name=\"{id}\" type=\"{}\" value=\"{}\"{}{required}>",
                escape(input_type),
                escape(text),
                placeholder_attr(field)
            );
        }
        Widget::TextArea { rows } => {
            let _ = writeln!(
                out,
                "    <textarea id=\"field-{id}\" name=\"{id}\" rows=\"{rows}\"{}{required}>{}</textarea>",
                placeholder_attr(field),
                escape(text)
            );
        }
        Widget::Dropdown {
            no_selection,
            options,
        } => {
            let _ = writeln!(
                out,
                "    <select id=\"field-{id}\" name=\"{id}\"{required}>"
            );
            let _ = writeln!(
                out,
                "      <option value=\"\"{}>{}</option>",
                selected(text.is_empty()),
                escape(no_selection)
            );
            for opt in options {
                let _ = writeln!(
                    out,
                    "      <option value=\"{0}\"{1}>{0}</option>",
                    escape(opt),
                    selected(opt == text)
                );
            }
            out.push_str("    </select>\n");
        }
        Widget::Toggle { caption } => {
            let checked = value.and_then(FieldValue::as_bool).unwrap_or(false);
            let _ = writeln!(
                out,
                "    <input id=\"checkbox-{id}\" name=\"{id}\" type=\"checkbox\"{}>",
                if checked { " checked" } else { "" }
            );
            let _ = writeln!(
                out,
                "    <label for=\"checkbox-{id}\">{}</label>",
                escape(caption)
            );
        }
        Widget::RadioGroup { options } => {
            for (i, opt) in options.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "    <input id=\"radio-{id}-{i}\" name=\"{id}\" type=\"radio\" value=\"{}\"{}{required}>",
                    escape(opt),
                    if opt == text { " checked" } else { "" }
                );
                let _ = writeln!(
                    out,
                    "    <label for=\"radio-{id}-{i}\">{}</label>",
                    escape(opt)
                );
            }
        }
        Widget::FilePicker => {
            let _ = writeln!(
                out,
                "    <input id=\"field-{id}\" name=\"{id}\" type=\"file\"{required}>"
            );
            if let Some(FieldValue::File(handle)) = value {
                let _ = writeln!(
                    out,
                    "    <span class=\"file-name\">{}</span>",
                    escape(&handle.name)
                );
            }
        }
        Widget::ColorPicker => {
            let swatch = if text.is_empty() { DEFAULT_COLOR } else { text };
            let _ = writeln!(
                out,
                "    <input id=\"field-{id}\" name=\"{id}\" type=\"color\" value=\"{}\"{required}>",
                escape(swatch)
            );
            let _ = writeln!(
                out,
                "    <input name=\"{id}-hex\" type=\"text\" value=\"{}\" placeholder=\"{DEFAULT_COLOR}\">",
                escape(text)
            );
        }
    }

    if widget.shows_hint() {
        if let Some(hint) = &field.placeholder {
            let _ = writeln!(out, "    <p class=\"hint\">{}</p>", escape(hint));
        }
    }
    out.push_str("  </div>\n");
}

fn placeholder_attr(field: &FormField) -> String {
    field
        .placeholder
        .as_deref()
        .map(|p| format!(" placeholder=\"{}\"", escape(p)))
        .unwrap_or_default()
}

fn selected(is_selected: bool) -> &'static str {
    if is_selected { " selected" } else { "" }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
