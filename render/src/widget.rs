//! Per-kind input affordances.
//!
//! [`Widget::for_field`] is the single dispatch point from a field kind to
//! the control used to edit it. Renderers (HTML, terminal prompts) match on
//! the returned variant instead of re-inspecting the `type` tag.

use form_schema_core::{FieldKind, FormField};

/// Placeholder shown as the first, empty choice of a dropdown.
pub const NO_SELECTION_LABEL: &str = "Select an option";

/// Swatch value of a colour picker with no value yet.
pub const DEFAULT_COLOR: &str = "#000000";

/// Rows of a multi-line text box.
pub const TEXTAREA_ROWS: u32 = 4;

/// Input affordance for one field.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldKind, FormField};
/// use form_schema_render::Widget;
///
/// let email = FormField::new("email", FieldKind::from("email"), "Email");
/// assert_eq!(Widget::for_field(&email), Widget::Input { input_type: "email" });
///
/// let topic = FormField::select("topic", "Topic", ["Tax"]);
/// assert!(matches!(Widget::for_field(&topic), Widget::Dropdown { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget<'a> {
    /// Generic single-line input keyed by the raw type tag. Also the
    /// fallback for unrecognised kinds.
    Input {
        /// Input type (`text`, `date`, `email`, ...).
        input_type: &'a str,
    },
    /// Multi-line text box.
    TextArea {
        /// Visible rows.
        rows: u32,
    },
    /// Single-choice dropdown with an empty "no selection" entry first.
    Dropdown {
        /// Caption of the empty entry.
        no_selection: &'a str,
        /// Choices in display order.
        options: &'a [String],
    },
    /// Boolean toggle with an inline caption.
    Toggle {
        /// Caption next to the box.
        caption: &'a str,
    },
    /// One exclusive choice among the options.
    RadioGroup {
        /// Choices in display order.
        options: &'a [String],
    },
    /// File picker capturing a handle.
    FilePicker,
    /// Colour swatch paired with a hex text input.
    ColorPicker,
}

impl<'a> Widget<'a> {
    /// Selects the affordance for a field.
    pub fn for_field(field: &'a FormField) -> Self {
        match &field.kind {
            FieldKind::Textarea => Self::TextArea {
                rows: TEXTAREA_ROWS,
            },
            FieldKind::Select => Self::Dropdown {
                no_selection: field.placeholder.as_deref().unwrap_or(NO_SELECTION_LABEL),
                options: field.options(),
            },
            FieldKind::Checkbox => Self::Toggle {
                caption: field.placeholder.as_deref().unwrap_or(field.label.as_str()),
            },
            FieldKind::Radio => Self::RadioGroup {
                options: field.options(),
            },
            FieldKind::File => Self::FilePicker,
            FieldKind::Color => Self::ColorPicker,
            kind => Self::Input {
                input_type: kind.as_str(),
            },
        }
    }

    /// Whether the field label is shown above the control. Toggles carry
    /// their caption inline instead.
    pub fn shows_label(&self) -> bool {
        !matches!(self, Self::Toggle { .. })
    }

    /// Whether the placeholder is repeated as a hint below the control.
    pub fn shows_hint(&self) -> bool {
        !matches!(self, Self::Toggle { .. } | Self::RadioGroup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_covers_known_kinds() {
        let cases = [
            (FormField::text("a", "A"), Widget::Input { input_type: "text" }),
            (FormField::date("a", "A"), Widget::Input { input_type: "date" }),
            (FormField::textarea("a", "A"), Widget::TextArea { rows: 4 }),
            (FormField::file("a", "A"), Widget::FilePicker),
            (
                FormField::new("a", FieldKind::Color, "A"),
                Widget::ColorPicker,
            ),
        ];
        for (field, expected) in &cases {
            assert_eq!(&Widget::for_field(field), expected);
        }
    }

    #[test]
    fn test_toggle_caption_prefers_placeholder() {
        let plain = FormField::checkbox("t", "Terms");
        assert_eq!(Widget::for_field(&plain), Widget::Toggle { caption: "Terms" });

        let hinted = FormField::checkbox("t", "Terms").with_placeholder("I accept the terms");
        assert_eq!(
            Widget::for_field(&hinted),
            Widget::Toggle {
                caption: "I accept the terms"
            }
        );
        assert!(!Widget::for_field(&hinted).shows_label());
    }

    #[test]
    fn test_dropdown_without_options_is_empty() {
        let field = FormField::new("s", FieldKind::Select, "S");
        match Widget::for_field(&field) {
            Widget::Dropdown {
                no_selection,
                options,
            } => {
                assert_eq!(no_selection, NO_SELECTION_LABEL);
                assert!(options.is_empty());
            }
            other => panic!("unexpected widget: {other:?}"),
        }
    }
}
