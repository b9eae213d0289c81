//! Terminal renderer: fills a [`FormSession`] one prompt per field.
//!
//! The control used for each field comes from [`Widget::for_field`], so the
//! terminal and HTML renderers agree on how a kind is edited.

use std::io;
use std::path::Path;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use form_schema_core::{FieldValue, FileHandle, FormField};
use form_schema_render::{DEFAULT_COLOR, FormSession, Widget};

/// Prompt primitives the filler needs from a terminal.
pub trait FieldPrompter {
    /// Reads a line of text. An empty answer means "no value".
    fn text(&mut self, prompt: &str, initial: Option<&str>) -> io::Result<String>;

    /// Picks one of `options`. With `no_selection`, an extra first entry
    /// lets the user pick nothing and `None` is returned for it.
    fn choose(
        &mut self,
        prompt: &str,
        options: &[String],
        no_selection: Option<&str>,
    ) -> io::Result<Option<usize>>;

    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;

    /// Reports a recoverable problem before the field is asked again.
    fn warn(&mut self, message: &str);
}

/// [`FieldPrompter`] backed by `dialoguer`.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPrompter for TerminalPrompter {
    fn text(&mut self, prompt: &str, initial: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(initial) = initial.filter(|s| !s.is_empty()) {
            input = input.with_initial_text(initial);
        }
        input.interact_text().map_err(io::Error::other)
    }

    fn choose(
        &mut self,
        prompt: &str,
        options: &[String],
        no_selection: Option<&str>,
    ) -> io::Result<Option<usize>> {
        let mut items: Vec<&str> = Vec::with_capacity(options.len() + 1);
        items.extend(no_selection);
        items.extend(options.iter().map(String::as_str));

        let picked = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact()
            .map_err(io::Error::other)?;

        Ok(match no_selection {
            Some(_) => picked.checked_sub(1),
            None => Some(picked),
        })
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(io::Error::other)
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

/// Prompts for every field of the session's schema, in order.
pub fn fill_all<P: FieldPrompter + ?Sized>(
    session: &mut FormSession,
    prompter: &mut P,
) -> Result<(), String> {
    let fields = session.schema().fields.clone();
    for field in &fields {
        fill_field(session, field, prompter)?;
    }
    Ok(())
}

/// Prompts again for the fields whose labels are listed in `labels`.
pub fn fill_labels<P: FieldPrompter + ?Sized>(
    session: &mut FormSession,
    labels: &[String],
    prompter: &mut P,
) -> Result<(), String> {
    let fields: Vec<FormField> = session
        .schema()
        .fields
        .iter()
        .filter(|f| labels.contains(&f.label))
        .cloned()
        .collect();
    for field in &fields {
        fill_field(session, field, prompter)?;
    }
    Ok(())
}

/// Prompts for one field with the control its kind calls for.
pub fn fill_field<P: FieldPrompter + ?Sized>(
    session: &mut FormSession,
    field: &FormField,
    prompter: &mut P,
) -> Result<(), String> {
    let widget = Widget::for_field(field);
    let prompt = prompt_text(field, &widget);
    let current = session.value(&field.id).map(FieldValue::to_plain_string);
    let id = field.id.as_str();

    loop {
        let changed = match widget {
            Widget::Toggle { caption } => {
                let checked = session
                    .value(id)
                    .and_then(FieldValue::as_bool)
                    .unwrap_or(false);
                let caption = if field.required {
                    format!("{caption} *")
                } else {
                    caption.to_string()
                };
                let answer = prompter.confirm(&caption, checked).map_err(prompt_error)?;
                session.set_checked(id, answer)
            }
            Widget::Dropdown {
                no_selection,
                options,
            } => match prompter
                .choose(&prompt, options, Some(no_selection))
                .map_err(prompt_error)?
            {
                Some(i) => session.set_text(id, &options[i]),
                None => session.clear(id).map(drop),
            },
            Widget::RadioGroup { options } => {
                match prompter.choose(&prompt, options, None).map_err(prompt_error)? {
                    Some(i) => session.set_text(id, &options[i]),
                    None => session.clear(id).map(drop),
                }
            }
            Widget::FilePicker => {
                let answer = prompter
                    .text(&prompt, current.as_deref())
                    .map_err(prompt_error)?;
                let answer = answer.trim();
                if answer.is_empty() {
                    session.clear(id).map(drop)
                } else {
                    match file_handle(Path::new(answer)) {
                        Ok(handle) => session.set_file(id, handle),
                        Err(err) => {
                            prompter.warn(&format!("cannot use '{answer}': {err}"));
                            continue;
                        }
                    }
                }
            }
            Widget::ColorPicker => {
                let initial = current.as_deref().unwrap_or(DEFAULT_COLOR);
                let answer = prompter.text(&prompt, Some(initial)).map_err(prompt_error)?;
                set_text_or_clear(session, id, &answer)
            }
            Widget::Input { .. } | Widget::TextArea { .. } => {
                let answer = prompter
                    .text(&prompt, current.as_deref())
                    .map_err(prompt_error)?;
                set_text_or_clear(session, id, &answer)
            }
        };

        match changed {
            Ok(()) => return Ok(()),
            Err(err) => prompter.warn(&err.to_string()),
        }
    }
}

fn prompt_text(field: &FormField, widget: &Widget<'_>) -> String {
    let mut prompt = field.label.clone();
    if field.required {
        prompt.push_str(" *");
    }
    if let Some(hint) = field.placeholder.as_deref().filter(|_| widget.shows_hint()) {
        prompt.push_str(&format!(" ({hint})"));
    }
    prompt
}

fn set_text_or_clear(
    session: &mut FormSession,
    id: &str,
    answer: &str,
) -> Result<(), form_schema_render::ChangeError> {
    if answer.trim().is_empty() {
        session.clear(id).map(drop)
    } else {
        session.set_text(id, answer)
    }
}

/// Builds a handle for a local file: its name and size, never its content.
fn file_handle(path: &Path) -> io::Result<FileHandle> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "file name is not UTF-8"))?;
    let mut handle = FileHandle::new(name);
    handle.size = Some(metadata.len());
    Ok(handle)
}

fn prompt_error(err: io::Error) -> String {
    format!("Prompt failed: {err}")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use form_schema_core::FormSchema;

    use super::*;

    #[derive(Debug)]
    enum Answer {
        Text(String),
        Pick(Option<usize>),
        Yes(bool),
    }

    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        prompts: Vec<String>,
        warnings: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                ..Default::default()
            }
        }

        fn next(&mut self, prompt: &str) -> Answer {
            self.prompts.push(prompt.to_string());
            self.answers.pop_front().expect("script ran out of answers")
        }
    }

    impl FieldPrompter for ScriptedPrompter {
        fn text(&mut self, prompt: &str, _initial: Option<&str>) -> io::Result<String> {
            match self.next(prompt) {
                Answer::Text(s) => Ok(s),
                other => panic!("expected text answer for '{prompt}', got {other:?}"),
            }
        }

        fn choose(
            &mut self,
            prompt: &str,
            options: &[String],
            _no_selection: Option<&str>,
        ) -> io::Result<Option<usize>> {
            match self.next(prompt) {
                Answer::Pick(i) => {
                    assert!(i.is_none_or(|i| i < options.len()));
                    Ok(i)
                }
                other => panic!("expected pick for '{prompt}', got {other:?}"),
            }
        }

        fn confirm(&mut self, prompt: &str, _default: bool) -> io::Result<bool> {
            match self.next(prompt) {
                Answer::Yes(b) => Ok(b),
                other => panic!("expected yes/no for '{prompt}', got {other:?}"),
            }
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    fn contact_schema() -> FormSchema {
        FormSchema::new("Contact")
            .with_field(FormField::text("name", "Name").required().with_placeholder("Full name"))
            .with_field(FormField::select("topic", "Topic", ["Tax", "Permits"]))
            .with_field(FormField::radio("reply", "Reply by", ["Email", "Phone"]))
            .with_field(FormField::checkbox("agree", "I agree").required())
            .with_field(FormField::textarea("notes", "Notes"))
    }

    #[test]
    fn test_fill_all_walks_fields_in_order() {
        let mut session = FormSession::new(contact_schema());
        let mut prompter = ScriptedPrompter::new([
            Answer::Text("Alice".into()),
            Answer::Pick(Some(1)),
            Answer::Pick(Some(0)),
            Answer::Yes(true),
            Answer::Text("".into()),
        ]);

        fill_all(&mut session, &mut prompter).unwrap();

        assert_eq!(
            prompter.prompts,
            vec!["Name * (Full name)", "Topic", "Reply by", "I agree *", "Notes"]
        );
        let values = session.values();
        assert_eq!(values.get("name"), Some(&FieldValue::from("Alice")));
        assert_eq!(values.get("topic"), Some(&FieldValue::from("Permits")));
        assert_eq!(values.get("reply"), Some(&FieldValue::from("Email")));
        assert_eq!(values.get("agree"), Some(&FieldValue::Bool(true)));
        assert!(!values.contains("notes"));
        assert!(session.missing_required().is_empty());
    }

    #[test]
    fn test_no_selection_and_blank_text_leave_field_absent() {
        let mut session = FormSession::new(contact_schema());
        let mut prompter = ScriptedPrompter::new([
            Answer::Text("   ".into()),
            Answer::Pick(None),
            Answer::Pick(Some(1)),
            Answer::Yes(false),
            Answer::Text("call after 5".into()),
        ]);

        fill_all(&mut session, &mut prompter).unwrap();

        assert!(!session.values().contains("name"));
        assert!(!session.values().contains("topic"));
        assert_eq!(session.missing_required(), vec!["Name", "I agree"]);
    }

    #[test]
    fn test_fill_labels_only_asks_missing_fields() {
        let mut session = FormSession::new(contact_schema());
        let mut prompter = ScriptedPrompter::new([Answer::Text("Bob".into()), Answer::Yes(true)]);

        let missing: Vec<String> = session
            .missing_required()
            .into_iter()
            .map(String::from)
            .collect();
        fill_labels(&mut session, &missing, &mut prompter).unwrap();

        assert_eq!(prompter.prompts.len(), 2);
        assert!(session.missing_required().is_empty());
    }

    #[test]
    fn test_file_field_reprompts_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let schema = FormSchema::new("Upload").with_field(FormField::file("doc", "Document"));
        let mut session = FormSession::new(schema);
        let mut prompter = ScriptedPrompter::new([
            Answer::Text("/nonexistent/scan.pdf".into()),
            Answer::Text(path.display().to_string()),
        ]);

        fill_all(&mut session, &mut prompter).unwrap();

        assert_eq!(prompter.warnings.len(), 1);
        let mut expected = FileHandle::new("scan.pdf");
        expected.size = Some(8);
        assert_eq!(session.value("doc"), Some(&FieldValue::File(expected)));
    }

    #[test]
    fn test_color_field_keeps_typed_value() {
        let schema = FormSchema::new("Theme").with_field(FormField::new(
            "accent",
            form_schema_core::FieldKind::Color,
            "Accent",
        ));
        let mut session = FormSession::new(schema);
        let mut prompter = ScriptedPrompter::new([Answer::Text("#ff8800".into())]);

        fill_all(&mut session, &mut prompter).unwrap();
        assert_eq!(session.value("accent"), Some(&FieldValue::from("#ff8800")));
    }
}
