use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    domain::{Choice, FieldKind, FieldSchema},
    form::FieldValue,
};

/// What a key press did to a field editor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EditEffect {
    Ignored,
    /// The field now holds this value (`None` clears it).
    Changed(Option<FieldValue>),
    /// The path buffer of a media field changed; nothing is committed yet.
    PathEdited,
}

/// Per-field input state. Text-like fields keep a raw buffer so the user can
/// type an invalid value and see the error on blur.
#[derive(Debug, Clone)]
pub(crate) enum FieldEditor {
    Text { buffer: String },
    Choice { options: Vec<Choice>, selected: Option<usize> },
    Toggle { checked: bool },
    MediaPath { buffer: String },
}

impl FieldEditor {
    pub fn for_field(schema: &FieldSchema, value: Option<&FieldValue>) -> Self {
        match &schema.kind {
            FieldKind::Enum { options } => {
                let current = value.and_then(FieldValue::as_text);
                FieldEditor::Choice {
                    options: options.clone(),
                    selected: current
                        .and_then(|text| options.iter().position(|choice| choice.value == text)),
                }
            }
            FieldKind::Boolean => FieldEditor::Toggle {
                checked: matches!(value, Some(FieldValue::Bool(true))),
            },
            FieldKind::Media { .. } => FieldEditor::MediaPath {
                buffer: value
                    .and_then(FieldValue::as_media)
                    .map(|file| file.path.display().to_string())
                    .unwrap_or_default(),
            },
            _ => FieldEditor::Text {
                buffer: value.map(FieldValue::display).unwrap_or_default(),
            },
        }
    }

    pub fn handle_key(&mut self, kind: &FieldKind, key: &KeyEvent) -> EditEffect {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return EditEffect::Ignored;
        }
        match self {
            FieldEditor::Text { buffer } => {
                if !edit_buffer(buffer, key.code) {
                    return EditEffect::Ignored;
                }
                EditEffect::Changed(FieldValue::from_input(kind, buffer))
            }
            FieldEditor::MediaPath { buffer } => {
                if edit_buffer(buffer, key.code) {
                    EditEffect::PathEdited
                } else {
                    EditEffect::Ignored
                }
            }
            FieldEditor::Choice { options, selected } => {
                if options.is_empty() {
                    return EditEffect::Ignored;
                }
                let len = options.len();
                let next = match (key.code, *selected) {
                    (KeyCode::Right | KeyCode::Char(' '), None) => 0,
                    (KeyCode::Left, None) => len - 1,
                    (KeyCode::Right | KeyCode::Char(' '), Some(idx)) => (idx + 1) % len,
                    (KeyCode::Left, Some(idx)) => (idx + len - 1) % len,
                    (KeyCode::Backspace | KeyCode::Delete, Some(_)) => {
                        *selected = None;
                        return EditEffect::Changed(None);
                    }
                    _ => return EditEffect::Ignored,
                };
                *selected = Some(next);
                EditEffect::Changed(Some(FieldValue::text(options[next].value.clone())))
            }
            FieldEditor::Toggle { checked } => match key.code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    *checked = !*checked;
                    EditEffect::Changed(Some(FieldValue::Bool(*checked)))
                }
                _ => EditEffect::Ignored,
            },
        }
    }

    pub fn display(&self) -> String {
        match self {
            FieldEditor::Text { buffer } | FieldEditor::MediaPath { buffer } => buffer.clone(),
            FieldEditor::Choice { options, selected } => match selected {
                Some(idx) => format!("‹ {} ›", options[*idx].display()),
                None => "‹ choose with ←/→ ›".to_string(),
            },
            FieldEditor::Toggle { checked } => {
                if *checked {
                    "[x] Yes".to_string()
                } else {
                    "[ ] No".to_string()
                }
            }
        }
    }

    pub fn media_path(&self) -> Option<&str> {
        match self {
            FieldEditor::MediaPath { buffer } => Some(buffer.trim()),
            _ => None,
        }
    }

    pub fn accepts_cursor(&self) -> bool {
        matches!(self, FieldEditor::Text { .. } | FieldEditor::MediaPath { .. })
    }
}

fn edit_buffer(buffer: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(ch) => {
            buffer.push(ch);
            true
        }
        KeyCode::Backspace => buffer.pop().is_some(),
        KeyCode::Delete => {
            let changed = !buffer.is_empty();
            buffer.clear();
            changed
        }
        _ => false,
    }
}
