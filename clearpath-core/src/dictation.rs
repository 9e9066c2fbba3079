//! Dictation screens: task selection and the hearing-impairment prompt.
//!
//! Unlike the guide, these screens treat unmatched speech as text to append,
//! not as an unknown command.

use crate::catalog::TaskCatalog;
use crate::resolver::CommandHandler;

/// Text assembled from typed input and successive utterances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictation {
    text: String,
}

impl Dictation {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            text: initial.into(),
        }
    }

    /// Append a transcript, separated from existing text by one space.
    pub fn append(&mut self, transcript: &str) {
        let t = transcript.trim();
        if t.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(t);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Voice handler for the task selection screen.
///
/// Speech naming a known task selects it; anything else is dictated into the
/// custom task description.
pub struct SelectionVoice<'a> {
    catalog: &'a mut TaskCatalog,
    description: Dictation,
    selected: Option<String>,
}

impl<'a> SelectionVoice<'a> {
    pub fn new(catalog: &'a mut TaskCatalog, description: Dictation) -> Self {
        Self {
            catalog,
            description,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn description(&self) -> &Dictation {
        &self.description
    }
}

impl CommandHandler for SelectionVoice<'_> {
    fn available_commands(&self) -> Vec<String> {
        self.catalog.all_tasks().to_vec()
    }

    fn on_command_match(&mut self, command: &str) {
        self.catalog.select_task(command);
        self.selected = Some(command.to_string());
    }

    fn on_no_match(&mut self, transcript: &str) -> bool {
        self.description.append(transcript);
        true
    }
}

/// Voice handler that only dictates (hearing-impairment prompt).
impl CommandHandler for Dictation {
    fn available_commands(&self) -> Vec<String> {
        Vec::new()
    }

    fn on_command_match(&mut self, command: &str) {
        self.append(command);
    }

    fn on_no_match(&mut self, transcript: &str) -> bool {
        self.append(transcript);
        true
    }
}
