//! Interactive date prompts.

use std::collections::BTreeMap;

use console::{style, Term};
use tracing::debug;

/// Label used when asking for the proposed week commencing.
pub const PROPOSED_WEEK_LABEL: &str = "Proposed week commencing";

/// Label used when asking for the works week commencing.
pub const WORKS_WEEK_LABEL: &str = "Works week commencing";

/// Source of user-supplied dates.
pub trait DatePrompt {
    /// Ask for a date. `None` means the user skipped or cancelled.
    fn prompt_for_date(&mut self, label: &str) -> Option<String>;
}

/// Reads answers from the terminal.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl DatePrompt for TerminalPrompt {
    fn prompt_for_date(&mut self, label: &str) -> Option<String> {
        let question = format!("{} {}: ", style(label).bold(), style("(DD/MM/YY, blank to skip)").dim());
        if let Err(e) = self.term.write_str(&question) {
            debug!("Cannot write prompt: {}", e);
            return None;
        }

        match self.term.read_line() {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(line.trim().to_string()),
            Err(e) => {
                debug!("Prompt for {} cancelled: {}", label, e);
                None
            }
        }
    }
}

/// Answers fixed in advance, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct PresetPrompt {
    answers: BTreeMap<String, String>,
}

impl PresetPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `label` with `value`. Blank values count as skipped.
    pub fn with_answer(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(label.into(), value.into());
        self
    }

    /// Answer `label` when a value is given.
    pub fn with_optional_answer(self, label: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(value) => self.with_answer(label, value),
            None => self,
        }
    }
}

impl DatePrompt for PresetPrompt {
    fn prompt_for_date(&mut self, label: &str) -> Option<String> {
        self.answers
            .get(label)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl DatePrompt for NoPrompt {
    fn prompt_for_date(&mut self, _label: &str) -> Option<String> {
        None
    }
}
