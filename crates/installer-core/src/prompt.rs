//! Prompt collaborator interface
//!
//! The pipeline only asks questions through [`Prompter`]. Rich and plain
//! terminal implementations live in the `tui` module; tests script answers.

use crate::error::Result;

/// Validation hook: `Some(message)` rejects the input
pub type Validator = fn(&str) -> Option<String>;

/// One option of a select prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub hint: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            hint: String::new(),
        }
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

/// Interactive questions asked during an install
pub trait Prompter: Send + Sync {
    /// Pick one option; returns the chosen [`Choice::value`]
    fn select(&self, label: &str, options: &[Choice], default: &str) -> Result<String>;

    fn confirm(&self, label: &str, default: bool) -> Result<bool>;

    /// Free text, re-asked until `validate` accepts it
    fn text(&self, label: &str, default: Option<&str>, validate: Option<Validator>)
        -> Result<String>;

    /// Hidden input, re-asked until `validate` accepts it
    fn password(&self, label: &str, validate: Option<Validator>) -> Result<String>;

    /// Free text with suggestions computed from what was typed
    fn suggest(&self, label: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String>;
}

/// Reject empty input
pub fn required(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some("Required.".to_string())
    } else {
        None
    }
}
