//! Interaction adapter trait for host-agnostic user choices.
//!
//! The engine never talks to a terminal or an editor directly. Whenever a
//! class name has more than one candidate module, it suspends on
//! [`InteractionAdapter::ask_select`] and resumes with the typed answer:
//! a chosen index, or [`InteractionError::Cancelled`].
//!
//! - The CLI host provides a terminal adapter (in the `amdeps` crate)
//! - [`ScriptedAdapter`] replays canned answers, for non-interactive runs and tests
//!
//! The trait is object-safe, allowing it to be used as `&dyn InteractionAdapter`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

/// Error type for interaction operations
#[derive(Error, Debug)]
pub enum InteractionError {
    /// User cancelled the choice (e.g., pressed Escape or entered nothing)
    #[error("operation cancelled by user")]
    Cancelled,

    /// IO error during interaction
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl InteractionError {
    /// Create a new IO error
    pub fn io(err: impl fmt::Display) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<std::io::Error> for InteractionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for interaction operations
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Trait for abstracting user interaction across hosts.
pub trait InteractionAdapter: Send + Sync {
    /// Ask the user to select one option from a list
    ///
    /// # Returns
    /// The index of the selected option (0-based)
    ///
    /// # Errors
    /// Returns `InteractionError::Cancelled` if user cancels, or
    /// `InvalidInput` if options is empty
    fn ask_select(&self, prompt: &str, options: &[&str]) -> InteractionResult<usize>;

    /// Print an informational message
    fn print_info(&self, message: &str);

    /// Print a warning message
    fn print_warning(&self, message: &str);

    /// Print an error message
    fn print_error(&self, message: &str);
}

// ============================================================================
// Scripted Adapter
// ============================================================================

/// Adapter that answers selections from a fixed script.
///
/// Each `Some(index)` answers one `ask_select`; `None` cancels it. Once the
/// script runs dry every further selection is cancelled. Prompts and messages
/// are recorded so callers can inspect what the engine asked for.
#[derive(Debug, Default)]
pub struct ScriptedAdapter {
    answers: Mutex<VecDeque<Option<usize>>>,
    prompts: Mutex<Vec<Vec<String>>>,
    messages: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    /// Create an adapter that replays `answers` in order.
    pub fn new(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// An adapter with no answers: every selection is cancelled.
    pub fn cancelling() -> Self {
        Self::default()
    }

    /// Option lists presented so far, one entry per `ask_select` call.
    pub fn prompts(&self) -> Vec<Vec<String>> {
        self.prompts
            .lock()
            .map(|p| p.to_vec())
            .unwrap_or_default()
    }

    /// Messages printed so far, prefixed by their level.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.to_vec())
            .unwrap_or_default()
    }

    fn record(&self, level: &str, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(format!("{}: {}", level, message));
        }
    }
}

impl InteractionAdapter for ScriptedAdapter {
    fn ask_select(&self, _prompt: &str, options: &[&str]) -> InteractionResult<usize> {
        if options.is_empty() {
            return Err(InteractionError::InvalidInput(
                "options cannot be empty".to_string(),
            ));
        }
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(options.iter().map(|o| o.to_string()).collect());
        }
        let answer = self
            .answers
            .lock()
            .map_err(|_| InteractionError::io("scripted answers poisoned"))?
            .pop_front()
            .flatten();
        match answer {
            Some(index) if index < options.len() => Ok(index),
            Some(index) => Err(InteractionError::InvalidInput(format!(
                "choice {} out of range for {} options",
                index,
                options.len()
            ))),
            None => Err(InteractionError::Cancelled),
        }
    }

    fn print_info(&self, message: &str) {
        self.record("info", message);
    }

    fn print_warning(&self, message: &str) {
        self.record("warning", message);
    }

    fn print_error(&self, message: &str) {
        self.record("error", message);
    }
}
