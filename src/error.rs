use serde::{Deserialize, Serialize};

/// The category of a failure. Every failure is fatal for the run, the kind only tells
/// whether the input content was malformed or the environment refused an operation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed guide content, such as a table row not matching its header.
    Content,
    /// A font could not be found, read or parsed.
    Font,
    /// Reading or writing a file failed.
    Io,
    /// The layout or the PDF serialization failed.
    Render,
}

/// A struct that represents an error with a context and possibly the propagated source error.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContextError {
    pub kind: ErrorKind,
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error.to_string()),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new rendering `ContextError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ContextError {
        ContextError {
            kind: ErrorKind::Render,
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new rendering `ContextError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ContextError {
        ContextError {
            kind: ErrorKind::Render,
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }

    /// Create a new `ContextError` signaling that the guide content is malformed.
    pub fn content<S: Into<String>>(context: S) -> ContextError {
        ContextError::with_context(context).of_kind(ErrorKind::Content)
    }

    /// Create a new `ContextError` for a failed file operation, keeping the I/O error as source.
    pub fn io<S: Into<String>>(context: S, error: &std::io::Error) -> ContextError {
        ContextError::with_error(context, error).of_kind(ErrorKind::Io)
    }

    /// Replace the kind of the error.
    pub fn of_kind(mut self, kind: ErrorKind) -> ContextError {
        self.kind = kind;
        self
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}
