use thiserror::Error;

use crate::document::Mark;

/// A position-annotated error raised while parsing or resolving conventions
///
/// `line` and `column` are 1-indexed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} - @{line}:{column}")]
pub struct ValidationError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Build from a parser position, shifting it to 1-indexed
    pub fn at(mark: Mark, message: impl Into<String>) -> Self {
        Self::new(mark.line + 1, mark.column + 1, message)
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
