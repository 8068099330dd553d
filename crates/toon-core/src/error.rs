//! Error types for TOON encoding and decoding operations.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during TOON encoding or decoding.
#[derive(Error, Debug)]
pub enum ToonError {
    /// The input string was not valid JSON (`encode_json` path).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input string was not valid TOON.
    ///
    /// `line` and `column` are 1-based; `offset` is the 0-based byte offset
    /// into the decoded text.
    #[error("TOON syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        offset: usize,
        message: String,
    },

    /// The value has no TOON representation (non-finite number, excessive nesting).
    #[error("value cannot be encoded as TOON: {0}")]
    Unencodable(String),

    /// Encoder or decoder options that cannot describe a TOON document.
    #[error("invalid TOON options: {0}")]
    InvalidOptions(String),
}

/// Coarse classification of a [`ToonError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unencodable,
    SyntaxError,
    InvalidJson,
    InvalidOptions,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unencodable => "Unencodable",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::InvalidJson => "InvalidJson",
            ErrorKind::InvalidOptions => "InvalidOptions",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToonError::Json(_) => ErrorKind::InvalidJson,
            ToonError::Syntax { .. } => ErrorKind::SyntaxError,
            ToonError::Unencodable(_) => ErrorKind::Unencodable,
            ToonError::InvalidOptions(_) => ErrorKind::InvalidOptions,
        }
    }

    /// `(line, column)` of a syntax error, 1-based.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ToonError::Syntax { line, column, .. } => Some((*line, *column)),
            ToonError::Json(err) if err.line() > 0 => Some((err.line(), err.column())),
            _ => None,
        }
    }

    /// The bare message, without the position prefix added by `Display`.
    pub fn detail(&self) -> String {
        match self {
            ToonError::Syntax { message, .. } => message.clone(),
            ToonError::Unencodable(message) | ToonError::InvalidOptions(message) => {
                message.clone()
            }
            ToonError::Json(err) => err.to_string(),
        }
    }
}

/// Convenience alias used throughout toon-core.
pub type Result<T> = std::result::Result<T, ToonError>;
