//! Error types for the QueryGate store.

use crate::query::{LexerError, ParseError};
use std::fmt;

/// The main error type for store operations.
#[derive(Debug)]
pub enum Error {
    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// SQL text could not be tokenized or parsed
    Parse(ParseError),

    /// Referenced table does not exist
    UnknownTable(String),

    /// Referenced column does not exist in the table
    UnknownColumn(String),

    /// CREATE TABLE for a name that is already taken
    TableExists(String),

    /// NOT NULL, PRIMARY KEY or arity constraint failed
    ConstraintViolation(String),

    /// A literal could not be stored in the declared column type
    TypeMismatch {
        /// Column being written
        column: String,
        /// Declared column type
        expected: String,
        /// Value that was supplied
        found: String,
    },

    /// Input rejected before parsing (empty, oversized, bad identifier)
    InvalidInput(String),

    /// Invalid operation
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::UnknownTable(name) => write!(f, "no such table: {}", name),
            Error::UnknownColumn(name) => write!(f, "no such column: {}", name),
            Error::TableExists(name) => write!(f, "table {} already exists", name),
            Error::ConstraintViolation(msg) => write!(f, "Constraint failed: {}", msg),
            Error::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch for column {}: expected {}, found {}",
                column, expected, found
            ),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<LexerError> for Error {
    fn from(err: LexerError) -> Self {
        Error::Parse(ParseError::LexerError(err))
    }
}

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::UnknownTable("ORDERS".to_string()).to_string(),
            "no such table: ORDERS"
        );
        assert_eq!(
            Error::UnknownColumn("Fred".to_string()).to_string(),
            "no such column: Fred"
        );
    }

    #[test]
    fn test_parse_error_is_source() {
        use std::error::Error as _;

        let err: Error = LexerError::UnterminatedString.into();
        assert!(matches!(err, Error::Parse(ParseError::LexerError(_))));
        assert!(err.source().is_some());
    }
}
