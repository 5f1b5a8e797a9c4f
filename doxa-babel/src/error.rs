//! Error types for parsing, rendering and format operations

use crate::location::Location;
use crate::macros::MacroError;
use thiserror::Error;

/// Failures raised by a sink while consuming events.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The same anchor name was emitted twice in one document
    #[error("{location}Anchor name \"{name}\" used more than once")]
    DuplicateAnchor { name: String, location: Location },
    /// An end event did not match the innermost open begin event
    #[error("Unbalanced event: {0}")]
    Unbalanced(String),
    /// A precondition on the event payload was violated
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors raised while parsing a source document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed source structure (unterminated markup, empty table, ...)
    #[error("{location}{message}")]
    Syntax { message: String, location: Location },
    /// A block showed up where the grammar requires another kind
    #[error("{location}Expected block type {expected} but found {found}")]
    UnexpectedBlock {
        expected: String,
        found: String,
        location: Location,
    },
    #[error("{location}{source}")]
    Macro {
        source: MacroError,
        location: Location,
    },
    #[error("{location}I/O error: {source}")]
    Io {
        source: std::io::Error,
        location: Location,
    },
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        ParseError::Syntax {
            message: message.into(),
            location,
        }
    }

    /// The source location the error was raised at, when known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::UnexpectedBlock { location, .. }
            | ParseError::Macro { location, .. }
            | ParseError::Io { location, .. } => Some(location),
            ParseError::Sink(SinkError::DuplicateAnchor { location, .. }) => Some(location),
            _ => None,
        }
    }
}

/// Errors that can occur during format operations
#[derive(Debug, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Error reported by a sink during serialization
    #[error("Serialization error: {0}")]
    Sink(#[from] SinkError),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_location_prefix() {
        let err = ParseError::syntax(
            "Unterminated bold",
            Location::new(Some("doc.apt"), Some(7), None),
        );
        assert_eq!(err.to_string(), "doc.apt, line 7: Unterminated bold");
    }

    #[test]
    fn duplicate_anchor_message() {
        let err = SinkError::DuplicateAnchor {
            name: "intro".to_string(),
            location: Location::at_line(None, 2),
        };
        assert_eq!(
            err.to_string(),
            "line 2: Anchor name \"intro\" used more than once"
        );
    }

    #[test]
    fn format_error_wraps_parse_error() {
        let err: FormatError = ParseError::syntax("boom", Location::default()).into();
        assert_eq!(err.to_string(), "Parse error: boom");
    }
}
