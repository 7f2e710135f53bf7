//! Error types for header grammar parsing.

use thiserror::Error;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing structured header values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The grammar was violated at a specific byte offset.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A comment was opened but never closed.
    #[error("unterminated comment starting at position {position}")]
    UnterminatedComment {
        /// Byte position of the opening parenthesis.
        position: usize,
    },

    /// A quoted string was opened but never closed.
    #[error("unterminated quoted string starting at position {position}")]
    UnterminatedQuotedString {
        /// Byte position of the opening quote.
        position: usize,
    },

    /// A domain literal was opened but never closed.
    #[error("unterminated domain literal starting at position {position}")]
    UnterminatedDomainLiteral {
        /// Byte position of the opening bracket.
        position: usize,
    },

    /// A domain was malformed or missing.
    #[error("invalid domain at position {position}: {message}")]
    InvalidDomain {
        /// Byte position where the domain was expected.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// The input was empty or contained only whitespace.
    #[error("input is empty or contains only whitespace")]
    EmptyInput,
}

impl Error {
    /// Returns the byte offset of the failure, when the error is positional.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Syntax { position, .. }
            | Self::UnterminatedComment { position }
            | Self::UnterminatedQuotedString { position }
            | Self::UnterminatedDomainLiteral { position }
            | Self::InvalidDomain { position, .. } => Some(*position),
            Self::EmptyInput => None,
        }
    }
}
