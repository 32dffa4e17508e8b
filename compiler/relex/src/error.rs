//! Error types for lexer composition.
//!
//! Lexical problems (bad escapes, unterminated literals) are never errors:
//! they are token types. These types cover configuration mistakes and
//! malfunctioning scanners.

use relex_core::TokenType;
use thiserror::Error;

/// Invalid layer registration on a [`LayeredLexer`](crate::LayeredLexer).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayerError {
    /// Two layers claimed the same trigger token type.
    #[error("a layer is already registered for token type `{0}`")]
    DuplicateTrigger(TokenType),
}

/// An internal failure inside a generated scanner.
///
/// [`FlexAdapter`](crate::FlexAdapter) converts these into a terminal
/// `BAD_CHARACTER` token instead of propagating them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScanFault {
    /// The scanner reported a failure.
    #[error("scanner failed at offset {offset}: {message}")]
    Internal { offset: u32, message: String },
    /// The scanner panicked while computing the next token.
    #[error("scanner panicked at offset {offset}: {message}")]
    Panicked { offset: u32, message: String },
    /// The scanner returned a token that does not move forward.
    #[error("scanner made no progress at offset {offset}")]
    NoProgress { offset: u32 },
}

impl ScanFault {
    pub fn internal(offset: u32, message: impl Into<String>) -> Self {
        ScanFault::Internal {
            offset,
            message: message.into(),
        }
    }

    /// Offset at which the failing token started.
    pub fn offset(&self) -> u32 {
        match self {
            ScanFault::Internal { offset, .. }
            | ScanFault::Panicked { offset, .. }
            | ScanFault::NoProgress { offset } => *offset,
        }
    }
}
