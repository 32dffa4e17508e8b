//! Token contract and leaf scanners for incremental lexing.
//!
//! This crate is standalone: it defines the [`Lexer`] trait every scanner
//! implements, the shared [`SourceBuffer`] scanners read from, the token
//! vocabulary ([`TokenType`], [`TokenSet`], [`TokenInfo`]) and the
//! [`StringLiteralLexer`] used to re-scan quoted literals for escapes.
//!
//! Composition (merging, layering, look-ahead, token lists) lives in the
//! `relex` crate, which builds on the contract defined here.

mod cursor;
mod lexer;
mod source_buffer;
mod string_literal;
mod token;

pub use cursor::Cursor;
pub use lexer::{collect_tokens, Lexer, LexerPosition, PendingToken};
pub use source_buffer::SourceBuffer;
pub use string_literal::{StringLiteralConfig, StringLiteralLexer, DEFAULT_VALID_ESCAPES};
pub use token::{TokenInfo, TokenSet, TokenType};
