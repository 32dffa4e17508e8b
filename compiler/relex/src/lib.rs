//! Composable incremental lexers.
//!
//! Every type here implements the [`Lexer`] token contract from
//! `relex_core` and wraps exactly one delegate, so adapters stack by
//! composition:
//!
//! - [`FlexAdapter`] turns a [`GeneratedScanner`] into a [`Lexer`] and
//!   contains scanner faults.
//! - [`MergingLexer`] coalesces consecutive base tokens.
//! - [`LayeredLexer`] re-scans selected base tokens with secondary lexers.
//! - [`LookAheadLexer`] buffers base tokens so an implementation can peek
//!   and reclassify before committing them.
//! - [`TokenList`] materializes a finished scan for random access.
//!
//! Lexers are single-threaded cursors. A finished [`TokenList`] is
//! immutable and can be shared freely.

mod error;
mod flex;
mod layered;
mod lookahead;
mod merging;
mod token_list;

#[cfg(test)]
mod test_support;

pub use error::{LayerError, ScanFault};
pub use flex::{FlexAdapter, GeneratedScanner};
pub use layered::{LayeredConfig, LayeredLexer};
pub use lookahead::{ForwardAll, LookAhead, LookAheadLexer, TokenQueue};
pub use merging::{MergeFunction, MergeTokenSet, MergingLexer};
pub use token_list::{TokenList, TokenListLexer};

pub use relex_core::{
    collect_tokens, Lexer, LexerPosition, PendingToken, SourceBuffer, StringLiteralConfig,
    StringLiteralLexer, TokenInfo, TokenSet, TokenType,
};
