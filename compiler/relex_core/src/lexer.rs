//! The token contract every scanner implements.
//!
//! A [`Lexer`] is a reusable, mutable cursor over a [`SourceBuffer`]:
//! [`start`](Lexer::start) resets it onto the first token of a range and
//! [`advance`](Lexer::advance) moves it forward one token. The state a lexer
//! reports at a token boundary, fed back into `start` at the same offset,
//! must reproduce the same token sequence. That property is what makes
//! incremental re-lexing correct.
//!
//! # Positions
//!
//! [`LexerPosition`] is the resumable snapshot callers keep across edits.
//! For most scanners it is just `(token_start, state)`. Composites whose
//! effective state is richer than one integer attach a [`PendingToken`]
//! holding their delegate's nested position.

use crate::{SourceBuffer, TokenInfo, TokenType};

/// A composite's buffered token plus its delegate's position.
///
/// The owning [`LexerPosition`] carries the pending token's start offset
/// and state; this record adds what cannot be recomputed from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingToken {
    /// Type of the token the composite had resolved but not yet emitted.
    pub token_type: Option<TokenType>,
    /// Where the delegate lexer stood when the snapshot was taken.
    pub delegate: LexerPosition,
}

/// A resumable point in a token stream, always taken at a token boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerPosition {
    offset: u32,
    state: u32,
    pending: Option<Box<PendingToken>>,
}

impl LexerPosition {
    /// A plain `(offset, state)` position.
    pub fn new(offset: u32, state: u32) -> Self {
        Self {
            offset,
            state,
            pending: None,
        }
    }

    /// A position that also records a composite's pending token.
    pub fn with_pending(offset: u32, state: u32, pending: PendingToken) -> Self {
        Self {
            offset,
            state,
            pending: Some(Box::new(pending)),
        }
    }

    /// Token start offset this position was taken at.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Lexer state at [`offset()`](Self::offset).
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Composite-specific detail, if any.
    pub fn pending(&self) -> Option<&PendingToken> {
        self.pending.as_deref()
    }
}

/// The token contract.
///
/// # Contract
///
/// - After `start`, the lexer sits on the first token of the range, or on
///   no token if the range is empty.
/// - `advance` requires a current token (`token_type()` is `Some`).
/// - `state` is stable between calls to `advance`.
/// - `restore(current_position())` reproduces the stream from that point,
///   provided the buffer is unchanged from the position's offset onward.
///
/// A lexer instance is a single-threaded cursor. Separate scans need
/// separate instances, even over the same buffer.
pub trait Lexer {
    /// Reset onto `[start_offset, end_offset)` of `buffer`.
    ///
    /// `initial_state` must be `0` or a value this lexer configuration
    /// reported from [`state()`](Self::state).
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32);

    /// Move to the next token.
    fn advance(&mut self);

    /// Type of the current token, `None` once the range is exhausted.
    fn token_type(&self) -> Option<TokenType>;

    fn token_start(&self) -> u32;

    fn token_end(&self) -> u32;

    /// Opaque state at the start of the current token.
    fn state(&self) -> u32;

    /// The buffer passed to the last `start`.
    fn buffer(&self) -> &SourceBuffer;

    /// End offset passed to the last `start`.
    fn buffer_end(&self) -> u32;

    /// Snapshot the current token boundary.
    fn current_position(&self) -> LexerPosition {
        LexerPosition::new(self.token_start(), self.state())
    }

    /// Resume from a snapshot taken by [`current_position()`](Self::current_position).
    fn restore(&mut self, position: &LexerPosition) {
        let buffer = self.buffer().clone();
        let end = self.buffer_end();
        self.start(buffer, position.offset(), end, position.state());
    }

    /// Start over the whole buffer from state `0`.
    fn start_all(&mut self, buffer: SourceBuffer) {
        let end = buffer.len();
        self.start(buffer, 0, end, 0);
    }

    /// Text of the current token.
    fn token_text(&self) -> &str {
        self.buffer().slice(self.token_start(), self.token_end())
    }
}

impl<L: Lexer + ?Sized> Lexer for Box<L> {
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        (**self).start(buffer, start_offset, end_offset, initial_state);
    }

    fn advance(&mut self) {
        (**self).advance();
    }

    fn token_type(&self) -> Option<TokenType> {
        (**self).token_type()
    }

    fn token_start(&self) -> u32 {
        (**self).token_start()
    }

    fn token_end(&self) -> u32 {
        (**self).token_end()
    }

    fn state(&self) -> u32 {
        (**self).state()
    }

    fn buffer(&self) -> &SourceBuffer {
        (**self).buffer()
    }

    fn buffer_end(&self) -> u32 {
        (**self).buffer_end()
    }

    fn current_position(&self) -> LexerPosition {
        (**self).current_position()
    }

    fn restore(&mut self, position: &LexerPosition) {
        (**self).restore(position);
    }
}

impl<L: Lexer + ?Sized> Lexer for &mut L {
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        (**self).start(buffer, start_offset, end_offset, initial_state);
    }

    fn advance(&mut self) {
        (**self).advance();
    }

    fn token_type(&self) -> Option<TokenType> {
        (**self).token_type()
    }

    fn token_start(&self) -> u32 {
        (**self).token_start()
    }

    fn token_end(&self) -> u32 {
        (**self).token_end()
    }

    fn state(&self) -> u32 {
        (**self).state()
    }

    fn buffer(&self) -> &SourceBuffer {
        (**self).buffer()
    }

    fn buffer_end(&self) -> u32 {
        (**self).buffer_end()
    }

    fn current_position(&self) -> LexerPosition {
        (**self).current_position()
    }

    fn restore(&mut self, position: &LexerPosition) {
        (**self).restore(position);
    }
}

/// Drive `lexer` from its current token to exhaustion.
///
/// The lexer must already be started.
pub fn collect_tokens<L: Lexer + ?Sized>(lexer: &mut L) -> Vec<TokenInfo> {
    let mut tokens = Vec::new();
    while let Some(token_type) = lexer.token_type() {
        tokens.push(TokenInfo::new(
            lexer.token_start(),
            lexer.token_end(),
            token_type,
            lexer.state(),
        ));
        lexer.advance();
    }
    tokens
}
