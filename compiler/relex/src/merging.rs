//! Coalescing consecutive base tokens.
//!
//! [`MergingLexer`] asks a [`MergeFunction`] how far each token extends.
//! The merge function sees the base lexer already advanced past the first
//! token and consumes whatever it wants to fold in, so the adapter's token
//! ends where the base lexer's current token starts. The adapter is always
//! one base token ahead, which is why its positions carry the base
//! lexer's nested position.

use relex_core::{Lexer, LexerPosition, PendingToken, SourceBuffer, TokenSet, TokenType};

/// Policy deciding how consecutive base tokens coalesce.
pub trait MergeFunction {
    /// `base` sits on the token after the one of type `token_type`.
    ///
    /// Advance `base` past every token to fold in, then return the type of
    /// the merged token.
    fn merge(&self, token_type: TokenType, base: &mut dyn Lexer) -> TokenType;
}

impl<F> MergeFunction for F
where
    F: Fn(TokenType, &mut dyn Lexer) -> TokenType,
{
    fn merge(&self, token_type: TokenType, base: &mut dyn Lexer) -> TokenType {
        self(token_type, base)
    }
}

/// Merges runs of one type when that type is in the set.
#[derive(Clone, Debug, Default)]
pub struct MergeTokenSet {
    tokens: TokenSet,
}

impl MergeTokenSet {
    pub fn new(tokens: TokenSet) -> Self {
        Self { tokens }
    }
}

impl MergeFunction for MergeTokenSet {
    fn merge(&self, token_type: TokenType, base: &mut dyn Lexer) -> TokenType {
        if self.tokens.contains(token_type) {
            while base.token_type() == Some(token_type) {
                base.advance();
            }
        }
        token_type
    }
}

/// A [`Lexer`] that coalesces base tokens according to `M`.
pub struct MergingLexer<L, M = MergeTokenSet> {
    base: L,
    merge: M,
    token_type: Option<TokenType>,
    token_start: u32,
    state: u32,
}

impl<L: Lexer> MergingLexer<L, MergeTokenSet> {
    /// Merge runs of identical types drawn from `tokens`.
    pub fn with_token_set(base: L, tokens: TokenSet) -> Self {
        Self::new(base, MergeTokenSet::new(tokens))
    }
}

impl<L: Lexer, M: MergeFunction> MergingLexer<L, M> {
    pub fn new(base: L, merge: M) -> Self {
        Self {
            base,
            merge,
            token_type: None,
            token_start: 0,
            state: 0,
        }
    }

    pub fn base(&self) -> &L {
        &self.base
    }

    pub fn into_base(self) -> L {
        self.base
    }

    fn locate_token(&mut self) {
        self.token_start = self.base.token_start();
        self.state = self.base.state();
        self.token_type = match self.base.token_type() {
            Some(first) => {
                self.base.advance();
                Some(self.merge.merge(first, &mut self.base))
            }
            None => None,
        };
    }
}

impl<L: Lexer, M: MergeFunction> Lexer for MergingLexer<L, M> {
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        self.base
            .start(buffer, start_offset, end_offset, initial_state);
        self.locate_token();
    }

    fn advance(&mut self) {
        self.locate_token();
    }

    fn token_type(&self) -> Option<TokenType> {
        self.token_type
    }

    fn token_start(&self) -> u32 {
        self.token_start
    }

    fn token_end(&self) -> u32 {
        self.base.token_start()
    }

    fn state(&self) -> u32 {
        self.state
    }

    fn buffer(&self) -> &SourceBuffer {
        self.base.buffer()
    }

    fn buffer_end(&self) -> u32 {
        self.base.buffer_end()
    }

    fn current_position(&self) -> LexerPosition {
        LexerPosition::with_pending(
            self.token_start,
            self.state,
            PendingToken {
                token_type: self.token_type,
                delegate: self.base.current_position(),
            },
        )
    }

    fn restore(&mut self, position: &LexerPosition) {
        match position.pending() {
            Some(pending) => {
                self.base.restore(&pending.delegate);
                self.token_type = pending.token_type;
                self.token_start = position.offset();
                self.state = position.state();
            }
            None => {
                let buffer = self.base.buffer().clone();
                let end = self.base.buffer_end();
                self.start(buffer, position.offset(), end, position.state());
            }
        }
    }
}

#[cfg(test)]
mod tests;
