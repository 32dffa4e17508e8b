//! Materialized, indexable token streams.
//!
//! A [`TokenList`] stores a finished scan as parallel arrays of start
//! offsets, end offsets and types, indexed `0..len()`. It never changes
//! after construction, so it can be shared across threads.
//!
//! Navigation helpers skip trivia and match braces backwards.
//! [`TokenList::as_lexer`] replays the list through the token contract;
//! the replay's state is the token index, so it is only meaningful over the
//! exact text the list was built from.

use relex_core::{collect_tokens, Lexer, SourceBuffer, TokenInfo, TokenSet, TokenType};

/// An immutable scan result with random access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    text: SourceBuffer,
    /// Parallel arrays, one entry per token.
    starts: Vec<u32>,
    ends: Vec<u32>,
    types: Vec<TokenType>,
}

impl TokenList {
    /// Scan all of `text` with `lexer`.
    pub fn tokenize<L: Lexer + ?Sized>(text: SourceBuffer, lexer: &mut L) -> Self {
        lexer.start_all(text);
        Self::from_lexer(lexer)
    }

    /// Drain an already started `lexer`.
    pub fn from_lexer<L: Lexer + ?Sized>(lexer: &mut L) -> Self {
        let text = lexer.buffer().clone();
        Self::from_tokens(text, collect_tokens(lexer))
    }

    /// Build from a pre-scanned sequence over `text`.
    pub fn from_tokens(text: SourceBuffer, tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        let tokens = tokens.into_iter();
        let capacity = tokens.size_hint().0;
        let mut list = TokenList {
            text,
            starts: Vec::with_capacity(capacity),
            ends: Vec::with_capacity(capacity),
            types: Vec::with_capacity(capacity),
        };
        for token in tokens {
            list.starts.push(token.start);
            list.ends.push(token.end);
            list.types.push(token.token_type);
        }
        list
    }

    #[inline]
    pub fn token_count(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.token_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn token_start(&self, index: usize) -> u32 {
        self.starts[index]
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn token_end(&self, index: usize) -> u32 {
        self.ends[index]
    }

    /// Type at `index`, `None` outside the list.
    #[inline]
    pub fn token_type(&self, index: usize) -> Option<TokenType> {
        self.types.get(index).copied()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn token_text(&self, index: usize) -> &str {
        self.text.slice(self.starts[index], self.ends[index])
    }

    /// The text the list was built from.
    #[inline]
    pub fn text(&self) -> &SourceBuffer {
        &self.text
    }

    /// Iterate over the tokens. Each token's state is its index.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "token counts are bounded by u32 buffer offsets"
    )]
    pub fn tokens(&self) -> impl Iterator<Item = TokenInfo> + '_ {
        (0..self.len()).map(|i| {
            TokenInfo::new(self.starts[i], self.ends[i], self.types[i], i as u32)
        })
    }

    #[inline]
    pub fn has_type(&self, index: usize, token_type: TokenType) -> bool {
        self.token_type(index) == Some(token_type)
    }

    pub fn has_any_type(&self, index: usize, types: &[TokenType]) -> bool {
        self.token_type(index).is_some_and(|ty| types.contains(&ty))
    }

    #[inline]
    pub fn has_type_in(&self, index: usize, set: &TokenSet) -> bool {
        set.contains_opt(self.token_type(index))
    }

    /// Walk backwards from `index` over tokens in `skip`.
    ///
    /// Returns the first index not in `skip`, or `None` if the walk ran past
    /// the first token.
    pub fn back_while(&self, index: usize, skip: &TokenSet) -> Option<usize> {
        let mut index = index;
        while self.has_type_in(index, skip) {
            index = index.checked_sub(1)?;
        }
        Some(index)
    }

    /// Walk forwards from `index` over tokens in `skip`.
    ///
    /// Returns the first index not in `skip`, which is `len()` if the walk
    /// ran off the end.
    pub fn forward_while(&self, index: usize, skip: &TokenSet) -> usize {
        let mut index = index;
        while self.has_type_in(index, skip) {
            index += 1;
        }
        index
    }

    /// Skip backwards over a bracketed group ending at `index`.
    ///
    /// If the token at `index` is `closing`, walks back to its matching
    /// `opening` and returns the index just before it. Otherwise returns
    /// the index before `index`. `None` means nothing precedes the result,
    /// or the brackets were unbalanced.
    pub fn back_with_brace_matching(
        &self,
        index: usize,
        opening: TokenType,
        closing: TokenType,
    ) -> Option<usize> {
        let mut index = index;
        if self.has_type(index, closing) {
            let mut nesting = 1_usize;
            while nesting > 0 {
                index = index.checked_sub(1)?;
                match self.token_type(index) {
                    Some(ty) if ty == closing => nesting += 1,
                    Some(ty) if ty == opening => nesting -= 1,
                    _ => {}
                }
            }
        }
        index.checked_sub(1)
    }

    /// Replay the list through the token contract.
    pub fn as_lexer(&self) -> TokenListLexer<'_> {
        TokenListLexer {
            list: self,
            index: 0,
            buffer_end: 0,
        }
    }
}

/// [`Lexer`] view over a [`TokenList`]. Its state is the token index.
#[derive(Clone, Debug)]
pub struct TokenListLexer<'a> {
    list: &'a TokenList,
    index: usize,
    buffer_end: u32,
}

impl TokenListLexer<'_> {
    /// Index of the current token.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Lexer for TokenListLexer<'_> {
    /// # Panics
    ///
    /// Panics if `buffer` is not the text the list was built from.
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        assert!(
            buffer == self.list.text,
            "a token list can only replay the text it was built from"
        );
        let hint = initial_state as usize;
        self.index = if hint < self.list.len() && self.list.starts[hint] == start_offset {
            hint
        } else {
            self.list.starts.partition_point(|&start| start < start_offset)
        };
        self.buffer_end = end_offset;
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn token_type(&self) -> Option<TokenType> {
        match self.list.starts.get(self.index) {
            Some(&start) if start < self.buffer_end => self.list.token_type(self.index),
            _ => None,
        }
    }

    fn token_start(&self) -> u32 {
        if self.token_type().is_some() {
            self.list.starts[self.index]
        } else {
            self.buffer_end
        }
    }

    fn token_end(&self) -> u32 {
        if self.token_type().is_some() {
            self.list.ends[self.index]
        } else {
            self.buffer_end
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "token counts are bounded by u32 buffer offsets"
    )]
    fn state(&self) -> u32 {
        self.index as u32
    }

    fn buffer(&self) -> &SourceBuffer {
        &self.list.text
    }

    fn buffer_end(&self) -> u32 {
        self.buffer_end
    }
}
