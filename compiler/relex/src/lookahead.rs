//! Buffering base tokens so they can be reclassified before emission.
//!
//! A [`LookAheadLexer`] calls its [`LookAhead`] hook whenever its queue
//! drains. The hook drives the base lexer forward and pushes any number of
//! `(type, end)` pairs onto the [`TokenQueue`]; it may rewrite the type of
//! anything still queued once later tokens reveal what an earlier one was.
//! The adapter emits queued tokens one at a time.
//!
//! # State
//!
//! The reported state packs the base state at the start of the current
//! batch (low 16 bits) with the distance from that batch start to the
//! current token (the next 14 bits). Restarting from it re-runs the hook at
//! the batch start and skips forward, reproducing the same queue.
//!
//! Resumable states stay below `1 << 30`, so a [`LayeredLexer`] can wrap
//! this lexer. A base state wider than 16 bits, or a batch longer than
//! the delta field, is reported with a flag bit instead. Scanning goes
//! on normally; only [`Lexer::start`] rejects such a state.
//!
//! [`LayeredLexer`]: crate::LayeredLexer

use std::collections::VecDeque;

use relex_core::{Lexer, LexerPosition, SourceBuffer, TokenType};

const BASE_STATE_BITS: u32 = 16;
const BASE_STATE_MASK: u32 = (1 << BASE_STATE_BITS) - 1;
const DELTA_MASK: u32 = (1 << 14) - 1;

/// State reported for tokens a [`LookAheadLexer`] cannot be restarted at.
const UNRESUMABLE: u32 = 1 << 31;

/// Tokens resolved by a [`LookAhead`] hook but not yet emitted.
///
/// Types and end offsets are kept in parallel queues. Each token starts
/// where the previous one ended.
#[derive(Clone, Debug, Default)]
pub struct TokenQueue {
    types: VecDeque<TokenType>,
    ends: VecDeque<u32>,
}

impl TokenQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: VecDeque::with_capacity(capacity),
            ends: VecDeque::with_capacity(capacity),
        }
    }

    /// Queue a token ending at `end`.
    pub fn add_token_at(&mut self, token_type: TokenType, end: u32) {
        self.types.push_back(token_type);
        self.ends.push_back(end);
    }

    /// Queue a token ending where the base lexer's current token ends.
    pub fn add_token<L: Lexer + ?Sized>(&mut self, base: &L, token_type: TokenType) {
        self.add_token_at(token_type, base.token_end());
    }

    /// Queue the base lexer's current token unchanged and advance it.
    pub fn advance_lexer<L: Lexer + ?Sized>(&mut self, base: &mut L) {
        if let Some(token_type) = base.token_type() {
            self.advance_as(base, token_type);
        }
    }

    /// Queue the base lexer's current token as `token_type` and advance it.
    ///
    /// Does nothing once the base is exhausted.
    pub fn advance_as<L: Lexer + ?Sized>(&mut self, base: &mut L, token_type: TokenType) {
        if base.token_type().is_some() {
            self.add_token(base, token_type);
            base.advance();
        }
    }

    /// Rewrite the type of the queued token at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= cache_size()`.
    pub fn replace_cached_type(&mut self, index: usize, token_type: TokenType) {
        self.types[index] = token_type;
    }

    pub fn cache_size(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type and end offset of the queued token at `index`.
    pub fn get(&self, index: usize) -> Option<(TokenType, u32)> {
        Some((*self.types.get(index)?, *self.ends.get(index)?))
    }

    fn front(&self) -> Option<(TokenType, u32)> {
        self.get(0)
    }

    fn pop_front(&mut self) -> Option<u32> {
        self.types.pop_front();
        self.ends.pop_front()
    }

    fn clear(&mut self) {
        self.types.clear();
        self.ends.clear();
    }
}

/// Hook filling a [`TokenQueue`] from the base lexer.
pub trait LookAhead {
    /// Called with an empty queue. Push at least one token unless `base` is
    /// exhausted; an empty result forwards one base token.
    fn look_ahead<L: Lexer + ?Sized>(&mut self, base: &mut L, queue: &mut TokenQueue) {
        queue.advance_lexer(base);
    }
}

/// Forwards base tokens unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardAll;

impl LookAhead for ForwardAll {}

/// A [`Lexer`] that emits tokens buffered by a [`LookAhead`] hook.
pub struct LookAheadLexer<L, H = ForwardAll> {
    base: L,
    hook: H,
    queue: TokenQueue,
    token_start: u32,
    /// Base offset and state when the queue was last filled.
    last_offset: u32,
    last_state: u32,
}

impl<L: Lexer> LookAheadLexer<L, ForwardAll> {
    pub fn new(base: L, capacity: usize) -> Self {
        Self::with_hook(base, ForwardAll, capacity)
    }
}

impl<L: Lexer, H: LookAhead> LookAheadLexer<L, H> {
    pub fn with_hook(base: L, hook: H, capacity: usize) -> Self {
        Self {
            base,
            hook,
            queue: TokenQueue::with_capacity(capacity),
            token_start: 0,
            last_offset: 0,
            last_state: 0,
        }
    }

    pub fn base(&self) -> &L {
        &self.base
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Tokens queued, including the current one.
    pub fn queue(&self) -> &TokenQueue {
        &self.queue
    }

    /// Whether [`Lexer::restore`] accepts `position`.
    pub fn can_restore(&self, position: &LexerPosition) -> bool {
        position.state() & UNRESUMABLE == 0
    }

    fn look_ahead(&mut self) {
        self.last_offset = self.base.token_start();
        self.last_state = self.base.state();
        self.token_start = self.last_offset;
        self.hook.look_ahead(&mut self.base, &mut self.queue);
        if self.queue.is_empty() {
            self.queue.advance_lexer(&mut self.base);
        }
    }
}

impl<L: Lexer, H: LookAhead> Lexer for LookAheadLexer<L, H> {
    /// # Panics
    ///
    /// Panics if `initial_state` carries the unresumable flag, or encodes a batch
    /// start before offset 0.
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        assert!(
            initial_state & UNRESUMABLE == 0,
            "cannot resume a lookahead lexer from an unresumable state"
        );
        let delta = (initial_state >> BASE_STATE_BITS) & DELTA_MASK;
        let Some(batch_start) = start_offset.checked_sub(delta) else {
            panic!("lookahead state {initial_state:#x} points before offset 0");
        };
        self.base.start(
            buffer,
            batch_start,
            end_offset,
            initial_state & BASE_STATE_MASK,
        );
        self.queue.clear();
        self.look_ahead();
        while self.token_type().is_some() && self.token_start < start_offset {
            self.advance();
        }
    }

    fn advance(&mut self) {
        if let Some(end) = self.queue.pop_front() {
            self.token_start = end;
        }
        if self.queue.is_empty() {
            self.look_ahead();
        }
    }

    fn token_type(&self) -> Option<TokenType> {
        self.queue.front().map(|(token_type, _)| token_type)
    }

    fn token_start(&self) -> u32 {
        self.token_start
    }

    fn token_end(&self) -> u32 {
        self.queue.front().map_or(self.token_start, |(_, end)| end)
    }

    fn state(&self) -> u32 {
        let delta = self.token_start - self.last_offset;
        if self.last_state > BASE_STATE_MASK || delta > DELTA_MASK {
            return UNRESUMABLE;
        }
        self.last_state | (delta << BASE_STATE_BITS)
    }

    fn buffer(&self) -> &SourceBuffer {
        self.base.buffer()
    }

    fn buffer_end(&self) -> u32 {
        self.base.buffer_end()
    }
}
