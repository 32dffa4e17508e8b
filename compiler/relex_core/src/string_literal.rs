//! Scanner that splits one quoted string literal into text and escapes.
//!
//! A base lexer usually produces a whole string literal as one token. The
//! [`StringLiteralLexer`] re-scans that range (typically as a layer) into
//! runs of ordinary text, carrying the literal's original token type, and
//! individual escape sequences.
//!
//! Scanning only finds token boundaries. Classification happens when the
//! token type is read, by re-inspecting the one or two bytes after the
//! backslash, so the same scan position serves look-ahead classification
//! without a second pass.
//!
//! Malformed escapes are not errors: they are reported as
//! [`TokenType::INVALID_CHARACTER_ESCAPE`] or
//! [`TokenType::INVALID_UNICODE_ESCAPE`] and the caller decides severity.

use crate::{Lexer, SourceBuffer, TokenType};

/// Single-letter escapes accepted by default.
pub const DEFAULT_VALID_ESCAPES: &str = "nrbtf'\"\\";

/// Behaviour knobs for a [`StringLiteralLexer`].
///
/// The set of valid single-letter escapes is data, not code: literal kinds
/// disagree on whether `\'` and `\"` are valid regardless of the active
/// quote, so each configuration states its own set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringLiteralConfig {
    /// Quote byte, or `None` when the scanned range has no surrounding quotes.
    quote: Option<u8>,
    /// Type emitted for ordinary text.
    original_token: TokenType,
    allow_octal: bool,
    allow_hex: bool,
    /// Accept `\` + newline and escaped leading/trailing space runs.
    escape_eol_or_framing_spaces: bool,
    allow_slash_zero: bool,
    valid_escapes: String,
    /// Classification of a lone `\` at the end of the range.
    dangling_backslash: TokenType,
}

impl StringLiteralConfig {
    /// Configuration for a literal delimited by `quote`.
    pub fn new(quote: u8, original_token: TokenType) -> Self {
        Self {
            quote: Some(quote),
            ..Self::unquoted(original_token)
        }
    }

    /// Configuration for a range without surrounding quotes.
    pub fn unquoted(original_token: TokenType) -> Self {
        Self {
            quote: None,
            original_token,
            allow_octal: false,
            allow_hex: false,
            escape_eol_or_framing_spaces: false,
            allow_slash_zero: false,
            valid_escapes: DEFAULT_VALID_ESCAPES.to_owned(),
            dangling_backslash: TokenType::INVALID_CHARACTER_ESCAPE,
        }
    }

    /// Accept 1-3 digit octal escapes (`\7`, `\12`, `\377`).
    #[must_use]
    pub fn with_octal(mut self, allow: bool) -> Self {
        self.allow_octal = allow;
        self
    }

    /// Accept two-digit hex escapes (`\x41`).
    #[must_use]
    pub fn with_hex(mut self, allow: bool) -> Self {
        self.allow_hex = allow;
        self
    }

    /// Accept an escaped end-of-line and escaped runs of framing spaces,
    /// as used by string continuation syntaxes.
    #[must_use]
    pub fn with_escaped_eol_or_framing_spaces(mut self, allow: bool) -> Self {
        self.escape_eol_or_framing_spaces = allow;
        self
    }

    /// Treat `\0` as valid even when octal escapes are disabled.
    #[must_use]
    pub fn with_slash_zero(mut self, allow: bool) -> Self {
        self.allow_slash_zero = allow;
        self
    }

    /// Replace the set of valid single-letter escapes.
    #[must_use]
    pub fn with_valid_escapes(mut self, escapes: &str) -> Self {
        escapes.clone_into(&mut self.valid_escapes);
        self
    }

    /// Add to the set of valid single-letter escapes.
    #[must_use]
    pub fn with_additional_escapes(mut self, escapes: &str) -> Self {
        self.valid_escapes.push_str(escapes);
        self
    }

    /// Classification for a lone `\` at the end of the range.
    #[must_use]
    pub fn with_dangling_backslash(mut self, token_type: TokenType) -> Self {
        self.dangling_backslash = token_type;
        self
    }

    pub fn quote(&self) -> Option<u8> {
        self.quote
    }

    pub fn original_token(&self) -> TokenType {
        self.original_token
    }

    fn is_valid_escape_letter(&self, byte: u8) -> bool {
        byte.is_ascii() && self.valid_escapes.as_bytes().contains(&byte)
    }
}

/// Where the scanner stands relative to the literal's quotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
enum ScanState {
    /// Nothing consumed yet; the next byte is the opening quote.
    BeforeFirstQuote = 0,
    AfterFirstQuote = 1,
    /// Closing quote consumed at the end of the range. Terminal.
    AfterLastQuote = 2,
}

/// Set in a reported state when some earlier token was not an escaped space.
const SEEN_TEXT: u32 = 1 << 2;
const SCAN_STATE_MASK: u32 = 0b11;

impl ScanState {
    fn from_raw(raw: u32) -> Self {
        match raw & SCAN_STATE_MASK {
            1 => ScanState::AfterFirstQuote,
            2 => ScanState::AfterLastQuote,
            _ => ScanState::BeforeFirstQuote,
        }
    }
}

/// Splits a string literal into text runs and escape sequences.
pub struct StringLiteralLexer {
    config: StringLiteralConfig,
    buffer: SourceBuffer,
    start: u32,
    end: u32,
    buffer_end: u32,
    /// State after locating the current token.
    state: ScanState,
    /// State at the start of the current token; this is what `state()` reports.
    last_state: ScanState,
    /// Every token before the current one was an escaped space.
    seen_escaped_spaces_only: bool,
}

impl StringLiteralLexer {
    pub fn new(config: StringLiteralConfig) -> Self {
        Self {
            config,
            buffer: SourceBuffer::empty(),
            start: 0,
            end: 0,
            buffer_end: 0,
            state: ScanState::BeforeFirstQuote,
            last_state: ScanState::BeforeFirstQuote,
            seen_escaped_spaces_only: true,
        }
    }

    pub fn config(&self) -> &StringLiteralConfig {
        &self.config
    }

    #[inline]
    fn byte(&self, at: u32) -> u8 {
        if at < self.buffer_end {
            self.buffer.byte_at(at)
        } else {
            0
        }
    }

    /// Find the end of the token starting at `start`, updating the scan state.
    fn locate_token(&mut self, start: u32) -> u32 {
        if start >= self.buffer_end {
            self.state = ScanState::AfterLastQuote;
        }
        if self.state == ScanState::AfterLastQuote {
            return start;
        }

        let mut cursor = self.buffer.cursor(start, self.buffer_end);
        if cursor.current() == b'\\' {
            cursor.advance();
            let next = cursor.current();
            if cursor.is_eof() || (next == b'\n' && !self.config.escape_eol_or_framing_spaces) {
                self.state = ScanState::AfterFirstQuote;
                return cursor.pos();
            }
            if self.config.allow_octal && is_octal_digit(next) {
                cursor.advance();
                if is_octal_digit(cursor.current()) {
                    cursor.advance();
                    if next <= b'3' && is_octal_digit(cursor.current()) {
                        cursor.advance();
                    }
                }
                return cursor.pos();
            }
            if self.config.allow_hex && next == b'x' {
                return self.locate_fixed_escape_end(cursor, start + 4);
            }
            if next == b'u' {
                return self.locate_fixed_escape_end(cursor, start + 6);
            }
            cursor.advance_char();
            return cursor.pos();
        }

        if self.state == ScanState::BeforeFirstQuote {
            // The opening quote never closes the literal.
            cursor.advance_char();
            self.state = ScanState::AfterFirstQuote;
        }

        let found = match self.config.quote {
            Some(quote) => cursor.skip_to_either(b'\\', quote),
            None => cursor.skip_to_either(b'\\', b'\\'),
        };
        if cursor.is_eof() || found == b'\\' {
            return cursor.pos();
        }
        // Closing quote: include it in the text run.
        cursor.advance();
        if cursor.is_eof() {
            self.state = ScanState::AfterLastQuote;
        }
        cursor.pos()
    }

    /// Consume up to `limit` for a `\x` / `\u` escape, stopping early at the
    /// end of the range, a newline, or the quote.
    fn locate_fixed_escape_end(&self, mut cursor: crate::Cursor<'_>, limit: u32) -> u32 {
        // Past the `x` / `u`.
        cursor.advance();
        while cursor.pos() < limit {
            let b = cursor.current();
            if cursor.is_eof() || b == b'\n' || Some(b) == self.config.quote {
                break;
            }
            cursor.advance_char();
        }
        cursor.pos()
    }

    fn is_escaped_space(&self, start: u32, end: u32) -> bool {
        end - start >= 2 && self.byte(start) == b'\\' && self.byte(start + 1) == b' '
    }

    /// Every remaining token up to the closing quote is an escaped space.
    fn is_trailing_space(&self, from: u32) -> bool {
        let mut i = from;
        while i < self.buffer_end {
            let c = self.byte(i);
            if Some(c) == self.config.quote && i + 1 == self.buffer_end {
                return true;
            }
            if c != b'\\' || i + 1 >= self.buffer_end || self.byte(i + 1) != b' ' {
                return false;
            }
            i += 2;
        }
        true
    }

    fn unicode_escape_type(&self) -> TokenType {
        self.fixed_escape_type(4)
    }

    fn hex_escape_type(&self) -> TokenType {
        self.fixed_escape_type(2)
    }

    /// `\` + letter + exactly `digits` hex digits.
    fn fixed_escape_type(&self, digits: u32) -> TokenType {
        let first = self.start + 2;
        if first + digits > self.end {
            return TokenType::INVALID_UNICODE_ESCAPE;
        }
        if (first..first + digits).all(|i| self.byte(i).is_ascii_hexdigit()) {
            TokenType::VALID_STRING_ESCAPE
        } else {
            TokenType::INVALID_UNICODE_ESCAPE
        }
    }
}

#[inline]
fn is_octal_digit(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

impl Lexer for StringLiteralLexer {
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        self.buffer = buffer;
        self.start = start_offset;
        self.buffer_end = end_offset;
        self.state = if self.config.quote.is_none() {
            ScanState::AfterFirstQuote
        } else {
            ScanState::from_raw(initial_state)
        };
        self.last_state = self.state;
        self.seen_escaped_spaces_only = initial_state & SEEN_TEXT == 0;
        self.end = self.locate_token(start_offset);
    }

    fn advance(&mut self) {
        if !self.is_escaped_space(self.start, self.end) {
            self.seen_escaped_spaces_only = false;
        }
        self.last_state = self.state;
        self.start = self.end;
        self.end = self.locate_token(self.start);
    }

    fn token_type(&self) -> Option<TokenType> {
        if self.start >= self.end {
            return None;
        }
        if self.byte(self.start) != b'\\' {
            return Some(self.config.original_token);
        }
        if self.start + 1 >= self.end {
            return Some(self.config.dangling_backslash);
        }

        let next = self.byte(self.start + 1);
        if self.config.escape_eol_or_framing_spaces
            && (next == b'\n'
                || (next == b' '
                    && (self.seen_escaped_spaces_only || self.is_trailing_space(self.start + 2))))
        {
            return Some(TokenType::VALID_STRING_ESCAPE);
        }
        if next == b'u' {
            return Some(self.unicode_escape_type());
        }
        if next == b'x' && self.config.allow_hex {
            return Some(self.hex_escape_type());
        }

        let ty = match next {
            b'0' if self.config.allow_slash_zero => TokenType::VALID_STRING_ESCAPE,
            b'0'..=b'7' if self.config.allow_octal => TokenType::VALID_STRING_ESCAPE,
            b'0'..=b'7' => TokenType::INVALID_CHARACTER_ESCAPE,
            b if self.config.is_valid_escape_letter(b) => TokenType::VALID_STRING_ESCAPE,
            _ => TokenType::INVALID_CHARACTER_ESCAPE,
        };
        Some(ty)
    }

    fn token_start(&self) -> u32 {
        self.start
    }

    fn token_end(&self) -> u32 {
        self.end
    }

    fn state(&self) -> u32 {
        // The escaped-space history only matters inside the literal.
        if self.last_state == ScanState::AfterFirstQuote && !self.seen_escaped_spaces_only {
            self.last_state as u32 | SEEN_TEXT
        } else {
            self.last_state as u32
        }
    }

    fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    fn buffer_end(&self) -> u32 {
        self.buffer_end
    }
}
