//! A small generated-style scanner used to drive the composites in tests.
//!
//! Recognizes identifiers, numbers, double-quoted strings, parens, braces,
//! whitespace and `/* */` block comments. Comments are split at newlines so
//! the "inside comment" start condition carries across tokens.

use relex_core::{Lexer, SourceBuffer, TokenInfo, TokenType};

use crate::{FlexAdapter, GeneratedScanner, ScanFault};

const fn user(n: u16, name: &'static str) -> TokenType {
    TokenType::new(TokenType::FIRST_USER_ID + n, name)
}

pub(crate) const IDENT: TokenType = user(0, "IDENT");
pub(crate) const NUMBER: TokenType = user(1, "NUMBER");
pub(crate) const STRING: TokenType = user(2, "STRING");
pub(crate) const LPAREN: TokenType = user(3, "LPAREN");
pub(crate) const RPAREN: TokenType = user(4, "RPAREN");
pub(crate) const LBRACE: TokenType = user(5, "LBRACE");
pub(crate) const RBRACE: TokenType = user(6, "RBRACE");
pub(crate) const COMMENT: TokenType = user(7, "COMMENT");
pub(crate) const PUNCT: TokenType = user(8, "PUNCT");
pub(crate) const WS: TokenType = TokenType::WHITE_SPACE;

pub(crate) const CODE: u32 = 0;
pub(crate) const IN_COMMENT: u32 = 1;

#[derive(Default)]
pub(crate) struct ToyScanner {
    buffer: SourceBuffer,
    pos: u32,
    end: u32,
    state: u32,
}

impl ToyScanner {
    fn comment_body(&mut self) {
        let mut cursor = self.buffer.cursor(self.pos, self.end);
        loop {
            if cursor.is_eof() {
                break;
            }
            match cursor.current() {
                b'*' if cursor.peek() == b'/' => {
                    cursor.advance_n(2);
                    self.state = CODE;
                    break;
                }
                b'\n' => {
                    cursor.advance();
                    break;
                }
                _ => cursor.advance_char(),
            }
        }
        self.pos = cursor.pos();
    }

    fn string(&mut self) {
        let mut cursor = self.buffer.cursor(self.pos, self.end);
        cursor.advance();
        loop {
            match cursor.skip_to_any4(b'"', b'\\', b'\n', b'\n') {
                b'"' => {
                    cursor.advance();
                    break;
                }
                b'\\' => {
                    cursor.advance();
                    if cursor.current() != b'\n' {
                        cursor.advance_char();
                    }
                }
                _ => break,
            }
        }
        self.pos = cursor.pos();
    }
}

impl GeneratedScanner for ToyScanner {
    fn reset(&mut self, buffer: SourceBuffer, start: u32, end: u32, state: u32) {
        self.buffer = buffer;
        self.pos = start;
        self.end = end;
        self.state = state;
    }

    fn advance(&mut self) -> Result<Option<TokenType>, ScanFault> {
        if self.pos >= self.end {
            return Ok(None);
        }
        if self.state == IN_COMMENT {
            self.comment_body();
            return Ok(Some(COMMENT));
        }

        let mut cursor = self.buffer.cursor(self.pos, self.end);
        let ty = match cursor.current() {
            b' ' | b'\t' | b'\n' => {
                cursor.eat_while(|b| matches!(b, b' ' | b'\t' | b'\n'));
                WS
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                IDENT
            }
            b'0'..=b'9' => {
                cursor.eat_while(|b| b.is_ascii_digit());
                NUMBER
            }
            b'"' => {
                self.string();
                return Ok(Some(STRING));
            }
            b'/' if cursor.peek() == b'*' => {
                cursor.advance_n(2);
                self.state = IN_COMMENT;
                COMMENT
            }
            b'(' => single(&mut cursor, LPAREN),
            b')' => single(&mut cursor, RPAREN),
            b'{' => single(&mut cursor, LBRACE),
            b'}' => single(&mut cursor, RBRACE),
            _ => {
                cursor.advance_char();
                PUNCT
            }
        };
        self.pos = cursor.pos();
        Ok(Some(ty))
    }

    fn token_end(&self) -> u32 {
        self.pos
    }

    fn state(&self) -> u32 {
        self.state
    }

    fn begin(&mut self, state: u32) {
        self.state = state;
    }
}

fn single(cursor: &mut relex_core::Cursor<'_>, ty: TokenType) -> TokenType {
    cursor.advance();
    ty
}

/// How a [`FaultyScanner`] misbehaves once its budget is spent.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Fault {
    Error,
    Panic,
    Stall,
}

/// Delegates to [`ToyScanner`] for `budget` tokens, then faults.
pub(crate) struct FaultyScanner {
    inner: ToyScanner,
    budget: usize,
    fault: Fault,
    pub(crate) calls_after_fault: usize,
}

impl FaultyScanner {
    pub(crate) fn new(budget: usize, fault: Fault) -> Self {
        Self {
            inner: ToyScanner::default(),
            budget,
            fault,
            calls_after_fault: 0,
        }
    }
}

impl GeneratedScanner for FaultyScanner {
    fn reset(&mut self, buffer: SourceBuffer, start: u32, end: u32, state: u32) {
        self.inner.reset(buffer, start, end, state);
    }

    fn advance(&mut self) -> Result<Option<TokenType>, ScanFault> {
        if self.budget > 0 {
            self.budget -= 1;
            return self.inner.advance();
        }
        self.calls_after_fault += 1;
        match self.fault {
            Fault::Error => Err(ScanFault::internal(self.inner.pos, "table lookup failed")),
            Fault::Panic => panic!("index out of bounds in transition table"),
            Fault::Stall => Ok(Some(PUNCT)),
        }
    }

    fn token_end(&self) -> u32 {
        self.inner.token_end()
    }

    fn state(&self) -> u32 {
        self.inner.state()
    }

    fn begin(&mut self, state: u32) {
        self.inner.begin(state);
    }
}

pub(crate) fn toy_lexer() -> FlexAdapter<ToyScanner> {
    FlexAdapter::new(ToyScanner::default())
}

/// Render tokens as `(type, text)` pairs for readable assertions.
pub(crate) fn render(buf: &SourceBuffer, tokens: &[TokenInfo]) -> Vec<(TokenType, String)> {
    tokens
        .iter()
        .map(|t| (t.token_type, buf.slice(t.start, t.end).to_owned()))
        .collect()
}

pub(crate) fn tok(ty: TokenType, text: &str) -> (TokenType, String) {
    (ty, text.to_owned())
}

/// Scan the whole buffer, recording the position before each token.
pub(crate) fn scan_with_positions<L: Lexer>(
    lexer: &mut L,
    buf: &SourceBuffer,
) -> Vec<(relex_core::LexerPosition, TokenInfo)> {
    lexer.start_all(buf.clone());
    let mut out = Vec::new();
    while let Some(token_type) = lexer.token_type() {
        let info = TokenInfo::new(lexer.token_start(), lexer.token_end(), token_type, lexer.state());
        out.push((lexer.current_position(), info));
        lexer.advance();
    }
    out
}
