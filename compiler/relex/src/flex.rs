//! Adapter from a generated scanner to the token contract.
//!
//! Generated scanners (Flex-style state machines) expose a smaller surface
//! than [`Lexer`]: reset onto a window, scan the next token, report the
//! current start condition. [`FlexAdapter`] wraps one without modifying it
//! and records the scanner state at each token start, which is what makes
//! the adapter resumable.
//!
//! # Faults
//!
//! Scanning often runs on latency-sensitive paths, so a misbehaving scanner
//! must not take the caller down. An error result, a panic, or a token that
//! does not move forward becomes a single `BAD_CHARACTER` token spanning the
//! rest of the range. The adapter then latches a failed flag and never
//! calls the scanner again until the next [`start`](Lexer::start).

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use relex_core::{Lexer, SourceBuffer, TokenType};
use tracing::warn;

use crate::ScanFault;

/// The black-box surface of a generated scanner.
pub trait GeneratedScanner {
    /// Reposition onto `[start, end)` of `buffer` in start condition `state`.
    fn reset(&mut self, buffer: SourceBuffer, start: u32, end: u32, state: u32);

    /// Scan the next token. `Ok(None)` at the end of the range.
    fn advance(&mut self) -> Result<Option<TokenType>, ScanFault>;

    /// End offset of the token most recently returned by `advance`.
    fn token_end(&self) -> u32;

    /// Current start condition (`yystate`).
    fn state(&self) -> u32;

    /// Switch start condition (`yybegin`).
    fn begin(&mut self, state: u32);
}

/// [`Lexer`] over a [`GeneratedScanner`].
pub struct FlexAdapter<S> {
    scanner: S,
    buffer: SourceBuffer,
    token_type: Option<TokenType>,
    token_start: u32,
    token_end: u32,
    buffer_end: u32,
    /// Scanner state observed before scanning the current token.
    state: u32,
    failed: bool,
}

impl<S: GeneratedScanner> FlexAdapter<S> {
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            buffer: SourceBuffer::empty(),
            token_type: None,
            token_start: 0,
            token_end: 0,
            buffer_end: 0,
            state: 0,
            failed: false,
        }
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Returns `true` once a fault has been contained in the current scan.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn locate_token(&mut self) {
        self.token_start = self.token_end;
        if self.failed {
            self.token_type = None;
            return;
        }

        self.state = self.scanner.state();
        let start = self.token_start;
        let scanner = &mut self.scanner;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| scanner.advance()));
        match outcome {
            Ok(Ok(Some(token_type))) => {
                let end = self.scanner.token_end();
                if end <= start || end > self.buffer_end {
                    self.fail(&ScanFault::NoProgress { offset: start });
                } else {
                    self.token_type = Some(token_type);
                    self.token_end = end;
                }
            }
            Ok(Ok(None)) => {
                self.token_type = None;
                self.token_end = start;
            }
            Ok(Err(fault)) => self.fail(&fault),
            Err(payload) => self.fail(&ScanFault::Panicked {
                offset: start,
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn fail(&mut self, fault: &ScanFault) {
        warn!(
            scanner = std::any::type_name::<S>(),
            %fault,
            "generated scanner failed; rest of range reported as bad character"
        );
        self.failed = true;
        if self.token_start < self.buffer_end {
            self.token_type = Some(TokenType::BAD_CHARACTER);
            self.token_end = self.buffer_end;
        } else {
            self.token_type = None;
            self.token_end = self.token_start;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl<S: GeneratedScanner> Lexer for FlexAdapter<S> {
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        self.scanner
            .reset(buffer.clone(), start_offset, end_offset, initial_state);
        self.buffer = buffer;
        self.token_start = start_offset;
        self.token_end = start_offset;
        self.buffer_end = end_offset;
        self.failed = false;
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
        self.token_end
    }

    fn state(&self) -> u32 {
        self.state
    }

    fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    fn buffer_end(&self) -> u32 {
        self.buffer_end
    }
}
