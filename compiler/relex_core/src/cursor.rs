//! Bounded byte cursor for hand-written scanners.
//!
//! A scanner is started over an arbitrary `[start, end)` window of a shared
//! buffer, so the end of input is a position rather than a sentinel byte.
//! [`Cursor::current()`] still reports `0x00` once the cursor reaches the
//! end bound, which keeps byte-dispatch loops free of explicit checks.
//!
//! # NUL Bytes
//!
//! A NUL inside the window also reads as `0x00`. Use
//! [`is_eof()`](Cursor::is_eof) to tell the two apart.

/// Smaller of two optional match offsets.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Cursor over a byte window `[pos, end)`.
///
/// The cursor is [`Copy`], enabling cheap snapshots for backtracking.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: u32,
    /// Exclusive end of the window. Never past `buf.len()`.
    end: u32,
}

// Slice plus two offsets; stays within three words.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a cursor at `start`, bounded by `end`.
    ///
    /// `end` is clamped to the buffer length.
    pub(crate) fn new(buf: &'a [u8], start: u32, end: u32) -> Self {
        let len = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let end = end.min(len);
        debug_assert!(start <= end, "cursor start {start} exceeds end {end}");
        Self {
            buf,
            pos: start,
            end,
        }
    }

    /// Returns the byte at the current position, or `0x00` at the end bound.
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte(self.pos)
    }

    /// Byte after `current()`, `0` past the end bound.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte(self.pos + 1)
    }

    /// Byte two past `current()`, `0` past the end bound.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.byte(self.pos + 2)
    }

    #[inline]
    fn byte(&self, at: u32) -> u8 {
        if at < self.end {
            self.buf[at as usize]
        } else {
            0
        }
    }

    /// Step one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Step `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Returns `true` once the cursor has reached the end bound.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Current byte offset in the buffer.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Exclusive end of the window.
    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// Stops at the end bound regardless of `pred`.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Width of the UTF-8 sequence led by `byte`.
    ///
    /// Continuation and invalid lead bytes count as one byte so scanning
    /// always makes progress.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance past one full UTF-8 character, never beyond the end bound.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.pos = (self.pos + width).min(self.end.max(self.pos));
    }

    /// Advance to the nearest `a` or `b` byte, or to the end bound.
    ///
    /// Returns the byte found, or `0` at the end bound.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets within the window fit in u32"
    )]
    pub fn skip_to_either(&mut self, a: u8, b: u8) -> u8 {
        if self.is_eof() {
            return 0;
        }
        let remaining = &self.buf[self.pos as usize..self.end as usize];
        if let Some(off) = memchr::memchr2(a, b, remaining) {
            self.pos += off as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.end;
            0
        }
    }

    /// Advance to the nearest of `a`, `b`, `c` or `d`, or to the end bound.
    ///
    /// `memchr3` handles at most three needles, so the fourth is searched
    /// separately and the earliest match wins.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets within the window fit in u32"
    )]
    pub fn skip_to_any4(&mut self, a: u8, b: u8, c: u8, d: u8) -> u8 {
        if self.is_eof() {
            return 0;
        }
        let remaining = &self.buf[self.pos as usize..self.end as usize];
        let primary = memchr::memchr3(a, b, c, remaining);
        let secondary = memchr::memchr(d, remaining);
        if let Some(off) = earliest_of(primary, secondary) {
            self.pos += off as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.end;
            0
        }
    }
}

#[cfg(test)]
mod tests;
