//! Shared, immutable character buffer that every scanner reads from.
//!
//! A [`SourceBuffer`] is produced once by the caller and cloned into each
//! scanner that operates over it. Cloning bumps a reference count; the text
//! itself is never copied, and scanners keep only byte offsets into it.

use std::fmt;
use std::sync::Arc;

use crate::Cursor;

/// Immutable text shared between scanners.
///
/// Offsets are UTF-8 byte offsets stored as `u32`. The domain of a buffer
/// is `[0, len())`.
#[derive(Clone)]
pub struct SourceBuffer {
    text: Arc<str>,
}

impl SourceBuffer {
    /// Create a buffer holding a copy of `source`.
    ///
    /// # File Size
    ///
    /// Sources larger than `u32::MAX` bytes are accepted, but only the first
    /// `u32::MAX` bytes are addressable by offsets.
    pub fn new(source: &str) -> Self {
        Self {
            text: Arc::from(source),
        }
    }

    /// Create an empty buffer. Scanners hold one before their first `start`.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// The buffer contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The buffer contents as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Length of the buffer in bytes, saturated to `u32::MAX`.
    pub fn len(&self) -> u32 {
        u32::try_from(self.text.len()).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte at `offset`, or `0` when `offset` is past the end.
    #[inline]
    pub fn byte_at(&self, offset: u32) -> u8 {
        self.as_bytes().get(offset as usize).copied().unwrap_or(0)
    }

    /// Extract the text of `[start, end)`.
    ///
    /// # Contract
    ///
    /// `start <= end <= len()`, both on UTF-8 character boundaries. Token
    /// offsets produced by scanners in this workspace always satisfy this.
    pub fn slice(&self, start: u32, end: u32) -> &str {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        debug_assert!(
            end <= self.len(),
            "slice end {end} exceeds buffer length {}",
            self.len()
        );
        &self.text[start as usize..end as usize]
    }

    /// Create a [`Cursor`] over `[start, end)`, positioned at `start`.
    pub fn cursor(&self, start: u32, end: u32) -> Cursor<'_> {
        Cursor::new(self.as_bytes(), start, end)
    }

    /// Returns `true` if both handles share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.text, &other.text)
    }
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for SourceBuffer {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for SourceBuffer {
    fn from(source: String) -> Self {
        Self {
            text: Arc::from(source),
        }
    }
}

// Content equality; shared handles short-circuit.
impl PartialEq for SourceBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.text == other.text
    }
}

impl Eq for SourceBuffer {}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("len", &self.text.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
