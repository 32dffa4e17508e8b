//! Token vocabulary: types, sets of types, and materialized token records.

use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

/// The classification tag of a token.
///
/// Identity is the numeric id; the name is only for diagnostics. Types are
/// plain `Copy` values so scanners can declare them as constants:
///
/// ```text
/// const IDENT: TokenType = TokenType::new(TokenType::FIRST_USER_ID, "IDENT");
/// ```
#[derive(Clone, Copy)]
pub struct TokenType {
    id: u16,
    name: &'static str,
}

impl TokenType {
    /// Whitespace between meaningful tokens.
    pub const WHITE_SPACE: TokenType = TokenType::new(1, "WHITE_SPACE");
    /// A character the scanner could not classify, or the remainder of a
    /// buffer after a scanner fault.
    pub const BAD_CHARACTER: TokenType = TokenType::new(2, "BAD_CHARACTER");
    /// An escape sequence inside a string literal that is well formed.
    pub const VALID_STRING_ESCAPE: TokenType = TokenType::new(3, "VALID_STRING_ESCAPE");
    /// A backslash followed by a character that is not a known escape.
    pub const INVALID_CHARACTER_ESCAPE: TokenType =
        TokenType::new(4, "INVALID_CHARACTER_ESCAPE");
    /// A `\u` or `\x` escape with missing or non-hex digits.
    pub const INVALID_UNICODE_ESCAPE: TokenType = TokenType::new(5, "INVALID_UNICODE_ESCAPE");

    /// First id available to scanner authors. Lower ids are reserved.
    pub const FIRST_USER_ID: u16 = 64;

    /// Create a token type with an explicit id.
    pub const fn new(id: u16, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Numeric identity of this type.
    #[inline]
    pub const fn id(self) -> u16 {
        self.id
    }

    /// Diagnostic name.
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenType {}

impl Hash for TokenType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A set of token types.
///
/// Membership is a bitset over type ids; two inline words cover ids below
/// 128 without allocating. Members are also kept in ascending id order so
/// iteration reports each type's name.
#[derive(Clone, Default)]
pub struct TokenSet {
    words: SmallVec<[u64; 2]>,
    members: SmallVec<[TokenType; 4]>,
}

impl TokenSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly `types`.
    pub fn of(types: &[TokenType]) -> Self {
        types.iter().copied().collect()
    }

    /// Add a type. Returns `true` if it was not already present.
    pub fn insert(&mut self, ty: TokenType) -> bool {
        let (word, bit) = Self::slot(ty);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        if self.words[word] & bit != 0 {
            return false;
        }
        self.words[word] |= bit;
        let at = self.members.partition_point(|m| m.id() < ty.id());
        self.members.insert(at, ty);
        true
    }

    /// Returns `true` if `ty` is a member.
    #[inline]
    pub fn contains(&self, ty: TokenType) -> bool {
        let (word, bit) = Self::slot(ty);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Membership test for an optional type. `None` is never a member.
    #[inline]
    pub fn contains_opt(&self, ty: Option<TokenType>) -> bool {
        ty.is_some_and(|ty| self.contains(ty))
    }

    /// Union of two sets.
    #[must_use]
    pub fn union(&self, other: &TokenSet) -> TokenSet {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Iterate members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.members.iter().copied()
    }

    #[inline]
    fn slot(ty: TokenType) -> (usize, u64) {
        let id = ty.id() as usize;
        (id / 64, 1u64 << (id % 64))
    }
}

impl PartialEq for TokenSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for TokenSet {}

impl Extend<TokenType> for TokenSet {
    fn extend<I: IntoIterator<Item = TokenType>>(&mut self, iter: I) {
        for ty in iter {
            self.insert(ty);
        }
    }
}

impl FromIterator<TokenType> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        set.extend(iter);
        set
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

/// A fully materialized token: `[start, end)` classified as `token_type`,
/// with the scanner state observed at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenInfo {
    pub start: u32,
    pub end: u32,
    pub token_type: TokenType,
    pub state: u32,
}

impl TokenInfo {
    pub fn new(start: u32, end: u32, token_type: TokenType, state: u32) -> Self {
        debug_assert!(start <= end, "token start {start} exceeds end {end}");
        Self {
            start,
            end,
            token_type,
            state,
        }
    }

    /// Length of the token in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length token.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
