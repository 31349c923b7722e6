//! Sentence containers and their visibility state

use super::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a rendered sentence.
///
/// Identifiers are assigned in document order when the article is rendered and
/// never change while the document view lives, regardless of filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentenceId(pub usize);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Importance percentile of a sentence, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MAX: u8 = 100;

    pub fn new(percentile: u8) -> Self {
        Self(percentile.min(Self::MAX))
    }

    pub fn percentile(&self) -> u8 {
        self.0
    }
}

impl From<u8> for Rank {
    fn from(value: u8) -> Self {
        Rank::new(value)
    }
}

/// Reasons a sentence is currently shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    /// Rank is at or above the active threshold
    pub highlighted: bool,
    /// The reader expanded this sentence
    pub expanded: bool,
    /// Shown only because a neighbour is expanded
    pub expansion: bool,
    /// Contains an active keyword
    pub keyworded: bool,
    /// Starred by the reader. Does not affect visibility.
    pub starred: bool,
}

impl VisibilityFlags {
    /// Any reason the sentence would render at non-zero height
    pub fn is_visible(&self) -> bool {
        self.highlighted || self.expanded || self.expansion || self.keyworded
    }
}

/// One sentence-level content unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub id: SentenceId,
    /// Index of the paragraph this sentence belongs to
    pub paragraph: usize,
    pub rank: Rank,
    pub tokens: Vec<Token>,
    pub flags: VisibilityFlags,
}

impl Sentence {
    pub fn new(id: SentenceId, paragraph: usize, rank: Rank, tokens: Vec<Token>) -> Self {
        Self {
            id,
            paragraph,
            rank,
            tokens,
            flags: VisibilityFlags::default(),
        }
    }

    /// Plain text: the concatenation of every token's text
    pub fn text(&self) -> String {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    /// Length of the sentence text in characters
    pub fn char_len(&self) -> usize {
        self.tokens.last().map(Token::end).unwrap_or(0)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.is_visible()
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.tokens
            .iter()
            .any(|token| token.keyword.as_deref() == Some(keyword))
    }

    /// Locate a start boundary: the token containing `offset`.
    ///
    /// An offset at the very end of the sentence resolves to the end of the last
    /// token. Returns `(child index, offset inside child)`.
    pub fn locate_start(&self, offset: usize) -> Option<(usize, usize)> {
        if self.tokens.is_empty() {
            return (offset == 0).then_some((0, 0));
        }
        if offset == self.char_len() {
            let last = self.tokens.len() - 1;
            return Some((last, self.tokens[last].len));
        }
        self.tokens
            .iter()
            .position(|token| token.contains(offset))
            .map(|index| (index, offset - self.tokens[index].start))
    }

    /// Locate an end boundary: the token containing the character before `offset`.
    ///
    /// An offset of zero resolves to the start of the first token.
    pub fn locate_end(&self, offset: usize) -> Option<(usize, usize)> {
        if offset == 0 {
            return Some((0, 0));
        }
        self.tokens
            .iter()
            .position(|token| token.contains(offset - 1))
            .map(|index| (index, offset - self.tokens[index].start))
    }

    /// Resolve a `(child index, offset inside child)` pair back to a sentence offset
    pub fn resolve(&self, child: usize, offset: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return (child == 0 && offset == 0).then_some(0);
        }
        let token = self.tokens.get(child)?;
        (offset <= token.len).then_some(token.start + offset)
    }

    /// Token index containing `offset`, treating the sentence end as the last token
    pub fn token_index_at(&self, offset: usize) -> Option<usize> {
        self.locate_start(offset).map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::token::tokenize;

    fn sentence(text: &str) -> Sentence {
        Sentence::new(SentenceId(0), 0, Rank::new(50), tokenize(text))
    }

    #[test]
    fn test_rank_is_clamped() {
        assert_eq!(Rank::new(140).percentile(), 100);
        assert_eq!(Rank::from(7).percentile(), 7);
    }

    #[test]
    fn test_visibility_ignores_star() {
        let flags = VisibilityFlags {
            starred: true,
            ..Default::default()
        };
        assert!(!flags.is_visible());

        let flags = VisibilityFlags {
            expansion: true,
            ..Default::default()
        };
        assert!(flags.is_visible());
    }

    #[test]
    fn test_locate_start_and_end_boundaries() {
        // The(0) ' '(1) quick(2) ' '(3) fox(4) ' '(5) jumps(6) .(7)
        let s = sentence("The quick fox jumps.");
        assert_eq!(s.locate_start(4), Some((2, 0)));
        assert_eq!(s.locate_end(13), Some((4, 3)));
        assert_eq!(s.locate_start(20), Some((7, 1)));
        assert_eq!(s.locate_end(0), Some((0, 0)));
        assert_eq!(s.locate_start(21), None);
    }

    #[test]
    fn test_resolve_inverts_locate() {
        let s = sentence("The quick fox jumps.");
        for offset in 0..=s.char_len() {
            let (child, inner) = s.locate_start(offset).unwrap();
            assert_eq!(s.resolve(child, inner), Some(offset));
            let (child, inner) = s.locate_end(offset).unwrap();
            assert_eq!(s.resolve(child, inner), Some(offset));
        }
    }

    #[test]
    fn test_resolve_rejects_out_of_bounds() {
        let s = sentence("Hi there");
        assert_eq!(s.resolve(3, 0), None);
        assert_eq!(s.resolve(0, 3), None);
    }

    #[test]
    fn test_empty_sentence_boundaries() {
        let s = sentence("");
        assert_eq!(s.char_len(), 0);
        assert_eq!(s.locate_start(0), Some((0, 0)));
        assert_eq!(s.resolve(0, 0), Some(0));
        assert_eq!(s.resolve(1, 0), None);
    }
}
