//! Sentence registry
//!
//! The ordered, queryable set of sentence containers for one rendered document.
//! The registry is rebuilt wholesale on every full render (see
//! [`document::render`](crate::document::render)); afterwards only the
//! per-sentence [`VisibilityFlags`] change, and only through the filter and the
//! controller's expansion state machine.

pub mod sentence;
pub mod token;

pub use sentence::{Rank, Sentence, SentenceId, VisibilityFlags};
pub use token::{tokenize, Token, TokenKind};

use std::collections::BTreeMap;

/// Ordered sentences of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceRegistry {
    sentences: Vec<Sentence>,
    /// Sentence ids per rank percentile, in document order
    buckets: BTreeMap<u8, Vec<SentenceId>>,
}

impl SentenceRegistry {
    /// Build a registry from sentences already in document order.
    ///
    /// Identifiers are index based: the sentence at position `n` must carry
    /// `SentenceId(n)`. Mismatching ids are reassigned.
    pub fn new(mut sentences: Vec<Sentence>) -> Self {
        let mut buckets: BTreeMap<u8, Vec<SentenceId>> = BTreeMap::new();
        for (index, sentence) in sentences.iter_mut().enumerate() {
            sentence.id = SentenceId(index);
            buckets
                .entry(sentence.rank.percentile())
                .or_default()
                .push(sentence.id);
        }
        Self { sentences, buckets }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn get(&self, id: SentenceId) -> Option<&Sentence> {
        self.sentences.get(id.0).filter(|sentence| sentence.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SentenceId) -> Option<&mut Sentence> {
        self.sentences.get_mut(id.0).filter(|sentence| sentence.id == id)
    }

    /// All sentences in document order
    pub fn iter(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sentence> {
        self.sentences.iter_mut()
    }

    /// Position of a sentence in document order
    pub fn index_of(&self, id: SentenceId) -> Option<usize> {
        self.get(id).map(|sentence| sentence.id.0)
    }

    /// Sentence at a document-order position
    pub fn at(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Adjacent sentences in document order, `None` at the boundaries
    pub fn neighbors(&self, id: SentenceId) -> (Option<SentenceId>, Option<SentenceId>) {
        let Some(index) = self.index_of(id) else {
            return (None, None);
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| self.sentences.get(i))
            .map(|s| s.id);
        let next = self.sentences.get(index + 1).map(|s| s.id);
        (prev, next)
    }

    /// Adjacent sentences restricted to the same paragraph
    pub fn paragraph_neighbors(&self, id: SentenceId) -> (Option<SentenceId>, Option<SentenceId>) {
        let Some(paragraph) = self.paragraph_of(id) else {
            return (None, None);
        };
        let (prev, next) = self.neighbors(id);
        let same_paragraph = |other: Option<SentenceId>| {
            other.filter(|other| self.paragraph_of(*other) == Some(paragraph))
        };
        (same_paragraph(prev), same_paragraph(next))
    }

    pub fn paragraph_of(&self, id: SentenceId) -> Option<usize> {
        self.get(id).map(|sentence| sentence.paragraph)
    }

    /// Sentences of one paragraph in document order
    pub fn paragraph(&self, paragraph: usize) -> impl Iterator<Item = &Sentence> {
        self.sentences
            .iter()
            .filter(move |sentence| sentence.paragraph == paragraph)
    }

    /// True iff the sentence currently renders at non-zero height
    pub fn is_visible(&self, id: SentenceId) -> bool {
        self.get(id).is_some_and(Sentence::is_visible)
    }

    pub fn flags(&self, id: SentenceId) -> Option<VisibilityFlags> {
        self.get(id).map(|sentence| sentence.flags)
    }

    pub(crate) fn flags_mut(&mut self, id: SentenceId) -> Option<&mut VisibilityFlags> {
        self.get_mut(id).map(|sentence| &mut sentence.flags)
    }

    /// Sentences whose rank percentile equals `percentile`
    pub fn rank_bucket(&self, percentile: u8) -> &[SentenceId] {
        self.buckets
            .get(&percentile)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ordered token list used for all offset math on a sentence
    pub fn resolve_content(&self, id: SentenceId) -> Option<&[Token]> {
        self.get(id).map(|sentence| sentence.tokens.as_slice())
    }

    /// Plain text of a sentence
    pub fn text(&self, id: SentenceId) -> Option<String> {
        self.get(id).map(Sentence::text)
    }

    pub fn sentences_with_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> impl Iterator<Item = SentenceId> + 'a {
        self.sentences
            .iter()
            .filter(move |sentence| sentence.has_keyword(keyword))
            .map(|sentence| sentence.id)
    }

    /// The maximal run of contiguous visible sentences containing `id`.
    ///
    /// Returns the inclusive document-order index bounds, or `None` when the
    /// sentence itself is hidden.
    pub fn visible_run(&self, id: SentenceId) -> Option<(usize, usize)> {
        let index = self.index_of(id)?;
        if !self.sentences[index].is_visible() {
            return None;
        }
        let mut first = index;
        while first > 0 && self.sentences[first - 1].is_visible() {
            first -= 1;
        }
        let mut last = index;
        while last + 1 < self.sentences.len() && self.sentences[last + 1].is_visible() {
            last += 1;
        }
        Some((first, last))
    }
}
