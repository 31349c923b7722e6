//! Range model
//!
//! A [`Range`] describes a span of article text independently of any layout: an
//! ordered list of [`RangeSegment`]s, one per sentence the span touches, each
//! holding character offsets into that sentence's token text.
//!
//! ## Canonical form
//!
//! Ranges built from a selection or from storage are always in canonical form:
//! consecutive sentences in document order, the first segment running to the
//! end of its sentence, middle sentences whole, the last segment starting at 0.
//! [`Range::spanning`] builds that form from two endpoints, and it is the form
//! [`Range::serialize`] / [`Range::deserialize`] round-trip through.
//!
//! ## Serialized form
//!
//! `sentenceId/childIndex:characterOffset,sentenceId/childIndex:characterOffset`.
//! See [`boundary`] for the grammar.

pub mod boundary;

pub use boundary::Boundary;

use crate::error::RangeError;
use crate::registry::{Sentence, SentenceId, SentenceRegistry};

/// The part of a range inside one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeSegment {
    pub sentence: SentenceId,
    pub start: usize,
    pub end: usize,
}

impl RangeSegment {
    /// Construct a sentence-scoped sub-range.
    ///
    /// Fails when `end` precedes `start`. Offsets are unsigned, so negative
    /// offsets cannot be expressed.
    pub fn create(sentence: SentenceId, start: usize, end: usize) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Invalid {
                sentence,
                start,
                end,
            });
        }
        Ok(Self {
            sentence,
            start,
            end,
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A serializable span of article text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    segments: Vec<RangeSegment>,
}

impl Range {
    /// Build a range from segments, accepting only the canonical form.
    ///
    /// Segments must cover consecutive sentences; every segment but the first
    /// starts at 0 and every segment but the last runs to its sentence end.
    /// Anything else could not survive [`Range::serialize`], which keeps only
    /// the outer boundaries.
    pub fn from_segments(
        registry: &SentenceRegistry,
        segments: Vec<RangeSegment>,
    ) -> Result<Self, RangeError> {
        let count = segments.len();
        for (position, segment) in segments.iter().enumerate() {
            let sentence = sentence_or_stale(registry, segment.sentence)?;
            check_offset(sentence, segment.end)?;
            if position > 0 && segment.start != 0 {
                return Err(RangeError::Unordered(format!(
                    "segment in sentence {} must start at 0",
                    segment.sentence
                )));
            }
            if position + 1 < count && segment.end != sentence.char_len() {
                return Err(RangeError::Unordered(format!(
                    "segment in sentence {} must run to the end of the sentence",
                    segment.sentence
                )));
            }
        }
        for pair in segments.windows(2) {
            if pair[1].sentence.0 != pair[0].sentence.0 + 1 {
                return Err(RangeError::Unordered(format!(
                    "sentence {} does not directly follow sentence {}",
                    pair[1].sentence, pair[0].sentence
                )));
            }
        }
        Ok(Self { segments })
    }

    /// A range inside a single sentence
    pub fn single(sentence: SentenceId, start: usize, end: usize) -> Result<Self, RangeError> {
        Ok(Self {
            segments: vec![RangeSegment::create(sentence, start, end)?],
        })
    }

    /// Canonical range from `start` to `end`, both `(sentence, offset)` pairs.
    ///
    /// Every sentence strictly between the two endpoints is included whole.
    pub fn spanning(
        registry: &SentenceRegistry,
        start: (SentenceId, usize),
        end: (SentenceId, usize),
    ) -> Result<Self, RangeError> {
        let first = sentence_or_stale(registry, start.0)?;
        let last = sentence_or_stale(registry, end.0)?;
        check_offset(first, start.1)?;
        check_offset(last, end.1)?;

        let first_index = first.id.0;
        let last_index = last.id.0;
        if first_index > last_index {
            return Err(RangeError::Unordered(format!(
                "range starts in sentence {} but ends in earlier sentence {}",
                first.id, last.id
            )));
        }
        if first_index == last_index {
            return Self::single(first.id, start.1, end.1);
        }

        let mut segments = Vec::with_capacity(last_index - first_index + 1);
        segments.push(RangeSegment::create(first.id, start.1, first.char_len())?);
        for index in first_index + 1..last_index {
            if let Some(middle) = registry.at(index) {
                segments.push(RangeSegment::create(middle.id, 0, middle.char_len())?);
            }
        }
        segments.push(RangeSegment::create(last.id, 0, end.1)?);
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[RangeSegment] {
        &self.segments
    }

    /// True iff the range is a single zero-length segment (or has no segments)
    pub fn is_empty(&self) -> bool {
        match self.segments.as_slice() {
            [] => true,
            [only] => only.is_empty(),
            _ => false,
        }
    }

    pub fn first_sentence(&self) -> Option<SentenceId> {
        self.segments.first().map(|segment| segment.sentence)
    }

    pub fn last_sentence(&self) -> Option<SentenceId> {
        self.segments.last().map(|segment| segment.sentence)
    }

    pub fn sentences(&self) -> impl Iterator<Item = SentenceId> + '_ {
        self.segments.iter().map(|segment| segment.sentence)
    }

    /// The selected text, sentences joined with a single space
    pub fn text(&self, registry: &SentenceRegistry) -> String {
        self.segments
            .iter()
            .filter_map(|segment| {
                let text = registry.text(segment.sentence)?;
                Some(
                    text.chars()
                        .skip(segment.start)
                        .take(segment.len())
                        .collect::<String>(),
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check every segment against the registry
    pub fn validate(&self, registry: &SentenceRegistry) -> Result<(), RangeError> {
        for segment in &self.segments {
            let sentence = sentence_or_stale(registry, segment.sentence)?;
            check_offset(sentence, segment.end)?;
        }
        Ok(())
    }

    /// Produce the stored `start,end` form
    pub fn serialize(&self, registry: &SentenceRegistry) -> Result<String, RangeError> {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return Err(RangeError::Unordered("range has no segments".to_string()));
        };

        let first_sentence = sentence_or_stale(registry, first.sentence)?;
        let last_sentence = sentence_or_stale(registry, last.sentence)?;
        let (start_child, start_offset) =
            first_sentence
                .locate_start(first.start)
                .ok_or(RangeError::OutOfBounds {
                    sentence: first.sentence,
                    offset: first.start,
                    len: first_sentence.char_len(),
                })?;
        let (end_child, end_offset) =
            last_sentence
                .locate_end(last.end)
                .ok_or(RangeError::OutOfBounds {
                    sentence: last.sentence,
                    offset: last.end,
                    len: last_sentence.char_len(),
                })?;

        Ok(boundary::format(
            &Boundary::new(first.sentence, start_child, start_offset),
            &Boundary::new(last.sentence, end_child, end_offset),
        ))
    }

    /// Resolve a stored `start,end` form against the current registry
    pub fn deserialize(data: &str, registry: &SentenceRegistry) -> Result<Self, RangeError> {
        let (start, end) = boundary::parse(data)?;
        let start_offset = resolve_boundary(registry, &start)?;
        let end_offset = resolve_boundary(registry, &end)?;
        Self::spanning(
            registry,
            (start.sentence, start_offset),
            (end.sentence, end_offset),
        )
    }
}

fn sentence_or_stale(
    registry: &SentenceRegistry,
    id: SentenceId,
) -> Result<&Sentence, RangeError> {
    registry.get(id).ok_or(RangeError::Stale(id))
}

fn check_offset(sentence: &Sentence, offset: usize) -> Result<(), RangeError> {
    let len = sentence.char_len();
    if offset > len {
        return Err(RangeError::OutOfBounds {
            sentence: sentence.id,
            offset,
            len,
        });
    }
    Ok(())
}

fn resolve_boundary(registry: &SentenceRegistry, boundary: &Boundary) -> Result<usize, RangeError> {
    sentence_or_stale(registry, boundary.sentence)?
        .resolve(boundary.child, boundary.offset)
        .ok_or(RangeError::StaleBoundary {
            sentence: boundary.sentence,
            child: boundary.child,
            offset: boundary.offset,
        })
}
