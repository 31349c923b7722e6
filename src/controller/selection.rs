//! Clipping native selections to safe ranges
//!
//! The host reports raw caret positions. Before anything is drawn the
//! selection is reduced to whole tokens inside one run of visible sentences:
//!
//! 1. endpoints are ordered by document position;
//! 2. a selection anchored in a hidden sentence yields nothing;
//! 3. both ends are clamped to the contiguous visible run holding the anchor,
//!    whichever direction the reader dragged;
//! 4. both ends snap outwards to token boundaries;
//! 5. whitespace tokens at either edge are trimmed.
//!
//! Anything that clips to no tokens is rejected, never an error.

use super::state::NativeSelection;
use crate::range::Range;
use crate::registry::{Sentence, SentenceId, SentenceRegistry, Token};
use tracing::debug;

/// Reduce a native selection to a non-empty canonical range
pub fn clip_selection(registry: &SentenceRegistry, selection: &NativeSelection) -> Option<Range> {
    if selection.is_collapsed() {
        return None;
    }
    let anchor = position(registry, selection.anchor)?;
    let focus = position(registry, selection.focus)?;
    let (mut start, mut end) = if anchor <= focus {
        (anchor, focus)
    } else {
        (focus, anchor)
    };

    let (run_first, run_last) = registry.visible_run(registry.at(anchor.0)?.id)?;
    if start.0 < run_first {
        start = (run_first, 0);
    }
    if end.0 > run_last {
        end = (run_last, registry.at(run_last)?.char_len());
    }

    let mut tokens: Vec<(SentenceId, &Token)> = Vec::new();
    for index in start.0..=end.0 {
        let sentence = registry.at(index)?;
        let lower = if index == start.0 {
            first_token_at(sentence, start.1)
        } else {
            0
        };
        let upper = if index == end.0 {
            tokens_before(sentence, end.1)
        } else {
            sentence.tokens.len()
        };
        if lower < upper {
            tokens.extend(sentence.tokens[lower..upper].iter().map(|t| (sentence.id, t)));
        }
    }

    let first = tokens.iter().position(|(_, token)| !token.is_whitespace())?;
    let last = tokens.iter().rposition(|(_, token)| !token.is_whitespace())?;
    let (start_sentence, start_token) = tokens[first];
    let (end_sentence, end_token) = tokens[last];

    match Range::spanning(
        registry,
        (start_sentence, start_token.start),
        (end_sentence, end_token.end()),
    ) {
        Ok(range) if !range.is_empty() => Some(range),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "discarding selection");
            None
        }
    }
}

/// Document position `(sentence index, clamped char offset)`
fn position(registry: &SentenceRegistry, (id, offset): (SentenceId, usize)) -> Option<(usize, usize)> {
    let sentence = registry.get(id)?;
    Some((registry.index_of(id)?, offset.min(sentence.char_len())))
}

/// Index of the token containing `offset`, or the token count at the end
fn first_token_at(sentence: &Sentence, offset: usize) -> usize {
    sentence
        .tokens
        .iter()
        .position(|token| token.contains(offset))
        .unwrap_or(sentence.tokens.len())
}

/// Number of tokens touched by the characters before `offset`
fn tokens_before(sentence: &Sentence, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    sentence
        .tokens
        .iter()
        .position(|token| token.contains(offset - 1))
        .map(|index| index + 1)
        .unwrap_or(sentence.tokens.len())
}
