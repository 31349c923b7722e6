//! Rank threshold and keyword filtering
//!
//! The filter owns the `highlighted` and `keyworded` visibility flags. It only
//! mutates the registry and reports what changed; callers are expected to
//! propagate reflow from the first changed sentence afterwards (the
//! [`SelectionController`](crate::controller::SelectionController) does).

use crate::registry::{SentenceId, SentenceRegistry};
use std::collections::BTreeSet;

/// One flag that flipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagChange {
    pub sentence: SentenceId,
    /// New value of the flag
    pub on: bool,
}

/// Sentences whose flag changed in one filter operation, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChange {
    changes: Vec<FlagChange>,
}

impl FilterChange {
    fn push(&mut self, sentence: SentenceId, on: bool) {
        self.changes.push(FlagChange { sentence, on });
    }

    fn finish(mut self) -> Self {
        self.changes.sort_by_key(|change| change.sentence);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagChange> {
        self.changes.iter()
    }

    /// Earliest changed sentence, where reflow must start
    pub fn first(&self) -> Option<SentenceId> {
        self.changes.first().map(|change| change.sentence)
    }
}

/// Active threshold and keyword set of a document view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    threshold: u8,
    keywords: BTreeSet<String>,
}

impl Filter {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            keywords: BTreeSet::new(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn active_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn is_active(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    /// Highlight every sentence ranked at or above `threshold`
    pub fn apply_threshold(&mut self, registry: &mut SentenceRegistry, threshold: u8) -> FilterChange {
        self.threshold = threshold;
        let mut change = FilterChange::default();
        for percentile in 0..=100u8 {
            let highlighted = percentile >= threshold;
            let ids = registry.rank_bucket(percentile).to_vec();
            for id in ids {
                if let Some(flags) = registry.flags_mut(id) {
                    if flags.highlighted != highlighted {
                        flags.highlighted = highlighted;
                        change.push(id, highlighted);
                    }
                }
            }
        }
        change.finish()
    }

    /// Reveal the sentences mentioning a keyword, or hide them again if the
    /// keyword was already active.
    ///
    /// A sentence stays keyworded while any other active keyword still marks
    /// it.
    pub fn toggle_keyword(&mut self, registry: &mut SentenceRegistry, keyword: &str) -> FilterChange {
        let activate = !self.keywords.contains(keyword);
        if activate {
            self.keywords.insert(keyword.to_string());
        } else {
            self.keywords.remove(keyword);
        }

        let affected: Vec<SentenceId> = registry.sentences_with_keyword(keyword).collect();
        let mut change = FilterChange::default();
        for id in affected {
            let keyworded = activate
                || registry
                    .get(id)
                    .is_some_and(|sentence| self.keywords.iter().any(|k| sentence.has_keyword(k)));
            if let Some(flags) = registry.flags_mut(id) {
                if flags.keyworded != keyworded {
                    flags.keyworded = keyworded;
                    change.push(id, keyworded);
                }
            }
        }
        change.finish()
    }
}

/// Star or unstar a sentence. Returns whether the flag changed.
///
/// Stars never affect visibility, so no reflow is needed.
pub fn set_star(registry: &mut SentenceRegistry, id: SentenceId, starred: bool) -> bool {
    match registry.flags_mut(id) {
        Some(flags) if flags.starred != starred => {
            flags.starred = starred;
            true
        }
        _ => false,
    }
}
