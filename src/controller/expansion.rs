//! Expand/collapse state machine
//!
//! Expanding a sentence reveals its hidden neighbours inside the same
//! paragraph, marking them as `expansion`. Collapsing clears `expanded` and
//! recomputes the `expansion` marks of the paragraph: a neighbour stays
//! revealed while another expanded sentence still borders it.
//!
//! Only the flags change here. Host transitions and reflow propagation are
//! driven by the controller.

use crate::registry::{SentenceId, SentenceRegistry};
use tokio::sync::oneshot;

/// Flags changed by one expand or collapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionChange {
    pub sentence: SentenceId,
    /// Sentences that became visible
    pub revealed: Vec<SentenceId>,
    /// Sentences that became hidden
    pub hidden: Vec<SentenceId>,
    /// Earliest sentence whose geometry may have moved
    pub from: SentenceId,
}

/// Host animation of an expand or collapse.
///
/// The returned receiver completes when the transition has finished; a
/// dropped sender also counts as finished.
pub trait TransitionDriver {
    fn begin(&mut self, change: &ExpansionChange) -> oneshot::Receiver<()>;
}

/// Transitions that complete at once
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl TransitionDriver for Immediate {
    fn begin(&mut self, _change: &ExpansionChange) -> oneshot::Receiver<()> {
        let (done, finished) = oneshot::channel();
        let _ = done.send(());
        finished
    }
}

/// Mark a sentence expanded. `None` when it already was, or is unknown.
pub fn expand(registry: &mut SentenceRegistry, id: SentenceId) -> Option<ExpansionChange> {
    let flags = registry.flags_mut(id)?;
    if flags.expanded {
        return None;
    }
    flags.expanded = true;

    let (prev, next) = registry.paragraph_neighbors(id);
    let mut revealed = Vec::new();
    for neighbour in [prev, next].into_iter().flatten() {
        if let Some(flags) = registry.flags_mut(neighbour) {
            if !flags.is_visible() {
                flags.expansion = true;
                revealed.push(neighbour);
            }
        }
    }

    let from = revealed.first().copied().filter(|first| *first < id).unwrap_or(id);
    Some(ExpansionChange {
        sentence: id,
        revealed,
        hidden: Vec::new(),
        from,
    })
}

/// Clear a sentence's expanded mark. `None` when it was not expanded.
pub fn collapse(registry: &mut SentenceRegistry, id: SentenceId) -> Option<ExpansionChange> {
    let flags = registry.flags_mut(id)?;
    if !flags.expanded {
        return None;
    }
    flags.expanded = false;

    let paragraph = registry.paragraph_of(id)?;
    let members: Vec<SentenceId> = registry.paragraph(paragraph).map(|s| s.id).collect();
    let mut hidden = Vec::new();
    for member in members {
        let (prev, next) = registry.paragraph_neighbors(member);
        let bordered = [prev, next]
            .into_iter()
            .flatten()
            .any(|neighbour| registry.flags(neighbour).is_some_and(|f| f.expanded));
        if let Some(flags) = registry.flags_mut(member) {
            if flags.expansion && !bordered {
                flags.expansion = false;
                if !flags.is_visible() {
                    hidden.push(member);
                }
            }
        }
    }

    let from = hidden.first().copied().filter(|first| *first < id).unwrap_or(id);
    Some(ExpansionChange {
        sentence: id,
        revealed: Vec::new(),
        hidden,
        from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{tokenize, Rank, Sentence};

    /// Sentences `(paragraph, highlighted)`
    fn registry(specs: &[(usize, bool)]) -> SentenceRegistry {
        let mut registry = SentenceRegistry::new(
            specs
                .iter()
                .enumerate()
                .map(|(i, (paragraph, _))| {
                    Sentence::new(SentenceId(i), *paragraph, Rank::new(50), tokenize("Text."))
                })
                .collect(),
        );
        for (i, (_, highlighted)) in specs.iter().enumerate() {
            registry.flags_mut(SentenceId(i)).unwrap().highlighted = *highlighted;
        }
        registry
    }

    #[test]
    fn test_expand_reveals_hidden_paragraph_neighbours() {
        let mut reg = registry(&[(0, false), (0, true), (0, false), (1, false)]);
        let change = expand(&mut reg, SentenceId(1)).unwrap();
        assert_eq!(change.revealed, vec![SentenceId(0), SentenceId(2)]);
        assert_eq!(change.from, SentenceId(0));
        assert!(reg.flags(SentenceId(0)).unwrap().expansion);
        // Next paragraph is untouched
        assert!(!reg.is_visible(SentenceId(3)));
        assert_eq!(expand(&mut reg, SentenceId(1)), None);
    }

    #[test]
    fn test_visible_neighbours_are_not_marked() {
        let mut reg = registry(&[(0, true), (0, true)]);
        let change = expand(&mut reg, SentenceId(1)).unwrap();
        assert!(change.revealed.is_empty());
        assert_eq!(change.from, SentenceId(1));
        assert!(!reg.flags(SentenceId(0)).unwrap().expansion);
    }

    #[test]
    fn test_single_sentence_paragraph_has_nothing_to_reveal() {
        let mut reg = registry(&[(0, false), (1, true), (2, false)]);
        let change = expand(&mut reg, SentenceId(1)).unwrap();
        assert!(change.revealed.is_empty());
        assert!(!reg.is_visible(SentenceId(0)));
        assert!(!reg.is_visible(SentenceId(2)));
    }

    #[test]
    fn test_collapse_keeps_sentences_bordered_by_another_expansion() {
        let mut reg = registry(&[(0, true), (0, false), (0, true), (0, false)]);
        expand(&mut reg, SentenceId(0)).unwrap();
        expand(&mut reg, SentenceId(2)).unwrap();
        assert!(reg.is_visible(SentenceId(1)));
        assert!(reg.is_visible(SentenceId(3)));

        let change = collapse(&mut reg, SentenceId(2)).unwrap();
        assert_eq!(change.hidden, vec![SentenceId(3)]);
        assert_eq!(change.from, SentenceId(2));
        // Sentence 1 still borders expanded sentence 0
        assert!(reg.is_visible(SentenceId(1)));

        let change = collapse(&mut reg, SentenceId(0)).unwrap();
        assert_eq!(change.hidden, vec![SentenceId(1)]);
        assert_eq!(collapse(&mut reg, SentenceId(0)), None);
    }

    #[tokio::test]
    async fn test_immediate_transition_completes() {
        let change = ExpansionChange {
            sentence: SentenceId(0),
            revealed: Vec::new(),
            hidden: Vec::new(),
            from: SentenceId(0),
        };
        assert!(Immediate.begin(&change).await.is_ok());
    }
}
