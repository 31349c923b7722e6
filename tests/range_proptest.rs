//! Property-based tests for ranges and overlay geometry
//!
//! - serialized ranges resolve back to the same segments
//! - rendering twice without a layout change yields identical segments
//! - single-sentence segments run top to bottom and stay inside the content box,
//!   even when a word is wider than the line

use precis::layout::{MonospaceLayout, TextLayout};
use precis::overlay::{OverlayLayer, OverlayRenderer, StyleTag};
use precis::registry::{tokenize, Rank, Sentence};
use precis::{Range, SentenceId, SentenceRegistry};
use precis_config::LayoutConfig;
use proptest::prelude::*;
use proptest::sample::Index;

/// Generate sentences of words, including non-ASCII letters and words longer
/// than the narrowest layouts below
fn sentence_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Zäöüß']{1,24}", 1..7)
        .prop_map(|words| format!("{}.", words.join(" ")))
}

fn document_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(sentence_strategy(), 1..5)
}

/// A document plus two `(sentence, offset)` endpoints in document order
fn endpoints_strategy() -> impl Strategy<Value = (Vec<String>, (usize, usize), (usize, usize))> {
    document_strategy().prop_flat_map(|texts| {
        let count = texts.len();
        (
            Just(texts),
            (0..count, any::<Index>()),
            (0..count, any::<Index>()),
        )
            .prop_map(|(texts, a, b)| {
                let at = |(sentence, index): (usize, Index)| {
                    (sentence, index.index(texts[sentence].chars().count() + 1))
                };
                let (a, b) = (at(a), at(b));
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                (texts, start, end)
            })
    })
}

fn registry(texts: &[String]) -> SentenceRegistry {
    let mut registry = SentenceRegistry::new(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Sentence::new(SentenceId(i), 0, Rank::new(90), tokenize(text)))
            .collect(),
    );
    // Everything ranked 90 is shown at the default threshold
    precis::filter::Filter::new(80).apply_threshold(&mut registry, 80);
    registry
}

fn metrics(columns: usize) -> LayoutConfig {
    LayoutConfig {
        columns,
        char_width: 8.0,
        line_height: 20.0,
        paragraph_spacing: 12.0,
    }
}

proptest! {
    #[test]
    fn serialized_ranges_round_trip((texts, start, end) in endpoints_strategy()) {
        let reg = registry(&texts);
        let range = Range::spanning(
            &reg,
            (SentenceId(start.0), start.1),
            (SentenceId(end.0), end.1),
        )
        .unwrap();

        let stored = range.serialize(&reg).unwrap();
        let restored = Range::deserialize(&stored, &reg).unwrap();
        prop_assert_eq!(&restored, &range);
        prop_assert_eq!(restored.serialize(&reg).unwrap(), stored);
    }

    #[test]
    fn render_is_idempotent(
        (texts, start, end) in endpoints_strategy(),
        columns in 4usize..40,
    ) {
        let reg = registry(&texts);
        let layout = MonospaceLayout::with_registry(metrics(columns), &reg);
        let range = Range::spanning(
            &reg,
            (SentenceId(start.0), start.1),
            (SentenceId(end.0), end.1),
        )
        .unwrap();

        let mut renderer = OverlayRenderer::new(OverlayLayer::new(), StyleTag::new("control"));
        let id = renderer.create(range, StyleTag::new("selection"), &reg, &layout);
        let first = renderer.get(id).unwrap().segments().to_vec();
        let second = renderer.render(id, &reg, &layout).unwrap().to_vec();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_sentence_segments_are_monotonic(
        text in sentence_strategy(),
        columns in 4usize..40,
        a in any::<Index>(),
        b in any::<Index>(),
    ) {
        let reg = registry(std::slice::from_ref(&text));
        let layout = MonospaceLayout::with_registry(metrics(columns), &reg);
        let len = text.chars().count();
        let (a, b) = (a.index(len + 1), b.index(len + 1));
        let range = Range::single(SentenceId(0), a.min(b), a.max(b)).unwrap();

        let mut renderer = OverlayRenderer::new(OverlayLayer::new(), StyleTag::new("control"));
        let id = renderer.create(range.clone(), StyleTag::new("selection"), &reg, &layout);
        let segments = renderer.get(id).unwrap().segments();

        for pair in segments.windows(2) {
            prop_assert!(pair[0].rect.top < pair[1].rect.top);
        }
        let total: f64 = segments.iter().map(|segment| segment.rect.width).sum();
        prop_assert!(total <= range.segments()[0].len() as f64 * 8.0);
        for segment in segments {
            prop_assert!(segment.rect.width <= layout.content_width());
        }

        // Overlays never touch the sentence text
        renderer.remove(id);
        prop_assert_eq!(reg.text(SentenceId(0)).unwrap(), text);
    }
}
