//! Fixed-advance reference layout
//!
//! Lays visible sentences out as inline flow inside their paragraph, every
//! character one column wide, with greedy word wrapping:
//!
//! - a run of non-whitespace characters moves to the next line when it does not
//!   fit, and a run wider than a whole line breaks at the column limit;
//! - whitespace never starts a line: spaces past the last column collapse to
//!   zero width at the line end;
//! - consecutive visible sentences are separated by one column;
//! - hidden sentences take no space at all;
//! - each paragraph starts a new line, separated by `paragraph_spacing`.

use super::{Point, Rect, TextLayout};
use crate::registry::{Sentence, SentenceId, SentenceRegistry};
use precis_config::LayoutConfig;
use std::collections::HashMap;
use std::ops::Range as CharRange;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Glyph {
    left: f64,
    top: f64,
    width: f64,
}

/// Deterministic monospace layout of a sentence registry
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    metrics: LayoutConfig,
    glyphs: HashMap<SentenceId, Vec<Glyph>>,
    height: f64,
}

impl MonospaceLayout {
    pub fn new(metrics: LayoutConfig) -> Self {
        Self {
            metrics,
            glyphs: HashMap::new(),
            height: 0.0,
        }
    }

    /// Create a layout and flow the registry into it
    pub fn with_registry(metrics: LayoutConfig, registry: &SentenceRegistry) -> Self {
        let mut layout = Self::new(metrics);
        layout.reflow(registry);
        layout
    }

    pub fn metrics(&self) -> &LayoutConfig {
        &self.metrics
    }

    /// Total height of the laid out content
    pub fn content_height(&self) -> f64 {
        self.height
    }

    /// Bounding box of a visible sentence
    pub fn sentence_bounds(&self, sentence: SentenceId) -> Option<Rect> {
        let glyphs = self.glyphs.get(&sentence)?;
        let rects: Vec<Rect> = glyphs.iter().map(|glyph| self.glyph_rect(glyph)).collect();
        Rect::bounding_box(rects.iter())
    }

    /// Caret position under a point: the sentence and the character offset
    /// closest to it, rounding to the nearer glyph edge.
    pub fn caret_at(&self, point: Point) -> Option<(SentenceId, usize)> {
        self.glyphs.iter().find_map(|(id, glyphs)| {
            glyphs.iter().enumerate().find_map(|(index, glyph)| {
                let rect = self.glyph_rect(glyph);
                if glyph.width == 0.0 || !rect.contains(point) {
                    return None;
                }
                let after = point.x >= rect.left + rect.width / 2.0;
                Some((*id, if after { index + 1 } else { index }))
            })
        })
    }

    fn glyph_rect(&self, glyph: &Glyph) -> Rect {
        Rect::new(glyph.left, glyph.top, glyph.width, self.metrics.line_height)
    }

    fn flow_sentence(&self, sentence: &Sentence, cursor: &mut Cursor) -> Vec<Glyph> {
        let columns = self.metrics.columns.max(1);
        let advance = self.metrics.char_width;
        let mut glyphs = Vec::with_capacity(sentence.char_len());

        let mut tokens = sentence.tokens.iter().peekable();
        while let Some(token) = tokens.next() {
            if token.is_whitespace() {
                for _ in 0..token.len {
                    if cursor.column < columns {
                        glyphs.push(Glyph {
                            left: cursor.column as f64 * advance,
                            top: cursor.top,
                            width: advance,
                        });
                        cursor.column += 1;
                    } else {
                        glyphs.push(Glyph {
                            left: columns as f64 * advance,
                            top: cursor.top,
                            width: 0.0,
                        });
                    }
                }
                continue;
            }

            // Group adjacent non-whitespace tokens into one unbreakable run
            let mut run = token.len;
            while let Some(next) = tokens.peek() {
                if next.is_whitespace() {
                    break;
                }
                run += next.len;
                tokens.next();
            }

            if cursor.column > 0 && cursor.column + run > columns {
                cursor.top += self.metrics.line_height;
                cursor.column = 0;
            }
            for _ in 0..run {
                // A run wider than the line breaks at the column limit
                if cursor.column >= columns {
                    cursor.top += self.metrics.line_height;
                    cursor.column = 0;
                }
                glyphs.push(Glyph {
                    left: cursor.column as f64 * advance,
                    top: cursor.top,
                    width: advance,
                });
                cursor.column += 1;
            }
        }

        glyphs
    }
}

struct Cursor {
    top: f64,
    column: usize,
}

impl TextLayout for MonospaceLayout {
    fn reflow(&mut self, registry: &SentenceRegistry) {
        let columns = self.metrics.columns.max(1);
        let mut glyphs = HashMap::new();
        let mut cursor = Cursor {
            top: 0.0,
            column: 0,
        };
        let mut paragraph = None;
        let mut paragraph_used = false;

        for sentence in registry.iter() {
            if paragraph != Some(sentence.paragraph) {
                if paragraph_used {
                    cursor.top += self.metrics.line_height + self.metrics.paragraph_spacing;
                }
                cursor.column = 0;
                paragraph = Some(sentence.paragraph);
                paragraph_used = false;
            }
            if !sentence.is_visible() {
                continue;
            }
            if paragraph_used && cursor.column > 0 && cursor.column < columns {
                cursor.column += 1;
            }
            glyphs.insert(sentence.id, self.flow_sentence(sentence, &mut cursor));
            paragraph_used = true;
        }

        if paragraph_used {
            cursor.top += self.metrics.line_height;
        }
        self.glyphs = glyphs;
        self.height = cursor.top;
    }

    fn fragments(&self, sentence: SentenceId, chars: CharRange<usize>) -> Vec<Rect> {
        let Some(glyphs) = self.glyphs.get(&sentence) else {
            return Vec::new();
        };
        let end = chars.end.min(glyphs.len());
        let start = chars.start.min(end);

        let mut fragments: Vec<Rect> = Vec::new();
        for glyph in &glyphs[start..end] {
            let rect = self.glyph_rect(glyph);
            match fragments.last_mut() {
                Some(last) if last.top == rect.top => *last = last.union(&rect),
                _ => fragments.push(rect),
            }
        }
        fragments
    }

    fn content_width(&self) -> f64 {
        self.metrics.columns as f64 * self.metrics.char_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{tokenize, Rank};

    fn metrics(columns: usize) -> LayoutConfig {
        LayoutConfig {
            columns,
            char_width: 8.0,
            line_height: 20.0,
            paragraph_spacing: 10.0,
        }
    }

    fn visible_registry(specs: &[(usize, &str)]) -> SentenceRegistry {
        let mut registry = SentenceRegistry::new(
            specs
                .iter()
                .enumerate()
                .map(|(i, (paragraph, text))| {
                    Sentence::new(SentenceId(i), *paragraph, Rank::new(90), tokenize(text))
                })
                .collect(),
        );
        for sentence in registry.iter_mut() {
            sentence.flags.highlighted = true;
        }
        registry
    }

    #[test]
    fn test_wraps_whole_words() {
        let registry = visible_registry(&[(0, "The quick fox jumps.")]);
        let layout = MonospaceLayout::with_registry(metrics(10), &registry);

        // "The quick " fills the first line, "fox jumps." the second
        assert_eq!(
            layout.fragments(SentenceId(0), 4..9),
            vec![Rect::new(32.0, 0.0, 40.0, 20.0)]
        );
        assert_eq!(
            layout.fragments(SentenceId(0), 10..13),
            vec![Rect::new(0.0, 20.0, 24.0, 20.0)]
        );
        assert_eq!(
            layout.fragments(SentenceId(0), 4..13),
            vec![
                Rect::new(32.0, 0.0, 48.0, 20.0),
                Rect::new(0.0, 20.0, 24.0, 20.0)
            ]
        );
        assert_eq!(layout.content_height(), 40.0);
    }

    #[test]
    fn test_overlong_word_breaks_at_column_limit() {
        let registry = visible_registry(&[(0, "Incomprehensibilities.")]);
        let layout = MonospaceLayout::with_registry(metrics(10), &registry);
        assert_eq!(
            layout.fragments(SentenceId(0), 0..22),
            vec![
                Rect::new(0.0, 0.0, 80.0, 20.0),
                Rect::new(0.0, 20.0, 80.0, 20.0),
                Rect::new(0.0, 40.0, 16.0, 20.0)
            ]
        );
        assert_eq!(layout.content_height(), 60.0);
    }

    #[test]
    fn test_overlong_word_after_text_starts_a_fresh_line() {
        let registry = visible_registry(&[(0, "An extraordinarily long word.")]);
        let layout = MonospaceLayout::with_registry(metrics(10), &registry);
        // "extraordinarily" (15) moves off the first line, then breaks after 10
        assert_eq!(
            layout.fragments(SentenceId(0), 3..18),
            vec![
                Rect::new(0.0, 20.0, 80.0, 20.0),
                Rect::new(0.0, 40.0, 40.0, 20.0)
            ]
        );
    }

    #[test]
    fn test_trailing_space_collapses_at_line_end() {
        let registry = visible_registry(&[(0, "abcd efgh")]);
        let layout = MonospaceLayout::with_registry(metrics(4), &registry);
        let fragments = layout.fragments(SentenceId(0), 4..5);
        assert_eq!(fragments, vec![Rect::new(32.0, 0.0, 0.0, 20.0)]);
        assert_eq!(
            layout.fragments(SentenceId(0), 5..9),
            vec![Rect::new(0.0, 20.0, 32.0, 20.0)]
        );
    }

    #[test]
    fn test_hidden_sentences_take_no_space() {
        let mut registry = visible_registry(&[(0, "One."), (0, "Two."), (0, "Three.")]);
        registry.flags_mut(SentenceId(1)).unwrap().highlighted = false;
        let layout = MonospaceLayout::with_registry(metrics(40), &registry);

        assert!(layout.fragments(SentenceId(1), 0..4).is_empty());
        // "One." then a one column gap, then "Three."
        assert_eq!(
            layout.fragments(SentenceId(2), 0..6),
            vec![Rect::new(40.0, 0.0, 48.0, 20.0)]
        );
    }

    #[test]
    fn test_paragraphs_start_new_lines() {
        let registry = visible_registry(&[(0, "One."), (1, "Two.")]);
        let layout = MonospaceLayout::with_registry(metrics(40), &registry);
        assert_eq!(
            layout.sentence_bounds(SentenceId(1)),
            Some(Rect::new(0.0, 30.0, 32.0, 20.0))
        );
        assert_eq!(layout.content_height(), 50.0);
    }

    #[test]
    fn test_caret_at_rounds_to_nearest_edge() {
        let registry = visible_registry(&[(0, "Hello world")]);
        let layout = MonospaceLayout::with_registry(metrics(40), &registry);
        assert_eq!(
            layout.caret_at(Point::new(9.0, 5.0)),
            Some((SentenceId(0), 1))
        );
        assert_eq!(
            layout.caret_at(Point::new(13.0, 5.0)),
            Some((SentenceId(0), 2))
        );
        assert_eq!(layout.caret_at(Point::new(500.0, 5.0)), None);
    }
}
