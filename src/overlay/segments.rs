//! Segment computation and hit testing
//!
//! Turns a [`Range`] into one rectangle per wrapped line:
//!
//! 1. the selected text of every segment is split into word/separator pieces;
//! 2. each piece is measured through the layout host, yielding one fragment
//!    per line it touches;
//! 3. consecutive fragments sharing a top offset merge into one segment, a new
//!    top starts a new segment;
//! 4. zero-area segments (whitespace collapsed at a wrap) are dropped;
//! 5. the extent of all segments is kept for placing attached controls.

use super::words;
use crate::layout::{Point, Rect, TextLayout};
use crate::range::Range;
use crate::registry::SentenceRegistry;
use std::fmt;

/// One wrapped line of a highlighted range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySegment {
    pub rect: Rect,
}

impl fmt::Display for OverlaySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rect, f)
    }
}

/// Result of measuring a range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub segments: Vec<OverlaySegment>,
    /// Bounding box of all segments, `None` when nothing is visible
    pub extent: Option<Rect>,
}

/// Measure the line segments of a range against the current layout.
///
/// Sentences that are hidden contribute nothing; a range with no visible text
/// measures to an empty segment list, which is not an error.
pub fn measure(range: &Range, registry: &SentenceRegistry, layout: &dyn TextLayout) -> Measurement {
    let mut lines: Vec<Rect> = Vec::new();

    for segment in range.segments() {
        if segment.is_empty() || !registry.is_visible(segment.sentence) {
            continue;
        }
        let Some(text) = registry.text(segment.sentence) else {
            continue;
        };
        let selected: String = text
            .chars()
            .skip(segment.start)
            .take(segment.len())
            .collect();

        for piece in words::split(&selected) {
            let chars = segment.start + piece.start..segment.start + piece.end;
            for fragment in layout.fragments(segment.sentence, chars) {
                match lines.last_mut() {
                    Some(line) if line.top == fragment.top => *line = line.union(&fragment),
                    _ => lines.push(fragment),
                }
            }
        }
    }

    lines.retain(|rect| rect.area() > 0.0);
    let extent = Rect::bounding_box(lines.iter());
    Measurement {
        segments: lines.into_iter().map(|rect| OverlaySegment { rect }).collect(),
        extent,
    }
}

/// Point-in-rectangle test against recorded segment boxes
pub fn hit_test(segments: &[OverlaySegment], point: Point) -> Option<usize> {
    segments
        .iter()
        .position(|segment| segment.rect.contains(point))
}

/// Index of the segment closest to a point
pub fn nearest(segments: &[OverlaySegment], point: Point) -> Option<usize> {
    segments
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.rect
                .distance_to(point)
                .total_cmp(&b.rect.distance_to(point))
        })
        .map(|(index, _)| index)
}
