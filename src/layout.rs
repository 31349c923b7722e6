//! Layout host seam
//!
//! The overlay renderer never looks at pixels itself. It asks a [`TextLayout`]
//! where a run of sentence characters lands, the way a browser answers for an
//! invisible proxy span sized by the preceding text. Hosts embedding the engine
//! in a real page implement the trait over live measurement;
//! [`MonospaceLayout`] is a deterministic reference implementation used by the
//! CLI and the tests.

pub mod geometry;
pub mod monospace;

pub use geometry::{Point, Rect};
pub use monospace::MonospaceLayout;

use crate::registry::{SentenceId, SentenceRegistry};
use std::ops::Range as CharRange;

/// Measures where sentence text renders
pub trait TextLayout {
    /// Recompute geometry after visibility flags changed.
    ///
    /// Called by the controller after it mutated the registry and before any
    /// overlay is re-rendered.
    fn reflow(&mut self, registry: &SentenceRegistry);

    /// Line fragments covered by `chars` (character offsets into the sentence
    /// text), one rectangle per visual line, in visual order.
    ///
    /// Hidden sentences have no fragments.
    fn fragments(&self, sentence: SentenceId, chars: CharRange<usize>) -> Vec<Rect>;

    /// Width of the content container
    fn content_width(&self) -> f64;
}
