//! Interaction state of a document view

use crate::layout::Point;
use crate::overlay::OverlayId;
use crate::range::Range;
use crate::registry::SentenceId;
use std::time::Instant;

/// What the pointer event landed on, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Sentence text
    Sentence(SentenceId),
    /// A keyword inside a sentence
    Keyword { sentence: SentenceId, keyword: String },
    /// The floating control of an overlay
    Control(OverlayId),
    /// A segment of an overlay
    Overlay(OverlayId),
    /// Anywhere else inside the document content
    Content,
    /// Outside the document content
    Outside,
}

impl PointerTarget {
    pub fn is_inside(&self) -> bool {
        !matches!(self, PointerTarget::Outside)
    }
}

/// Caret positions of the host's native text selection.
///
/// `anchor` is where the drag started, `focus` where it ended; either may come
/// first in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeSelection {
    pub anchor: (SentenceId, usize),
    pub focus: (SentenceId, usize),
}

impl NativeSelection {
    pub fn new(anchor: (SentenceId, usize), focus: (SentenceId, usize)) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// The transient selection overlay and its range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSelection {
    pub overlay: OverlayId,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointer is down; selection vs. click is decided on release
    Tracking {
        origin: Point,
        target: PointerTarget,
        since: Instant,
        /// Selection kept alive while its control is being pressed
        pending: Option<ActiveSelection>,
    },
    /// A selection overlay with its add-note control is showing
    Selected(ActiveSelection),
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Tracking { .. } => "tracking",
            InteractionState::Selected(_) => "selected",
        }
    }

    pub fn selection(&self) -> Option<&ActiveSelection> {
        match self {
            InteractionState::Selected(selection) => Some(selection),
            InteractionState::Tracking { pending, .. } => pending.as_ref(),
            InteractionState::Idle => None,
        }
    }
}

/// What a pointer release resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// No press was being tracked
    Ignored,
    /// A selection overlay was created
    Selected(OverlayId),
    /// The native selection clipped to nothing and was discarded
    SelectionDiscarded,
    /// A plain click, dispatched to its target
    Clicked(PointerTarget),
    /// The add-note control converted the selection into a note
    NoteAdded(crate::notes::NoteId),
}
