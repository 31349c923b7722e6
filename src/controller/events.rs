//! Typed document events and observer seams

use crate::notes::NoteId;
use crate::registry::SentenceId;

/// Something that changed in a document view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Highlighted(SentenceId),
    Unhighlighted(SentenceId),
    Expanded(SentenceId),
    Collapsed(SentenceId),
    Starred(SentenceId),
    Unstarred(SentenceId),
    NoteAdded(NoteId),
    NoteRemoved(NoteId),
}

/// Receives every [`DocumentEvent`] of a controller
pub trait DocumentObserver {
    fn on_event(&mut self, event: &DocumentEvent);
}

impl<F: FnMut(&DocumentEvent)> DocumentObserver for F {
    fn on_event(&mut self, event: &DocumentEvent) {
        self(event)
    }
}

/// Told when sentence geometry changed from a sentence onwards, after the
/// affected overlays were re-rendered
pub trait LayoutObserver {
    fn on_layout_changed(&mut self, from: SentenceId);
}

impl<F: FnMut(SentenceId)> LayoutObserver for F {
    fn on_layout_changed(&mut self, from: SentenceId) {
        self(from)
    }
}
