//! Notes and comments
//!
//! A [`Note`] owns the ranges it annotates, the comments attached to it and
//! the "tagged" overlays drawn for those ranges. Notes are created by the
//! selection controller from a finished selection or restored from an
//! [`AnnotationStore`](store::AnnotationStore).

pub mod store;

use crate::overlay::OverlayId;
use crate::range::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of a note within one document view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A comment left on a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    /// Unix timestamp, seconds
    pub created: u64,
}

impl Comment {
    /// A comment stamped with the current time
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Self::at(author, text, created)
    }

    pub fn at(author: impl Into<String>, text: impl Into<String>, created: u64) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            created,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub ranges: Vec<Range>,
    pub comments: Vec<Comment>,
    /// Tagged overlays, one per range
    pub overlays: Vec<OverlayId>,
}

/// All notes of one document view
#[derive(Debug, Clone, Default)]
pub struct NoteBook {
    notes: BTreeMap<NoteId, Note>,
    next_id: u64,
}

impl NoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ranges: Vec<Range>, comments: Vec<Comment>) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.insert(
            id,
            Note {
                id,
                ranges,
                comments,
                overlays: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.get_mut(&id)
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        self.notes.remove(&id)
    }

    /// Notes in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The note owning a tagged overlay
    pub fn note_for_overlay(&self, overlay: OverlayId) -> Option<NoteId> {
        self.notes
            .values()
            .find(|note| note.overlays.contains(&overlay))
            .map(|note| note.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SentenceId;

    #[test]
    fn test_ids_are_not_reused() {
        let mut book = NoteBook::new();
        let range = Range::single(SentenceId(0), 0, 3).unwrap();
        let first = book.add(vec![range.clone()], Vec::new());
        book.remove(first);
        let second = book.add(vec![range], Vec::new());
        assert_ne!(first, second);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_note_for_overlay() {
        let mut book = NoteBook::new();
        let id = book.add(Vec::new(), vec![Comment::at("ann", "hello", 10)]);
        book.get_mut(id).unwrap().overlays.push(OverlayId(7));
        assert_eq!(book.note_for_overlay(OverlayId(7)), Some(id));
        assert_eq!(book.note_for_overlay(OverlayId(8)), None);
    }

    #[test]
    fn test_comment_round_trips_through_json() {
        let comment = Comment::at("ann", "worth a look", 1_700_000_000);
        let json = serde_json::to_string(&comment).unwrap();
        assert_eq!(
            json,
            r#"{"author":"ann","text":"worth a look","created":1700000000}"#
        );
        assert_eq!(serde_json::from_str::<Comment>(&json).unwrap(), comment);
    }
}
