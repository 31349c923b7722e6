//! Overlay surface: where overlay elements live
//!
//! Overlay elements are positioned boxes drawn over the article, never spliced
//! into the sentence text. Keeping them on a separate surface is what keeps the
//! plain text of a sentence unchanged while it is highlighted.

use super::{ControlKind, OverlayId};
use crate::layout::Rect;
use std::collections::BTreeMap;
use std::fmt;

/// Handle of an element placed on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// CSS state class of an overlay element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleTag(String);

impl StyleTag {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an element on the surface represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// One wrapped line of an overlay
    Segment { overlay: OverlayId, index: usize },
    /// A floating control attached to an overlay
    Control { overlay: OverlayId, kind: ControlKind },
}

/// A positioned element. The rectangle doubles as the recorded geometry used
/// for hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    pub role: ElementRole,
    pub rect: Rect,
    pub style: StyleTag,
}

/// Host surface that owns overlay elements
pub trait OverlaySurface {
    fn insert(&mut self, element: OverlayElement) -> ElementId;

    /// Detach an element. Returns false if it was already gone.
    fn remove(&mut self, id: ElementId) -> bool;

    /// Swap the style class of an element without moving it
    fn restyle(&mut self, id: ElementId, style: &StyleTag) -> bool;
}

/// In-memory surface
#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    elements: BTreeMap<ElementId, OverlayElement>,
    next_id: u64,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&OverlayElement> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &OverlayElement)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }

    /// Elements belonging to one overlay, segments first
    pub fn elements_of(&self, overlay: OverlayId) -> Vec<&OverlayElement> {
        let mut found: Vec<&OverlayElement> = self
            .elements
            .values()
            .filter(|element| match element.role {
                ElementRole::Segment { overlay: owner, .. } => owner == overlay,
                ElementRole::Control { overlay: owner, .. } => owner == overlay,
            })
            .collect();
        found.sort_by_key(|element| matches!(element.role, ElementRole::Control { .. }));
        found
    }
}

impl OverlaySurface for OverlayLayer {
    fn insert(&mut self, element: OverlayElement) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    fn remove(&mut self, id: ElementId) -> bool {
        self.elements.remove(&id).is_some()
    }

    fn restyle(&mut self, id: ElementId, style: &StyleTag) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                element.style = style.clone();
                true
            }
            None => false,
        }
    }
}
