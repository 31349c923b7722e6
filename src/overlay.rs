//! Overlay renderer
//!
//! Draws ranges as positioned boxes, one per wrapped line, on an
//! [`OverlaySurface`] kept apart from the sentence text. Geometry comes from
//! [`segments::measure`]; this module owns the overlays, their surface elements
//! and any floating control attached to them.
//!
//! Segment boxes are recorded when an overlay renders and hit testing uses
//! those recorded boxes, not live layout. After anything reflows the overlay
//! must be rendered again before hits are accurate; the controller takes care
//! of that.

pub mod segments;
pub mod surface;
pub mod words;

pub use segments::{hit_test, measure, Measurement, OverlaySegment};
pub use surface::{ElementId, ElementRole, OverlayElement, OverlayLayer, OverlaySurface, StyleTag};

use crate::layout::{Point, Rect, TextLayout};
use crate::range::Range;
use crate::registry::SentenceRegistry;
use std::collections::BTreeMap;
use tracing::trace;

/// Handle of an overlay owned by an [`OverlayRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Floating controls that can be attached to an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Turns the current selection into a note
    AddNote,
    /// Contextual menu of a tagged note, shown on hover
    NoteMenu,
}

/// Which side of a segment a control sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

/// A control attached to an overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub kind: ControlKind,
    pub rect: Rect,
    segment: usize,
    edge: Edge,
    size: (f64, f64),
    element: ElementId,
}

impl Control {
    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn segment(&self) -> usize {
        self.segment
    }
}

/// A rendered range
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    id: OverlayId,
    range: Range,
    style: StyleTag,
    measurement: Measurement,
    elements: Vec<ElementId>,
    control: Option<Control>,
    generation: u64,
}

impl Overlay {
    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn style(&self) -> &StyleTag {
        &self.style
    }

    pub fn segments(&self) -> &[OverlaySegment] {
        &self.measurement.segments
    }

    /// Bounding box of all segments. Attached controls stay inside it
    /// vertically.
    pub fn extent(&self) -> Option<Rect> {
        self.measurement.extent
    }

    pub fn control(&self) -> Option<&Control> {
        self.control.as_ref()
    }

    /// Number of times the overlay geometry has been computed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hit_test(&self, point: Point) -> Option<usize> {
        hit_test(self.segments(), point)
    }
}

/// Place a control of `size` beside a segment.
///
/// The control is centred on the segment's line, then kept vertically inside
/// the overlay's extent so it never pokes above the first line or below the
/// last one.
fn control_rect(segment: &Rect, extent: &Rect, edge: Edge, size: (f64, f64)) -> Rect {
    let (width, height) = size;
    let left = match edge {
        Edge::Left => (segment.left - width).max(0.0),
        Edge::Right => segment.right(),
    };
    let centred = segment.top + (segment.height - height) / 2.0;
    let top = centred.min(extent.bottom() - height).max(extent.top);
    Rect::new(left, top, width, height)
}

/// Owns overlays and their elements on a surface
#[derive(Debug)]
pub struct OverlayRenderer<S: OverlaySurface> {
    surface: S,
    overlays: BTreeMap<OverlayId, Overlay>,
    control_style: StyleTag,
    next_id: u64,
}

impl<S: OverlaySurface> OverlayRenderer<S> {
    pub fn new(surface: S, control_style: StyleTag) -> Self {
        Self {
            surface,
            overlays: BTreeMap::new(),
            control_style,
            next_id: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Register a range under a style and render it
    pub fn create(
        &mut self,
        range: Range,
        style: StyleTag,
        registry: &SentenceRegistry,
        layout: &dyn TextLayout,
    ) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays.insert(
            id,
            Overlay {
                id,
                range,
                style,
                measurement: Measurement::default(),
                elements: Vec::new(),
                control: None,
                generation: 0,
            },
        );
        self.render(id, registry, layout);
        id
    }

    /// Recompute an overlay's segments and replace its elements.
    ///
    /// Idempotent: rendering twice without a layout change yields the same
    /// segments. An attached control follows its segment, and is dropped when
    /// that segment no longer exists.
    pub fn render(
        &mut self,
        id: OverlayId,
        registry: &SentenceRegistry,
        layout: &dyn TextLayout,
    ) -> Option<&[OverlaySegment]> {
        let overlay = self.overlays.get_mut(&id)?;
        let measurement = measure(&overlay.range, registry, layout);

        for element in overlay.elements.drain(..) {
            self.surface.remove(element);
        }
        for (index, segment) in measurement.segments.iter().enumerate() {
            let element = self.surface.insert(OverlayElement {
                role: ElementRole::Segment { overlay: id, index },
                rect: segment.rect,
                style: overlay.style.clone(),
            });
            overlay.elements.push(element);
        }

        if let Some(mut control) = overlay.control.take() {
            self.surface.remove(control.element);
            if let (Some(segment), Some(extent)) =
                (measurement.segments.get(control.segment), measurement.extent)
            {
                control.rect = control_rect(&segment.rect, &extent, control.edge, control.size);
                control.element = self.surface.insert(OverlayElement {
                    role: ElementRole::Control {
                        overlay: id,
                        kind: control.kind,
                    },
                    rect: control.rect,
                    style: self.control_style.clone(),
                });
                overlay.control = Some(control);
            }
        }

        overlay.measurement = measurement;
        overlay.generation += 1;
        trace!(
            overlay = id.0,
            segments = overlay.measurement.segments.len(),
            generation = overlay.generation,
            "rendered overlay"
        );
        Some(&overlay.measurement.segments)
    }

    /// Detach an overlay's elements and control. Removing twice is a no-op.
    pub fn remove(&mut self, id: OverlayId) -> Option<Overlay> {
        let overlay = self.overlays.remove(&id)?;
        for element in &overlay.elements {
            self.surface.remove(*element);
        }
        if let Some(control) = &overlay.control {
            self.surface.remove(control.element);
        }
        trace!(overlay = id.0, "removed overlay");
        Some(overlay)
    }

    /// Restyle an overlay's elements without recomputing geometry
    pub fn change_style(&mut self, id: OverlayId, style: StyleTag) -> bool {
        let Some(overlay) = self.overlays.get_mut(&id) else {
            return false;
        };
        for element in &overlay.elements {
            self.surface.restyle(*element, &style);
        }
        overlay.style = style;
        true
    }

    /// Attach a control at the nearest edge of the segment nearest to `point`.
    ///
    /// Replaces any control already attached. Returns the control box, or
    /// `None` when the overlay has no segments.
    pub fn attach_control(
        &mut self,
        id: OverlayId,
        kind: ControlKind,
        point: Point,
        size: (f64, f64),
    ) -> Option<Rect> {
        let overlay = self.overlays.get_mut(&id)?;
        let segment_index = segments::nearest(&overlay.measurement.segments, point)?;
        let segment = overlay.measurement.segments[segment_index].rect;
        let extent = overlay.measurement.extent?;
        let edge = if point.x - segment.left < segment.right() - point.x {
            Edge::Left
        } else {
            Edge::Right
        };

        if let Some(previous) = overlay.control.take() {
            self.surface.remove(previous.element);
        }
        let rect = control_rect(&segment, &extent, edge, size);
        let element = self.surface.insert(OverlayElement {
            role: ElementRole::Control { overlay: id, kind },
            rect,
            style: self.control_style.clone(),
        });
        overlay.control = Some(Control {
            kind,
            rect,
            segment: segment_index,
            edge,
            size,
            element,
        });
        Some(rect)
    }

    pub fn detach_control(&mut self, id: OverlayId) -> bool {
        let Some(control) = self
            .overlays
            .get_mut(&id)
            .and_then(|overlay| overlay.control.take())
        else {
            return false;
        };
        self.surface.remove(control.element)
    }

    /// Topmost overlay segment under a point
    pub fn overlay_at(&self, point: Point) -> Option<(OverlayId, usize)> {
        self.overlays
            .values()
            .rev()
            .find_map(|overlay| overlay.hit_test(point).map(|index| (overlay.id, index)))
    }

    /// Attached control under a point
    pub fn control_at(&self, point: Point) -> Option<(OverlayId, ControlKind)> {
        self.overlays.values().find_map(|overlay| {
            overlay
                .control
                .as_ref()
                .filter(|control| control.rect.contains(point))
                .map(|control| (overlay.id, control.kind))
        })
    }
}
