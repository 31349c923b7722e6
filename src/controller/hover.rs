//! Hover intent for note overlays
//!
//! Hovering a tagged overlay shows its note control after a short delay, and
//! leaving it hides the control only after a grace period. Moving between the
//! segments of one overlay, or from a segment onto its control, re-enters the
//! same overlay before the grace period ends, so the control never flickers.
//!
//! Timers are plain deadlines; [`HoverIntent::tick`] fires whichever is due.

use crate::layout::Point;
use crate::overlay::OverlayId;
use std::time::{Duration, Instant};

/// Control visibility change requested by a fired timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverAction {
    Show { overlay: OverlayId, at: Point },
    Hide(OverlayId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Show {
        overlay: OverlayId,
        at: Point,
        due: Instant,
    },
    Hide {
        due: Instant,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverIntent {
    show_delay: Duration,
    hide_grace: Duration,
    shown: Option<OverlayId>,
    pending: Option<Pending>,
}

impl HoverIntent {
    pub fn new(show_delay: Duration, hide_grace: Duration) -> Self {
        Self {
            show_delay,
            hide_grace,
            shown: None,
            pending: None,
        }
    }

    /// Overlay whose control is currently showing
    pub fn shown(&self) -> Option<OverlayId> {
        self.shown
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pointer is over a segment of `overlay` or over its control
    pub fn enter(&mut self, overlay: OverlayId, at: Point, now: Instant) {
        if self.shown == Some(overlay) {
            self.pending = None;
            return;
        }
        if let Some(Pending::Show { overlay: waiting, .. }) = self.pending {
            if waiting == overlay {
                return;
            }
        }
        self.pending = Some(Pending::Show {
            overlay,
            at,
            due: now + self.show_delay,
        });
    }

    /// Pointer is over nothing hoverable
    pub fn leave(&mut self, now: Instant) {
        match self.pending {
            Some(Pending::Hide { .. }) => {}
            _ if self.shown.is_some() => {
                self.pending = Some(Pending::Hide {
                    due: now + self.hide_grace,
                })
            }
            _ => self.pending = None,
        }
    }

    /// Drop all state about an overlay that no longer exists
    pub fn forget(&mut self, overlay: OverlayId) {
        if self.shown == Some(overlay) {
            self.shown = None;
            self.pending = None;
        }
        if let Some(Pending::Show { overlay: waiting, .. }) = self.pending {
            if waiting == overlay {
                self.pending = None;
            }
        }
    }

    /// Fire the pending timer if it is due
    pub fn tick(&mut self, now: Instant) -> Vec<HoverAction> {
        let mut actions = Vec::new();
        match self.pending {
            Some(Pending::Show { overlay, at, due }) if due <= now => {
                if let Some(previous) = self.shown.replace(overlay) {
                    actions.push(HoverAction::Hide(previous));
                }
                actions.push(HoverAction::Show { overlay, at });
                self.pending = None;
            }
            Some(Pending::Hide { due }) if due <= now => {
                if let Some(previous) = self.shown.take() {
                    actions.push(HoverAction::Hide(previous));
                }
                self.pending = None;
            }
            _ => {}
        }
        actions
    }
}
