//! Selection controller
//!
//! One [`SelectionController`] per document view. It owns the sentence
//! registry, the layout host, the overlay renderer and the notes of that view,
//! and turns pointer input into ranges, overlays and notes:
//!
//! ```text
//! Idle --pointer down--> Tracking --pointer up, native selection--> Selecting
//!                           |                                         |
//!                           +--plain click: dispatch, Idle    empty: Idle
//!                                                             else: Selected
//! Selected --click on add-note control--> note created, Idle
//! Selected --pointer down elsewhere--> selection cleared, Tracking
//! ```
//!
//! `Selecting` never outlives one pointer-up call, so it has no state variant.
//!
//! Any change to sentence visibility goes through the same discipline: mutate
//! flags, reflow the layout, then re-render every overlay whose last sentence
//! is at or after the first changed sentence. Overlays that end before it keep
//! their recorded segments.

pub mod events;
pub mod expansion;
pub mod hover;
pub mod selection;
pub mod state;

pub use events::{DocumentEvent, DocumentObserver, LayoutObserver};
pub use expansion::{ExpansionChange, Immediate, TransitionDriver};
pub use hover::{HoverAction, HoverIntent};
pub use selection::clip_selection;
pub use state::{ActiveSelection, InteractionState, NativeSelection, PointerOutcome, PointerTarget};

use crate::filter::{self, Filter, FilterChange};
use crate::layout::{Point, TextLayout};
use crate::notes::store::LoadedNote;
use crate::notes::{Comment, NoteBook, NoteId};
use crate::overlay::{ControlKind, OverlayId, OverlayRenderer, OverlaySurface, StyleTag};
use crate::registry::{SentenceId, SentenceRegistry};
use precis_config::PrecisConfig;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Styles {
    selection: StyleTag,
    tagged: StyleTag,
    hover: StyleTag,
}

/// Interaction engine of one document view
pub struct SelectionController<L: TextLayout, S: OverlaySurface> {
    registry: SentenceRegistry,
    layout: L,
    renderer: OverlayRenderer<S>,
    filter: Filter,
    notes: NoteBook,
    state: InteractionState,
    hover: HoverIntent,
    styles: Styles,
    control_size: (f64, f64),
    transitions: Box<dyn TransitionDriver>,
    document_observers: Vec<Box<dyn DocumentObserver>>,
    layout_observers: Vec<Box<dyn LayoutObserver>>,
}

impl<L: TextLayout, S: OverlaySurface> SelectionController<L, S> {
    /// Take over a freshly rendered registry.
    ///
    /// The configured default threshold is applied and the layout flowed once
    /// before any overlay exists.
    pub fn new(mut registry: SentenceRegistry, mut layout: L, surface: S, config: &PrecisConfig) -> Self {
        let threshold = config.filter.default_threshold;
        let mut filter = Filter::new(threshold);
        filter.apply_threshold(&mut registry, threshold);
        layout.reflow(&registry);

        let overlay = &config.overlay;
        let interaction = &config.interaction;
        Self {
            registry,
            layout,
            renderer: OverlayRenderer::new(surface, StyleTag::new(&overlay.control_class)),
            filter,
            notes: NoteBook::new(),
            state: InteractionState::Idle,
            hover: HoverIntent::new(interaction.hover_show_delay(), interaction.hover_hide_grace()),
            styles: Styles {
                selection: StyleTag::new(&overlay.selection_class),
                tagged: StyleTag::new(&overlay.tagged_class),
                hover: StyleTag::new(&overlay.hover_class),
            },
            control_size: (interaction.control_width, interaction.control_height),
            transitions: Box::new(Immediate),
            document_observers: Vec::new(),
            layout_observers: Vec::new(),
        }
    }

    /// Use a host driver for expand/collapse transitions
    pub fn with_transitions(mut self, driver: impl TransitionDriver + 'static) -> Self {
        self.transitions = Box::new(driver);
        self
    }

    pub fn observe(&mut self, observer: impl DocumentObserver + 'static) {
        self.document_observers.push(Box::new(observer));
    }

    pub fn observe_layout(&mut self, observer: impl LayoutObserver + 'static) {
        self.layout_observers.push(Box::new(observer));
    }

    pub fn registry(&self) -> &SentenceRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn renderer(&self) -> &OverlayRenderer<S> {
        &self.renderer
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn notes(&self) -> &NoteBook {
        &self.notes
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn hover(&self) -> &HoverIntent {
        &self.hover
    }

    /// The transient selection, if one is showing
    pub fn selection(&self) -> Option<&ActiveSelection> {
        self.state.selection()
    }

    fn emit(&mut self, event: DocumentEvent) {
        debug!(?event, "document event");
        for observer in &mut self.document_observers {
            observer.on_event(&event);
        }
    }

    fn set_state(&mut self, state: InteractionState) {
        if state.name() != self.state.name() {
            debug!(from = self.state.name(), to = state.name(), "interaction state");
        }
        self.state = state;
    }

    // Pointer input

    pub fn pointer_down(&mut self, point: Point, target: PointerTarget, now: Instant) {
        let previous = std::mem::take(&mut self.state);
        let mut pending = None;
        if let Some(active) = match previous {
            InteractionState::Selected(active) => Some(active),
            InteractionState::Tracking { pending, .. } => pending,
            InteractionState::Idle => None,
        } {
            if target == PointerTarget::Control(active.overlay) {
                pending = Some(active);
            } else {
                self.clear_selection(active);
            }
        }

        let next = if target.is_inside() {
            InteractionState::Tracking {
                origin: point,
                target,
                since: now,
                pending,
            }
        } else {
            InteractionState::Idle
        };
        self.set_state(next);
    }

    /// Resolve a press into a selection or a click.
    ///
    /// `selection` is what the host's native selection reports at release; a
    /// missing or collapsed selection makes this a plain click on `target`.
    pub fn pointer_up(
        &mut self,
        point: Point,
        target: PointerTarget,
        selection: Option<NativeSelection>,
        now: Instant,
    ) -> PointerOutcome {
        let (since, pending) = match std::mem::take(&mut self.state) {
            InteractionState::Tracking { since, pending, .. } => (since, pending),
            other => {
                self.state = other;
                return PointerOutcome::Ignored;
            }
        };
        debug!(
            held_ms = now.saturating_duration_since(since).as_millis() as u64,
            "pointer released"
        );

        if let Some(native) = selection.filter(|native| !native.is_collapsed()) {
            if let Some(active) = pending {
                self.clear_selection(active);
            }
            return self.select(native, point);
        }

        if let Some(active) = pending {
            if target == PointerTarget::Control(active.overlay) {
                let note = self.commit_selection(active);
                return PointerOutcome::NoteAdded(note);
            }
            self.clear_selection(active);
        }

        self.dispatch_click(&target);
        PointerOutcome::Clicked(target)
    }

    /// Track hover over note overlays and their controls
    pub fn pointer_move(&mut self, point: Point, now: Instant) {
        let hovered = self
            .renderer
            .control_at(point)
            .map(|(overlay, _)| overlay)
            .or_else(|| self.renderer.overlay_at(point).map(|(overlay, _)| overlay))
            .filter(|overlay| self.notes.note_for_overlay(*overlay).is_some());
        match hovered {
            Some(overlay) => self.hover.enter(overlay, point, now),
            None => self.hover.leave(now),
        }
    }

    /// Fire due hover timers and apply them to the overlays
    pub fn tick(&mut self, now: Instant) -> Vec<HoverAction> {
        let actions = self.hover.tick(now);
        for action in &actions {
            match *action {
                HoverAction::Show { overlay, at } => {
                    self.renderer.change_style(overlay, self.styles.hover.clone());
                    self.renderer
                        .attach_control(overlay, ControlKind::NoteMenu, at, self.control_size);
                }
                HoverAction::Hide(overlay) => {
                    self.renderer.detach_control(overlay);
                    self.renderer.change_style(overlay, self.styles.tagged.clone());
                }
            }
        }
        actions
    }

    fn select(&mut self, native: NativeSelection, point: Point) -> PointerOutcome {
        debug!(state = "selecting", ?native, "clipping selection");
        let Some(range) = clip_selection(&self.registry, &native) else {
            debug!("selection clipped to nothing");
            self.set_state(InteractionState::Idle);
            return PointerOutcome::SelectionDiscarded;
        };

        let overlay = self.renderer.create(
            range.clone(),
            self.styles.selection.clone(),
            &self.registry,
            &self.layout,
        );
        if self
            .renderer
            .attach_control(overlay, ControlKind::AddNote, point, self.control_size)
            .is_none()
        {
            debug!("selection has no visible segments");
            self.renderer.remove(overlay);
            self.set_state(InteractionState::Idle);
            return PointerOutcome::SelectionDiscarded;
        }

        self.set_state(InteractionState::Selected(ActiveSelection { overlay, range }));
        PointerOutcome::Selected(overlay)
    }

    fn clear_selection(&mut self, active: ActiveSelection) {
        debug!(overlay = active.overlay.0, "clearing selection");
        self.renderer.remove(active.overlay);
    }

    /// Hand the selected range over to a new note drawn in tagged style
    fn commit_selection(&mut self, active: ActiveSelection) -> NoteId {
        self.renderer.remove(active.overlay);
        let note = self.notes.add(vec![active.range], Vec::new());
        self.draw_note(note);
        self.set_state(InteractionState::Idle);
        self.emit(DocumentEvent::NoteAdded(note));
        note
    }

    fn draw_note(&mut self, id: NoteId) {
        let Some(ranges) = self.notes.get(id).map(|note| note.ranges.clone()) else {
            return;
        };
        let overlays: Vec<OverlayId> = ranges
            .into_iter()
            .map(|range| {
                self.renderer
                    .create(range, self.styles.tagged.clone(), &self.registry, &self.layout)
            })
            .collect();
        if let Some(note) = self.notes.get_mut(id) {
            note.overlays = overlays;
        }
    }

    fn dispatch_click(&mut self, target: &PointerTarget) {
        match target {
            PointerTarget::Sentence(id) => {
                self.toggle_expansion(*id);
            }
            PointerTarget::Keyword { keyword, .. } => {
                self.toggle_keyword(keyword);
            }
            PointerTarget::Control(overlay) => {
                if let Some(note) = self.notes.note_for_overlay(*overlay) {
                    debug!(%note, "note control activated");
                }
            }
            PointerTarget::Overlay(_) | PointerTarget::Content | PointerTarget::Outside => {}
        }
    }

    // Reflow

    /// Reflow the layout and re-render every overlay reaching `from` or
    /// later, in sentence order.
    ///
    /// Returns the overlays that were re-rendered.
    pub fn notify_layout_changed(&mut self, from: SentenceId) -> Vec<OverlayId> {
        self.layout.reflow(&self.registry);
        let Some(from_index) = self.registry.index_of(from) else {
            return Vec::new();
        };

        let mut affected: Vec<(usize, OverlayId)> = self
            .renderer
            .overlays()
            .filter_map(|overlay| {
                let range = overlay.range();
                let last = self.registry.index_of(range.last_sentence()?)?;
                let first = self.registry.index_of(range.first_sentence()?)?;
                (last >= from_index).then_some((first, overlay.id()))
            })
            .collect();
        affected.sort();

        for (_, overlay) in &affected {
            self.renderer.render(*overlay, &self.registry, &self.layout);
        }
        debug!(from = %from, rerendered = affected.len(), "layout changed");

        for observer in &mut self.layout_observers {
            observer.on_layout_changed(from);
        }
        affected.into_iter().map(|(_, overlay)| overlay).collect()
    }

    // Filtering

    pub fn set_threshold(&mut self, threshold: u8) -> FilterChange {
        let change = self.filter.apply_threshold(&mut self.registry, threshold);
        self.apply_filter_change(&change);
        change
    }

    pub fn toggle_keyword(&mut self, keyword: &str) -> FilterChange {
        let change = self.filter.toggle_keyword(&mut self.registry, keyword);
        self.apply_filter_change(&change);
        change
    }

    fn apply_filter_change(&mut self, change: &FilterChange) {
        for flag in change.iter() {
            self.emit(if flag.on {
                DocumentEvent::Highlighted(flag.sentence)
            } else {
                DocumentEvent::Unhighlighted(flag.sentence)
            });
        }
        if let Some(first) = change.first() {
            self.notify_layout_changed(first);
        }
    }

    pub fn star(&mut self, id: SentenceId) -> bool {
        let changed = filter::set_star(&mut self.registry, id, true);
        if changed {
            self.emit(DocumentEvent::Starred(id));
        }
        changed
    }

    pub fn unstar(&mut self, id: SentenceId) -> bool {
        let changed = filter::set_star(&mut self.registry, id, false);
        if changed {
            self.emit(DocumentEvent::Unstarred(id));
        }
        changed
    }

    // Expand / collapse

    /// Expand a sentence, wait for the host transition, then reflow.
    ///
    /// Returns false when the sentence was already expanded.
    pub async fn expand(&mut self, id: SentenceId) -> bool {
        let Some(change) = expansion::expand(&mut self.registry, id) else {
            return false;
        };
        self.finish_transition(change, DocumentEvent::Expanded(id))
            .await;
        true
    }

    /// Collapse a sentence, wait for the host transition, then reflow.
    pub async fn collapse(&mut self, id: SentenceId) -> bool {
        let Some(change) = expansion::collapse(&mut self.registry, id) else {
            return false;
        };
        self.finish_transition(change, DocumentEvent::Collapsed(id))
            .await;
        true
    }

    async fn finish_transition(&mut self, change: ExpansionChange, event: DocumentEvent) {
        self.emit(event);
        let finished = self.transitions.begin(&change);
        // A dropped sender still means the transition is over
        let _ = finished.await;
        self.notify_layout_changed(change.from);
    }

    /// Expand or collapse without waiting for a transition
    pub fn toggle_expansion(&mut self, id: SentenceId) -> Option<ExpansionChange> {
        let expanded = self.registry.flags(id)?.expanded;
        let (change, event) = if expanded {
            (expansion::collapse(&mut self.registry, id)?, DocumentEvent::Collapsed(id))
        } else {
            (expansion::expand(&mut self.registry, id)?, DocumentEvent::Expanded(id))
        };
        self.emit(event);
        self.notify_layout_changed(change.from);
        Some(change)
    }

    // Notes

    /// Restore persisted notes and draw their tagged overlays
    pub fn load_notes(&mut self, loaded: Vec<LoadedNote>) -> Vec<NoteId> {
        let ids: Vec<NoteId> = loaded
            .into_iter()
            .map(|note| self.notes.add(note.ranges, note.comments))
            .collect();
        for id in &ids {
            self.draw_note(*id);
        }
        debug!(notes = ids.len(), "restored notes");
        ids
    }

    pub fn add_comment(&mut self, note: NoteId, comment: Comment) -> bool {
        match self.notes.get_mut(note) {
            Some(note) => {
                note.comments.push(comment);
                true
            }
            None => false,
        }
    }

    /// Remove a comment. A note left without comments is removed with it.
    pub fn remove_comment(&mut self, note: NoteId, index: usize) -> Option<Comment> {
        let entry = self.notes.get_mut(note)?;
        if index >= entry.comments.len() {
            return None;
        }
        let comment = entry.comments.remove(index);
        if entry.comments.is_empty() {
            self.remove_note(note);
        }
        Some(comment)
    }

    /// Remove a note and its overlays
    pub fn remove_note(&mut self, id: NoteId) -> bool {
        let Some(note) = self.notes.remove(id) else {
            return false;
        };
        for overlay in note.overlays {
            self.hover.forget(overlay);
            self.renderer.remove(overlay);
        }
        self.emit(DocumentEvent::NoteRemoved(id));
        true
    }
}
