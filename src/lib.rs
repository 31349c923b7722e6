//! # precis
//!
//! Range and overlay engine for rank-filtered article summaries.
//!
//! An article is rendered into a [`registry::SentenceRegistry`] of ranked
//! sentences, most of them hidden behind a rank threshold. Readers select text
//! across the visible sentences; selections become [`range::Range`]s that are
//! drawn as line-by-line overlays, turned into notes, and stored as
//! `sentenceId/childIndex:characterOffset` boundary pairs that survive
//! reloads.
//!
//! Layers, leaves first:
//!
//! - [`range`]: layout-independent text spans and their serialized form
//! - [`registry`]: sentences, tokens and visibility flags
//! - [`document`]: article input rendered into a registry
//! - [`layout`]: geometry and the text layout host seam
//! - [`overlay`]: line segments and overlay elements
//! - [`filter`]: rank threshold, keywords and stars
//! - [`notes`]: notes, comments and their persistence
//! - [`controller`]: pointer input, expand/collapse and reflow propagation

pub mod controller;
pub mod document;
pub mod error;
pub mod filter;
pub mod layout;
pub mod notes;
pub mod overlay;
pub mod range;
pub mod registry;

pub use controller::SelectionController;
pub use error::{Error, RangeError, Result};
pub use range::Range;
pub use registry::{SentenceId, SentenceRegistry};
