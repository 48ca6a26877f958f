//! Sequential presenter: a click-through run of modal slides.
//!
//! # Design
//! - States: `Inactive -> Showing(i) -> Advancing -> Showing(i + 1) -> ... -> Completing -> Inactive`.
//! - Input is only honoured while `Showing`; clicks during an exit animation are dropped.
//! - The completion callback is handed back to the driver instead of being called
//!   here, so it never runs while the presenter is borrowed.

use crate::core::markup::Markup;
use crate::core::overlay::{Generation, OverlayHost, OverlayLease, Pending, TransitionToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// One slide of a sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SequenceItem {
    /// A single image.
    Image {
        /// Image URL.
        content: String,
        /// Alternative text.
        #[serde(default, rename = "altText")]
        alt_text: Option<String>,
    },
    /// Pre-authored HTML.
    Markup {
        /// HTML fragment.
        content: Markup,
    },
}

/// Where an item sits in its sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencePosition {
    /// Zero-based index.
    pub index: usize,
    /// Total number of items.
    pub len: usize,
}

impl SequencePosition {
    /// Whether this is the final slide (shows "begin" rather than "continue").
    #[must_use]
    pub const fn is_last(self) -> bool {
        self.index + 1 == self.len
    }
}

/// Rendering side of the presenter.
pub trait SequenceView {
    /// Create a fresh container, discarding any stale one.
    fn mount(&mut self);
    /// Show one item.
    fn render(&mut self, item: &SequenceItem, position: SequencePosition);
    /// Animate the current item out.
    fn play_item_exit(&mut self);
    /// Animate the whole container out.
    fn play_close(&mut self);
    /// Remove the container.
    fn unmount(&mut self);
}

/// Callback invoked once a sequence has been fully shown.
pub type Completion = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Inactive,
    Showing,
    Advancing(TransitionToken),
    Completing(TransitionToken),
}

/// Outcome of a finished transition.
pub enum SequenceStep {
    /// Nothing further to do.
    Idle,
    /// Wait again, then call [`SequencePresenter::finish_transition`].
    Await(Pending),
    /// The sequence ended; invoke the callback.
    Complete(Completion),
}

impl fmt::Debug for SequenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Await(pending) => f.debug_tuple("Await").field(pending).finish(),
            Self::Complete(_) => f.write_str("Complete(..)"),
        }
    }
}

/// Drives an ordered list of items through one-at-a-time display.
pub struct SequencePresenter<V> {
    view: V,
    host: Rc<OverlayHost>,
    items: Vec<SequenceItem>,
    index: usize,
    phase: Phase,
    generation: Generation,
    lease: Option<OverlayLease>,
    on_complete: Option<Completion>,
}

impl<V: SequenceView> SequencePresenter<V> {
    /// Build an inactive presenter.
    pub fn new(view: V, host: Rc<OverlayHost>) -> Self {
        Self {
            view,
            host,
            items: Vec::new(),
            index: 0,
            phase: Phase::Inactive,
            generation: Generation::default(),
            lease: None,
            on_complete: None,
        }
    }

    /// Start (or restart) a sequence.
    ///
    /// Restarting drops the previous completion callback without calling it.
    /// An empty list shows nothing and returns the callback for immediate use.
    #[must_use]
    pub fn start(&mut self, items: Vec<SequenceItem>, on_complete: Completion) -> Option<Completion> {
        if items.is_empty() {
            tracing::warn!("sequence started without items");
            return Some(on_complete);
        }
        if self.phase != Phase::Inactive {
            tracing::debug!(index = self.index, "restarting active sequence");
        }
        self.generation.advance();
        self.items = items;
        self.index = 0;
        self.on_complete = Some(on_complete);
        self.phase = Phase::Showing;
        self.view.mount();
        if self.lease.is_none() {
            self.lease = Some(self.host.acquire());
        }
        self.render_current();
        None
    }

    /// Handle a click or advance key.
    pub fn advance(&mut self) -> Option<Pending> {
        if self.phase != Phase::Showing {
            return None;
        }
        let token = self.generation.advance();
        self.phase = Phase::Advancing(token);
        self.view.play_item_exit();
        Some(Pending::Transition(token))
    }

    /// Continue after the transition identified by `token` has finished.
    pub fn finish_transition(&mut self, token: TransitionToken) -> SequenceStep {
        if !self.generation.is_current(token) {
            return SequenceStep::Idle;
        }
        match self.phase {
            Phase::Advancing(current) if current == token => {
                self.index += 1;
                if self.index < self.items.len() {
                    self.phase = Phase::Showing;
                    self.render_current();
                    return SequenceStep::Idle;
                }
                let token = self.generation.advance();
                self.phase = Phase::Completing(token);
                self.lease = None;
                self.view.play_close();
                SequenceStep::Await(Pending::Transition(token))
            }
            Phase::Completing(current) if current == token => {
                self.phase = Phase::Inactive;
                self.view.unmount();
                self.items.clear();
                tracing::debug!("sequence complete");
                self.on_complete
                    .take()
                    .map_or(SequenceStep::Idle, SequenceStep::Complete)
            }
            _ => SequenceStep::Idle,
        }
    }

    /// Whether a sequence is on screen and accepting input.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Showing | Phase::Advancing(_))
    }

    /// Whether a container exists (including during the closing animation).
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        !matches!(self.phase, Phase::Inactive)
    }

    /// Index of the item currently displayed.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Rendering view.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    fn render_current(&mut self) {
        let position = SequencePosition {
            index: self.index,
            len: self.items.len(),
        };
        if let Some(item) = self.items.get(self.index) {
            self.view.render(item, position);
        }
    }
}
