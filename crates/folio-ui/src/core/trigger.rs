//! Scroll-triggered popup queue.
//!
//! # Design
//! - Each marker fires at most once per reset; later notifications for a consumed
//!   marker are ignored.
//! - Popups are serialized: one on screen, the rest wait in arrival order.
//! - Teardown is two waits: the exit transition, then a short pause before the
//!   next queued popup is presented.

use crate::core::markup::Markup;
use crate::core::overlay::{Generation, OverlayHost, OverlayLease, Pending, TransitionToken};
use std::collections::VecDeque;
use std::rc::Rc;

/// Index of a marker element in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

/// Content shown when a marker is crossed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerDescriptor {
    /// Image URL.
    pub image_src: Option<String>,
    /// HTML fragment.
    pub markup: Option<Markup>,
    /// Use the glitch entrance styling.
    pub glitch: bool,
}

impl TriggerDescriptor {
    /// Build from marker data attributes; empty strings count as absent.
    #[must_use]
    pub fn from_attributes(
        image: Option<String>,
        markup: Option<String>,
        glitch: Option<String>,
    ) -> Self {
        Self {
            image_src: image.filter(|src| !src.trim().is_empty()),
            markup: markup.map(Markup::new).filter(|markup| !markup.is_blank()),
            glitch: glitch.is_some_and(|flag| flag_enabled(&flag)),
        }
    }

    /// Whether there is anything to show.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.image_src.is_some() || self.markup.is_some()
    }
}

fn flag_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "true" | "1" | "yes"
    )
}

/// Observation and rendering side of the queue.
pub trait TriggerView {
    /// Start observing a marker.
    fn watch(&mut self, marker: MarkerId);
    /// Stop observing a marker.
    fn unwatch(&mut self, marker: MarkerId);
    /// Build and animate in a popup.
    fn present(&mut self, descriptor: &TriggerDescriptor);
    /// Animate the current popup out.
    fn play_dismiss(&mut self);
    /// Remove the popup container.
    fn remove(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Dormant,
    Idle,
    Presenting(MarkerId),
    Dismissing(TransitionToken),
    Cooling(TransitionToken),
}

#[derive(Debug)]
struct Marker {
    descriptor: TriggerDescriptor,
    consumed: bool,
}

/// FIFO of one-shot scroll popups.
pub struct TriggerQueue<V> {
    view: V,
    host: Rc<OverlayHost>,
    markers: Vec<Marker>,
    queue: VecDeque<MarkerId>,
    phase: Phase,
    generation: Generation,
    lease: Option<OverlayLease>,
}

impl<V: TriggerView> TriggerQueue<V> {
    /// Build a dormant queue.
    pub fn new(view: V, host: Rc<OverlayHost>) -> Self {
        Self {
            view,
            host,
            markers: Vec::new(),
            queue: VecDeque::new(),
            phase: Phase::Dormant,
            generation: Generation::default(),
            lease: None,
        }
    }

    /// Register the page's markers and start watching them.
    ///
    /// Markers without content are skipped; with none left the queue stays dormant.
    pub fn init(&mut self, descriptors: Vec<TriggerDescriptor>) {
        self.markers = descriptors
            .into_iter()
            .map(|descriptor| Marker {
                consumed: !descriptor.has_content(),
                descriptor,
            })
            .collect();
        let usable = self.markers.iter().filter(|marker| !marker.consumed).count();
        if usable == 0 {
            tracing::debug!("no popup markers; trigger queue dormant");
            self.phase = Phase::Dormant;
            return;
        }
        tracing::debug!(markers = usable, "watching popup markers");
        self.phase = Phase::Idle;
        for (idx, marker) in self.markers.iter().enumerate() {
            if !marker.consumed {
                self.view.watch(MarkerId(idx));
            }
        }
    }

    /// A marker entered the trigger band.
    ///
    /// Returns `true` when the marker was enqueued.
    pub fn marker_entered(&mut self, marker: MarkerId) -> bool {
        if self.phase == Phase::Dormant {
            return false;
        }
        let Some(entry) = self.markers.get_mut(marker.0) else {
            tracing::debug!(marker = marker.0, "unknown popup marker");
            return false;
        };
        if entry.consumed {
            return false;
        }
        entry.consumed = true;
        self.view.unwatch(marker);
        self.queue.push_back(marker);
        if self.phase == Phase::Idle {
            self.present_next();
        }
        true
    }

    /// Dismiss the popup on screen.
    pub fn dismiss(&mut self) -> Option<Pending> {
        let Phase::Presenting(marker) = self.phase else {
            return None;
        };
        tracing::trace!(marker = marker.0, "dismissing popup");
        let token = self.generation.advance();
        self.phase = Phase::Dismissing(token);
        self.lease = None;
        self.view.play_dismiss();
        Some(Pending::Transition(token))
    }

    /// Continue after the wait identified by `token` has finished.
    pub fn finish_transition(&mut self, token: TransitionToken) -> Option<Pending> {
        if !self.generation.is_current(token) {
            return None;
        }
        match self.phase {
            Phase::Dismissing(current) if current == token => {
                self.view.remove();
                let token = self.generation.advance();
                self.phase = Phase::Cooling(token);
                Some(Pending::Pause(token))
            }
            Phase::Cooling(current) if current == token => {
                self.phase = Phase::Idle;
                self.present_next();
                None
            }
            _ => None,
        }
    }

    /// Re-arm every marker and clear the queue; the popup on screen stays.
    pub fn reset(&mut self) {
        if self.phase == Phase::Dormant {
            return;
        }
        self.queue.clear();
        for (idx, marker) in self.markers.iter_mut().enumerate() {
            if marker.consumed && marker.descriptor.has_content() {
                marker.consumed = false;
                self.view.watch(MarkerId(idx));
            }
        }
        tracing::debug!("popup markers re-armed");
    }

    /// Whether a popup is on screen and accepting dismissal.
    #[must_use]
    pub const fn is_presenting(&self) -> bool {
        matches!(self.phase, Phase::Presenting(_))
    }

    /// Whether the queue has no markers to watch.
    #[must_use]
    pub const fn is_dormant(&self) -> bool {
        matches!(self.phase, Phase::Dormant)
    }

    /// Number of popups waiting behind the current one.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Rendering view.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Mutable rendering view, for wiring browser callbacks.
    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn present_next(&mut self) {
        let Some(marker) = self.queue.pop_front() else {
            return;
        };
        let Some(entry) = self.markers.get(marker.0) else {
            return;
        };
        self.lease = Some(self.host.acquire());
        self.view.present(&entry.descriptor);
        self.phase = Phase::Presenting(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingBackdrop, RecordingTriggerView};

    fn descriptor(src: &str) -> TriggerDescriptor {
        TriggerDescriptor {
            image_src: Some(src.to_string()),
            markup: None,
            glitch: false,
        }
    }

    fn queue(count: usize) -> (TriggerQueue<RecordingTriggerView>, RecordingTriggerView, Rc<OverlayHost>) {
        let view = RecordingTriggerView::default();
        let host = OverlayHost::new(Box::new(RecordingBackdrop::default()));
        let mut queue = TriggerQueue::new(view.clone(), Rc::clone(&host));
        queue.init(
            (0..count)
                .map(|idx| descriptor(&format!("memo-{idx}.png")))
                .collect(),
        );
        (queue, view, host)
    }

    fn dismiss_fully(queue: &mut TriggerQueue<RecordingTriggerView>) {
        let exit = queue.dismiss().expect("presenting");
        let pause = queue
            .finish_transition(exit.token())
            .expect("pause after removal");
        assert!(matches!(pause, Pending::Pause(_)));
        assert!(queue.finish_transition(pause.token()).is_none());
    }

    #[test]
    fn crossed_markers_show_one_at_a_time_in_order() {
        let (mut queue, view, host) = queue(3);
        for idx in [2, 0, 1] {
            assert!(queue.marker_entered(MarkerId(idx)));
        }
        assert_eq!(view.visible(), 1);
        assert_eq!(queue.queued(), 2);
        assert_eq!(host.open_count(), 1);

        for _ in 0..3 {
            assert_eq!(view.visible(), 1);
            dismiss_fully(&mut queue);
        }
        assert_eq!(
            view.presented(),
            vec!["memo-2.png", "memo-0.png", "memo-1.png"]
        );
        assert_eq!(view.visible(), 0);
        assert!(!host.is_visible());
        assert!(!queue.is_presenting());
    }

    #[test]
    fn consumed_marker_never_requeues() {
        let (mut queue, view, _host) = queue(2);
        assert!(queue.marker_entered(MarkerId(0)));
        assert!(!queue.marker_entered(MarkerId(0)));
        dismiss_fully(&mut queue);
        assert!(!queue.marker_entered(MarkerId(0)));
        assert_eq!(view.presented().len(), 1);
        assert_eq!(view.unwatched(), vec![MarkerId(0)]);
    }

    #[test]
    fn markers_crossed_during_teardown_wait_their_turn() {
        let (mut queue, view, _host) = queue(2);
        queue.marker_entered(MarkerId(0));
        let exit = queue.dismiss().expect("presenting");
        queue.marker_entered(MarkerId(1));
        assert_eq!(view.visible(), 1);
        let pause = queue.finish_transition(exit.token()).expect("pause");
        assert_eq!(view.visible(), 0);
        queue.finish_transition(pause.token());
        assert_eq!(view.visible(), 1);
        assert_eq!(view.presented(), vec!["memo-0.png", "memo-1.png"]);
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let (mut queue, view, _host) = queue(1);
        queue.marker_entered(MarkerId(0));
        let exit = queue.dismiss().expect("presenting");
        let pause = queue.finish_transition(exit.token()).expect("pause");
        assert!(queue.finish_transition(exit.token()).is_none());
        assert_eq!(view.removals(), 1);
        assert!(queue.finish_transition(pause.token()).is_none());
    }

    #[test]
    fn page_without_markers_stays_dormant() {
        let (mut queue, view, _host) = queue(0);
        assert!(queue.is_dormant());
        assert!(!queue.marker_entered(MarkerId(0)));
        queue.reset();
        assert!(queue.is_dormant());
        assert!(view.watched().is_empty());
    }

    #[test]
    fn markers_without_content_are_not_watched() {
        let view = RecordingTriggerView::default();
        let host = OverlayHost::new(Box::new(RecordingBackdrop::default()));
        let mut queue = TriggerQueue::new(view.clone(), host);
        queue.init(vec![TriggerDescriptor::default(), descriptor("a.png")]);
        assert_eq!(view.watched(), vec![MarkerId(1)]);
        assert!(!queue.marker_entered(MarkerId(0)));
    }

    #[test]
    fn reset_rearms_markers_but_keeps_current_popup() {
        let (mut queue, view, _host) = queue(3);
        queue.marker_entered(MarkerId(0));
        queue.marker_entered(MarkerId(1));
        queue.reset();
        assert!(queue.is_presenting());
        assert_eq!(queue.queued(), 0);
        assert_eq!(
            view.watched(),
            vec![MarkerId(0), MarkerId(1), MarkerId(2), MarkerId(0), MarkerId(1)]
        );

        dismiss_fully(&mut queue);
        assert_eq!(view.visible(), 0);
        assert!(queue.marker_entered(MarkerId(1)));
        assert_eq!(view.presented(), vec!["memo-0.png", "memo-1.png"]);
    }

    #[test]
    fn descriptor_attributes_degrade_gracefully() {
        let plain = TriggerDescriptor::from_attributes(Some("a.png".into()), Some("  ".into()), None);
        assert_eq!(plain.image_src.as_deref(), Some("a.png"));
        assert!(plain.markup.is_none());
        assert!(!plain.glitch);

        let glitchy = TriggerDescriptor::from_attributes(None, Some("<p>x</p>".into()), Some(String::new()));
        assert!(glitchy.glitch);
        assert!(glitchy.has_content());

        let off = TriggerDescriptor::from_attributes(Some(" ".into()), None, Some("false".into()));
        assert!(!off.glitch);
        assert!(!off.has_content());
    }
}
