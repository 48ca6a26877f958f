//! Browser view and driver for scroll-triggered popups.

use crate::app::dom;
use crate::app::transition;
use crate::core::config::{TransitionConfig, TriggerConfig};
use crate::core::keys::OverlayKey;
use crate::core::markup::MarkupPolicy;
use crate::core::overlay::{OverlayHost, Pending, TransitionToken};
use crate::core::trigger::{MarkerId, TriggerDescriptor, TriggerQueue, TriggerView};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::utils::document;
use js_sys::Array;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent,
};

const MARKER_SELECTOR: &str = "[data-popup-trigger]";
const MARKER_INDEX: &str = "data-folio-marker";

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Popup container plus the observer watching the page's markers.
pub(crate) struct DomTriggerView {
    markers: Vec<Element>,
    observer: Option<IntersectionObserver>,
    popup: Option<HtmlElement>,
    policy: MarkupPolicy,
}

impl DomTriggerView {
    pub(crate) const fn new(policy: MarkupPolicy) -> Self {
        Self {
            markers: Vec::new(),
            observer: None,
            popup: None,
            policy,
        }
    }

    fn attach(&mut self, markers: Vec<Element>, observer: IntersectionObserver) {
        self.markers = markers;
        self.observer = Some(observer);
    }

    fn popup(&self) -> Option<Element> {
        self.popup.clone().map(Element::from)
    }

    fn with_marker(&self, marker: MarkerId, op: impl FnOnce(&IntersectionObserver, &Element)) {
        if let (Some(observer), Some(element)) = (self.observer.as_ref(), self.markers.get(marker.0)) {
            op(observer, element);
        }
    }
}

impl TriggerView for DomTriggerView {
    fn watch(&mut self, marker: MarkerId) {
        self.with_marker(marker, |observer, element| observer.observe(element));
    }

    fn unwatch(&mut self, marker: MarkerId) {
        self.with_marker(marker, |observer, element| observer.unobserve(element));
    }

    fn present(&mut self, descriptor: &TriggerDescriptor) {
        self.remove();
        let class = if descriptor.glitch {
            "system-popup glitch"
        } else {
            "system-popup"
        };
        let Some(popup) = dom::element("div", class) else {
            return;
        };
        dom::set_attr(&popup, "role", "alertdialog");
        let Some(content) = dom::element("div", "system-popup-content") else {
            return;
        };
        if let Some(markup) = descriptor.markup.as_ref() {
            content.set_inner_html(&markup.render(self.policy));
        } else if let Some(src) = descriptor.image_src.as_deref()
            && let Some(img) = dom::image(src, "", "system-popup-image")
        {
            dom::append(&content, &img);
        }
        dom::append(&popup, &content);
        dom::show_overlay(&popup);
        self.popup = Some(popup);
    }

    fn play_dismiss(&mut self) {
        if let Some(popup) = self.popup.as_ref() {
            dom::hide_overlay(popup);
        }
    }

    fn remove(&mut self) {
        if let Some(popup) = self.popup.take() {
            popup.remove();
        }
    }
}

type Queue = TriggerQueue<DomTriggerView>;

/// Trigger queue wired to an `IntersectionObserver` and dismissal input.
#[derive(Clone)]
pub(crate) struct TriggerDriver {
    queue: Rc<RefCell<Queue>>,
    band: TriggerConfig,
    timing: TransitionConfig,
    callback: Rc<RefCell<Option<ObserverCallback>>>,
    listeners: Rc<RefCell<Vec<EventListener>>>,
}

impl TriggerDriver {
    pub(crate) fn new(
        host: Rc<OverlayHost>,
        policy: MarkupPolicy,
        band: TriggerConfig,
        timing: TransitionConfig,
    ) -> Self {
        Self {
            queue: Rc::new(RefCell::new(TriggerQueue::new(DomTriggerView::new(policy), host))),
            band,
            timing,
            callback: Rc::new(RefCell::new(None)),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Scan the page for markers and start observing them.
    pub(crate) fn init(&self) {
        let markers = dom::query_all(MARKER_SELECTOR);
        let descriptors: Vec<TriggerDescriptor> = markers
            .iter()
            .enumerate()
            .map(|(idx, marker)| {
                dom::set_attr(marker, MARKER_INDEX, &idx.to_string());
                TriggerDescriptor::from_attributes(
                    dom::attr(marker, "data-popup-image"),
                    dom::attr(marker, "data-popup-html"),
                    dom::attr(marker, "data-popup-glitch"),
                )
            })
            .collect();

        if descriptors.iter().any(TriggerDescriptor::has_content) {
            let Some(observer) = self.observer() else {
                return;
            };
            self.queue.borrow_mut().view_mut().attach(markers, observer);
            self.bind_dismissal();
        }
        self.queue.borrow_mut().init(descriptors);
    }

    /// Re-arm every marker.
    pub(crate) fn reset(&self) {
        self.queue.borrow_mut().reset();
    }

    fn observer(&self) -> Option<IntersectionObserver> {
        let driver = self.clone();
        let callback: ObserverCallback = Closure::new(move |entries: Array, _: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let marker = dom::attr(&entry.target(), MARKER_INDEX)
                    .and_then(|raw| raw.parse::<usize>().ok());
                if let Some(marker) = marker {
                    driver.marker_entered(MarkerId(marker));
                }
            }
        });

        let options = IntersectionObserverInit::new();
        options.set_root_margin(&self.band.root_margin);
        options.set_threshold(&JsValue::from_f64(self.band.threshold));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
            Ok(observer) => {
                *self.callback.borrow_mut() = Some(callback);
                Some(observer)
            }
            Err(err) => {
                tracing::error!(
                    root_margin = %self.band.root_margin,
                    error = %dom::describe(&err),
                    "intersection observer unavailable"
                );
                None
            }
        }
    }

    fn bind_dismissal(&self) {
        let doc = document();
        let on_click = {
            let driver = self.clone();
            EventListener::new(&doc, "click", move |_| driver.dismiss())
        };
        let on_key = {
            let driver = self.clone();
            EventListener::new_with_options(
                &doc,
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    if !driver.queue.borrow().is_presenting() {
                        return;
                    }
                    let key = event
                        .dyn_ref::<KeyboardEvent>()
                        .and_then(|event| OverlayKey::from_key(&event.key()));
                    if key.is_some_and(OverlayKey::dismisses) {
                        event.prevent_default();
                        driver.dismiss();
                    }
                },
            )
        };
        *self.listeners.borrow_mut() = vec![on_click, on_key];
    }

    fn marker_entered(&self, marker: MarkerId) {
        let queued = self.queue.borrow_mut().marker_entered(marker);
        if queued {
            tracing::debug!(marker = marker.0, "popup marker crossed");
        }
    }

    fn dismiss(&self) {
        let pending = self.queue.borrow_mut().dismiss();
        if let Some(pending) = pending {
            self.await_pending(pending);
        }
    }

    fn await_pending(&self, pending: Pending) {
        let target = self.queue.borrow().view().popup();
        let driver = self.clone();
        transition::schedule(pending, target, self.timing, move |token| driver.resume(token));
    }

    fn resume(&self, token: TransitionToken) {
        let next = self.queue.borrow_mut().finish_transition(token);
        if let Some(pending) = next {
            self.await_pending(pending);
        }
    }
}
