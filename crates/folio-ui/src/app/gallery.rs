//! Browser view and driver for the paged gallery.
//!
//! The overlay body is a Yew component mounted into the gallery container;
//! page changes push fresh props through the app handle.

use crate::app::dom;
use crate::app::transition;
use crate::components::gallery::{GalleryOverlay, GalleryOverlayProps};
use crate::core::config::TransitionConfig;
use crate::core::gallery::{Gallery, GalleryOptions, GalleryState, GalleryView};
use crate::core::keys::OverlayKey;
use crate::core::overlay::{OverlayHost, Pending, TransitionToken};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::utils::document;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};
use yew::{AppHandle, Callback, Renderer};

#[derive(Clone)]
struct GalleryCallbacks {
    on_prev: Callback<()>,
    on_next: Callback<()>,
    on_jump: Callback<usize>,
    on_close: Callback<()>,
}

/// Gallery container hosting the Yew overlay body.
#[derive(Default)]
pub(crate) struct DomGalleryView {
    container: Option<HtmlElement>,
    handle: Option<AppHandle<GalleryOverlay>>,
    callbacks: Option<GalleryCallbacks>,
}

impl DomGalleryView {
    fn container(&self) -> Option<HtmlElement> {
        self.container.clone()
    }

    fn props(&self, state: &GalleryState) -> Option<GalleryOverlayProps> {
        let callbacks = self.callbacks.clone()?;
        Some(GalleryOverlayProps {
            state: state.clone(),
            on_prev: callbacks.on_prev,
            on_next: callbacks.on_next,
            on_jump: callbacks.on_jump,
            on_close: callbacks.on_close,
        })
    }
}

impl GalleryView for DomGalleryView {
    fn mount(&mut self, state: &GalleryState) {
        self.unmount();
        let Some(props) = self.props(state) else {
            tracing::error!("gallery callbacks not wired");
            return;
        };
        let Some(container) = dom::element("div", "gallery-overlay") else {
            return;
        };
        let root = Element::from(container.clone());
        self.handle = Some(Renderer::<GalleryOverlay>::with_root_and_props(root, props).render());
        dom::show_overlay(&container);
        self.container = Some(container);
    }

    fn show_page(&mut self, state: &GalleryState) {
        let Some(props) = self.props(state) else {
            return;
        };
        if let Some(handle) = self.handle.as_mut() {
            handle.update(props);
        }
    }

    fn play_close(&mut self) {
        if let Some(container) = self.container.as_ref() {
            dom::hide_overlay(container);
        }
    }

    fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
        }
        if let Some(container) = self.container.take() {
            container.remove();
        }
    }
}

type PagedGallery = Gallery<DomGalleryView>;

/// Gallery wired to its component callbacks and keyboard input.
#[derive(Clone)]
pub(crate) struct GalleryDriver {
    gallery: Rc<RefCell<PagedGallery>>,
    timing: TransitionConfig,
    listeners: Rc<RefCell<Vec<EventListener>>>,
}

impl GalleryDriver {
    pub(crate) fn new(host: Rc<OverlayHost>, timing: TransitionConfig) -> Self {
        let driver = Self {
            gallery: Rc::new(RefCell::new(Gallery::new(DomGalleryView::default(), host))),
            timing,
            listeners: Rc::new(RefCell::new(Vec::new())),
        };
        driver.wire_callbacks();
        driver
    }

    fn wire_callbacks(&self) {
        let on_prev = {
            let driver = self.clone();
            Callback::from(move |()| driver.prev_page())
        };
        let on_next = {
            let driver = self.clone();
            Callback::from(move |()| driver.next_page())
        };
        let on_jump = {
            let driver = self.clone();
            Callback::from(move |index: usize| driver.go_to_page(index))
        };
        let on_close = {
            let driver = self.clone();
            Callback::from(move |()| driver.close())
        };
        self.gallery.borrow_mut().view_mut().callbacks = Some(GalleryCallbacks {
            on_prev,
            on_next,
            on_jump,
            on_close,
        });
    }

    /// Open on the first page; rejections are logged.
    pub(crate) fn open(&self, options: GalleryOptions) {
        let opened = self.gallery.borrow_mut().open(options);
        match opened {
            Ok(()) => self.bind(),
            Err(err) => tracing::debug!(error = %err, "gallery open rejected"),
        }
    }

    pub(crate) fn go_to_page(&self, index: usize) {
        let moved = self.gallery.borrow_mut().go_to_page(index);
        if let Err(err) = moved {
            tracing::debug!(error = %err, "gallery page change rejected");
        }
    }

    pub(crate) fn next_page(&self) {
        self.gallery.borrow_mut().next_page();
    }

    pub(crate) fn prev_page(&self) {
        self.gallery.borrow_mut().prev_page();
    }

    pub(crate) fn close(&self) {
        let pending = self.gallery.borrow_mut().close();
        self.closing(pending);
    }

    fn bind(&self) {
        let mut listeners = Vec::new();
        let on_key = {
            let driver = self.clone();
            EventListener::new_with_options(
                &document(),
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(key) = event
                        .dyn_ref::<KeyboardEvent>()
                        .and_then(|event| OverlayKey::from_key(&event.key()))
                    else {
                        return;
                    };
                    if matches!(key, OverlayKey::ArrowLeft | OverlayKey::ArrowRight) {
                        event.prevent_default();
                    }
                    let pending = driver.gallery.borrow_mut().handle_key(key);
                    driver.closing(pending);
                },
            )
        };
        listeners.push(on_key);
        if let Some(container) = self.gallery.borrow().view().container() {
            listeners.push(EventListener::new(&container, "click", |event| {
                event.stop_propagation();
            }));
        }
        *self.listeners.borrow_mut() = listeners;
    }

    fn closing(&self, pending: Option<Pending>) {
        let Some(pending) = pending else {
            return;
        };
        self.listeners.borrow_mut().clear();
        let target = self.gallery.borrow().view().container().map(Element::from);
        let driver = self.clone();
        transition::schedule(pending, target, self.timing, move |token| driver.resume(token));
    }

    fn resume(&self, token: TransitionToken) {
        self.gallery.borrow_mut().finish_transition(token);
    }
}
