//! Browser view and driver for the document viewer.

use crate::app::backdrop::DomBackdrop;
use crate::app::dom;
use crate::app::transition;
use crate::core::config::TransitionConfig;
use crate::core::keys::OverlayKey;
use crate::core::markup::MarkupPolicy;
use crate::core::overlay::{OverlayHost, Pending, TransitionToken};
use crate::core::viewer::{
    DocumentAttributes, DocumentDescriptor, DocumentKind, DocumentViewer, ViewerView,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::utils::document;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};

const LINK_SELECTOR: &str = "[data-doc-viewer], a.doc-link";

/// Viewer container: header with title and close control, body with the document.
pub(crate) struct DomViewerView {
    container: Option<HtmlElement>,
    close_button: Option<HtmlElement>,
    policy: MarkupPolicy,
}

impl DomViewerView {
    pub(crate) const fn new(policy: MarkupPolicy) -> Self {
        Self {
            container: None,
            close_button: None,
            policy,
        }
    }

    fn container(&self) -> Option<HtmlElement> {
        self.container.clone()
    }

    fn close_button(&self) -> Option<HtmlElement> {
        self.close_button.clone()
    }

    fn header(&mut self, title: &str) -> Option<HtmlElement> {
        let header = dom::element("div", "document-header")?;
        if let Some(heading) = dom::element("h2", "document-title") {
            heading.set_text_content(Some(title));
            dom::append(&header, &heading);
        }
        if let Some(button) = dom::element("button", "document-close") {
            dom::set_attr(&button, "type", "button");
            dom::set_attr(&button, "aria-label", "Close");
            button.set_text_content(Some("\u{00d7}"));
            dom::append(&header, &button);
            self.close_button = Some(button);
        }
        Some(header)
    }

    fn body(&self, descriptor: &DocumentDescriptor) -> Option<HtmlElement> {
        let body = dom::element("div", "document-body")?;
        let source = descriptor.source.as_deref();
        match descriptor.kind {
            DocumentKind::EmbeddedDoc => match source {
                Some(src) => {
                    if let Some(frame) = dom::element("iframe", "document-frame") {
                        dom::set_attr(&frame, "src", src);
                        dom::set_attr(&frame, "title", &descriptor.title);
                        dom::append(&body, &frame);
                    }
                }
                None => tracing::warn!(title = %descriptor.title, "embedded document has no source"),
            },
            DocumentKind::Article => {
                if let Some(markup) = descriptor.markup.as_ref() {
                    if let Some(article) = dom::element("article", "document-article") {
                        article.set_inner_html(&markup.render(self.policy));
                        dom::append(&body, &article);
                    }
                } else {
                    tracing::warn!(title = %descriptor.title, "article has no markup");
                }
            }
            DocumentKind::Image => match source {
                Some(src) => {
                    if let Some(img) = dom::image(src, &descriptor.title, "document-image") {
                        dom::append(&body, &img);
                    }
                }
                None => tracing::warn!(title = %descriptor.title, "image document has no source"),
            },
        }
        Some(body)
    }
}

impl ViewerView for DomViewerView {
    fn build(&mut self, descriptor: &DocumentDescriptor) {
        self.destroy();
        let Some(container) = dom::element("div", "document-viewer") else {
            return;
        };
        dom::set_attr(&container, "role", "dialog");
        dom::set_attr(&container, "aria-modal", "true");
        dom::set_attr(&container, "aria-label", &descriptor.title);
        if let Some(header) = self.header(&descriptor.title) {
            dom::append(&container, &header);
        }
        if let Some(body) = self.body(descriptor) {
            dom::append(&container, &body);
        }
        dom::show_overlay(&container);
        self.container = Some(container);
    }

    fn play_close(&mut self) {
        if let Some(container) = self.container.as_ref() {
            dom::hide_overlay(container);
        }
    }

    fn destroy(&mut self) {
        self.close_button = None;
        if let Some(container) = self.container.take() {
            container.remove();
        }
    }
}

type Viewer = DocumentViewer<DomViewerView>;

/// Document viewer wired to link clicks, the backdrop and Escape.
#[derive(Clone)]
pub(crate) struct ViewerDriver {
    viewer: Rc<RefCell<Viewer>>,
    backdrop: DomBackdrop,
    default_title: Rc<str>,
    timing: TransitionConfig,
    listeners: Rc<RefCell<Vec<EventListener>>>,
    session: Rc<RefCell<Vec<EventListener>>>,
}

impl ViewerDriver {
    pub(crate) fn new(
        host: Rc<OverlayHost>,
        backdrop: DomBackdrop,
        policy: MarkupPolicy,
        default_title: &str,
        timing: TransitionConfig,
    ) -> Self {
        Self {
            viewer: Rc::new(RefCell::new(DocumentViewer::new(DomViewerView::new(policy), host))),
            backdrop,
            default_title: Rc::from(default_title),
            timing,
            listeners: Rc::new(RefCell::new(Vec::new())),
            session: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Intercept document links and bind Escape.
    pub(crate) fn init(&self) {
        let doc = document();
        let on_click = {
            let driver = self.clone();
            EventListener::new_with_options(
                &doc,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(link) = dom::closest(event.target(), LINK_SELECTOR) else {
                        return;
                    };
                    event.prevent_default();
                    driver.open(driver.descriptor_for(&link));
                },
            )
        };
        let on_key = {
            let driver = self.clone();
            EventListener::new(&doc, "keydown", move |event| {
                let key = event
                    .dyn_ref::<KeyboardEvent>()
                    .and_then(|event| OverlayKey::from_key(&event.key()));
                if let Some(key) = key {
                    let pending = driver.viewer.borrow_mut().handle_key(key);
                    driver.closing(pending);
                }
            })
        };
        *self.listeners.borrow_mut() = vec![on_click, on_key];
    }

    /// Show `descriptor`, replacing any open document.
    pub(crate) fn open(&self, descriptor: DocumentDescriptor) {
        let descriptor = descriptor.with_default_title(&self.default_title);
        self.viewer.borrow_mut().open(descriptor);
        self.bind_session();
    }

    /// Close the open document.
    pub(crate) fn close(&self) {
        let pending = self.viewer.borrow_mut().close();
        self.closing(pending);
    }

    fn descriptor_for(&self, link: &Element) -> DocumentDescriptor {
        let attrs = DocumentAttributes {
            kind: dom::attr(link, "data-doc-type"),
            source: dom::attr(link, "data-doc-src"),
            href: dom::attr(link, "href"),
            markup: dom::attr(link, "data-doc-html"),
            title: dom::attr(link, "data-doc-title"),
            text: link.text_content(),
        };
        DocumentDescriptor::from_attributes(attrs, &self.default_title)
    }

    fn bind_session(&self) {
        let (container, close_button) = {
            let viewer = self.viewer.borrow();
            (viewer.view().container(), viewer.view().close_button())
        };
        let mut session = Vec::new();
        if let Some(container) = container {
            session.push(EventListener::new(&container, "click", |event| {
                event.stop_propagation();
            }));
        }
        if let Some(button) = close_button {
            let driver = self.clone();
            session.push(EventListener::new(&button, "click", move |_| driver.close()));
        }
        if let Some(node) = self.backdrop.node() {
            let driver = self.clone();
            session.push(EventListener::once(&node, "click", move |_| driver.close()));
        }
        *self.session.borrow_mut() = session;
    }

    fn closing(&self, pending: Option<Pending>) {
        let Some(pending) = pending else {
            return;
        };
        self.session.borrow_mut().clear();
        let target = self.viewer.borrow().view().container().map(Element::from);
        let driver = self.clone();
        transition::schedule(pending, target, self.timing, move |token| driver.resume(token));
    }

    fn resume(&self, token: TransitionToken) {
        self.viewer.borrow_mut().finish_transition(token);
    }
}
