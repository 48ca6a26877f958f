//! Browser view and driver for the sequential presenter.

use crate::app::dom;
use crate::app::transition;
use crate::core::config::TransitionConfig;
use crate::core::keys::OverlayKey;
use crate::core::markup::MarkupPolicy;
use crate::core::overlay::{OverlayHost, Pending, TransitionToken};
use crate::core::sequence::{
    Completion, SequenceItem, SequencePosition, SequencePresenter, SequenceStep, SequenceView,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use gloo::utils::document;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};

const CONTINUE_PROMPT: &str = "Click to continue";
const BEGIN_PROMPT: &str = "Click to begin";

/// Full-screen container showing one slide at a time.
pub(crate) struct DomSequenceView {
    container: Option<HtmlElement>,
    content: Option<HtmlElement>,
    animating: Option<Element>,
    policy: MarkupPolicy,
}

impl DomSequenceView {
    pub(crate) const fn new(policy: MarkupPolicy) -> Self {
        Self {
            container: None,
            content: None,
            animating: None,
            policy,
        }
    }

    /// Element running the exit transition the presenter is waiting on.
    fn animating(&self) -> Option<Element> {
        self.animating.clone()
    }

    fn render_item(&self, item: &SequenceItem, content: &HtmlElement) {
        match item {
            SequenceItem::Image { content: src, alt_text } => {
                let alt = alt_text.as_deref().unwrap_or_default();
                if let Some(img) = dom::image(src, alt, "sequence-image") {
                    dom::append(content, &img);
                }
            }
            SequenceItem::Markup { content: markup } => {
                content.set_inner_html(&markup.render(self.policy));
            }
        }
    }
}

impl SequenceView for DomSequenceView {
    fn mount(&mut self) {
        self.unmount();
        let Some(container) = dom::element("div", "sequence-overlay") else {
            return;
        };
        dom::set_attr(&container, "role", "dialog");
        dom::set_attr(&container, "aria-modal", "true");
        dom::show_overlay(&container);
        self.container = Some(container);
    }

    fn render(&mut self, item: &SequenceItem, position: SequencePosition) {
        let Some(container) = self.container.as_ref() else {
            return;
        };
        container.set_inner_html("");
        let Some(content) = dom::element("div", "sequence-content") else {
            return;
        };
        self.render_item(item, &content);

        let (class, label) = if position.is_last() {
            ("sequence-prompt begin", BEGIN_PROMPT)
        } else {
            ("sequence-prompt", CONTINUE_PROMPT)
        };
        if let Some(prompt) = dom::element("span", class) {
            prompt.set_text_content(Some(label));
            dom::append(&content, &prompt);
        }
        dom::append(container, &content);
        tracing::trace!(index = position.index, len = position.len, "sequence item shown");
        self.content = Some(content);
        self.animating = None;
    }

    fn play_item_exit(&mut self) {
        if let Some(content) = self.content.as_ref() {
            dom::add_class(content, "exiting");
            self.animating = Some(Element::from(content.clone()));
        }
    }

    fn play_close(&mut self) {
        if let Some(container) = self.container.as_ref() {
            dom::hide_overlay(container);
            self.animating = Some(Element::from(container.clone()));
        }
    }

    fn unmount(&mut self) {
        self.content = None;
        self.animating = None;
        if let Some(container) = self.container.take() {
            container.remove();
        }
    }
}

type Presenter = SequencePresenter<DomSequenceView>;

/// Presenter wired to document input and transition signals.
#[derive(Clone)]
pub(crate) struct SequenceDriver {
    presenter: Rc<RefCell<Presenter>>,
    timing: TransitionConfig,
    listeners: Rc<RefCell<Vec<EventListener>>>,
    arming: Rc<RefCell<Option<Timeout>>>,
}

impl SequenceDriver {
    pub(crate) fn new(host: Rc<OverlayHost>, policy: MarkupPolicy, timing: TransitionConfig) -> Self {
        let presenter = SequencePresenter::new(DomSequenceView::new(policy), host);
        Self {
            presenter: Rc::new(RefCell::new(presenter)),
            timing,
            listeners: Rc::new(RefCell::new(Vec::new())),
            arming: Rc::new(RefCell::new(None)),
        }
    }

    /// Show `items`; `on_complete` runs once the last one has been dismissed.
    pub(crate) fn start(&self, items: Vec<SequenceItem>, on_complete: Completion) {
        self.unbind();
        let leftover = self.presenter.borrow_mut().start(items, on_complete);
        if let Some(callback) = leftover {
            callback();
            return;
        }
        // Input is bound on the next tick so the click that started us does not advance.
        let driver = self.clone();
        *self.arming.borrow_mut() = Some(Timeout::new(0, move || driver.bind()));
    }

    fn bind(&self) {
        if !self.presenter.borrow().is_active() {
            return;
        }
        let doc = document();
        let on_click = {
            let driver = self.clone();
            EventListener::new(&doc, "click", move |_| driver.advance())
        };
        let on_key = {
            let driver = self.clone();
            EventListener::new_with_options(
                &doc,
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(key) = event
                        .dyn_ref::<KeyboardEvent>()
                        .and_then(|event| OverlayKey::from_key(&event.key()))
                    else {
                        return;
                    };
                    if key.dismisses() {
                        event.prevent_default();
                        driver.advance();
                    }
                },
            )
        };
        *self.listeners.borrow_mut() = vec![on_click, on_key];
    }

    fn unbind(&self) {
        self.listeners.borrow_mut().clear();
        self.arming.borrow_mut().take();
    }

    fn advance(&self) {
        let pending = self.presenter.borrow_mut().advance();
        if let Some(pending) = pending {
            self.await_pending(pending);
        }
    }

    fn await_pending(&self, pending: Pending) {
        let target = self.presenter.borrow().view().animating();
        let driver = self.clone();
        transition::schedule(pending, target, self.timing, move |token| driver.resume(token));
    }

    fn resume(&self, token: TransitionToken) {
        let step = self.presenter.borrow_mut().finish_transition(token);
        match step {
            SequenceStep::Idle => {}
            SequenceStep::Await(pending) => self.await_pending(pending),
            SequenceStep::Complete(callback) => {
                self.unbind();
                callback();
            }
        }
    }
}
