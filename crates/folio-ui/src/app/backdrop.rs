//! Browser backdrop element behind every overlay.

use crate::app::dom::{self, VISIBLE_CLASS};
use crate::core::overlay::BackdropSurface;
use gloo::utils::document;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlElement;

const BACKDROP_ID: &str = "folio-backdrop";

/// Lazily created dimming layer; clones share the same element.
#[derive(Clone, Default)]
pub(crate) struct DomBackdrop {
    node: Rc<RefCell<Option<HtmlElement>>>,
}

impl DomBackdrop {
    /// Backdrop element, if it has been created.
    pub(crate) fn node(&self) -> Option<HtmlElement> {
        self.node.borrow().clone()
    }

    fn ensure(&self) -> Option<HtmlElement> {
        if let Some(node) = self.node() {
            return Some(node);
        }
        let node = dom::element("div", "overlay-backdrop")?;
        node.set_id(BACKDROP_ID);
        if !dom::append_to_body(&node) {
            return None;
        }
        *self.node.borrow_mut() = Some(node.clone());
        Some(node)
    }
}

impl BackdropSurface for DomBackdrop {
    fn reveal(&self) {
        if let Some(node) = self.ensure() {
            dom::flush_layout(&node);
            dom::add_class(&node, VISIBLE_CLASS);
        }
    }

    fn conceal(&self) {
        if let Some(node) = self.node() {
            dom::remove_class(&node, VISIBLE_CLASS);
        }
    }

    fn lock_scroll(&self, locked: bool) {
        let Some(body) = document().body() else {
            return;
        };
        let style = body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
        if let Err(err) = result {
            tracing::debug!(locked, error = %dom::describe(&err), "scroll lock update failed");
        }
    }
}
