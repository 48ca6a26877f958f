//! Small DOM helpers shared by the overlay views.

use gloo::utils::document;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

/// Class toggled on overlay containers once they should be on screen.
pub(crate) const VISIBLE_CLASS: &str = "visible";
/// Class added while an overlay plays its exit transition.
pub(crate) const CLOSING_CLASS: &str = "closing";

/// Render a `JsValue` error for logs.
pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Create an element with the given classes.
pub(crate) fn element(tag: &str, class: &str) -> Option<HtmlElement> {
    let node = document()
        .create_element(tag)
        .map_err(|err| tracing::error!(tag, error = %describe(&err), "create element failed"))
        .ok()?;
    let node = node.dyn_into::<HtmlElement>().ok()?;
    node.set_class_name(class);
    Some(node)
}

/// Create an `<img>` with source and alternative text.
pub(crate) fn image(src: &str, alt: &str, class: &str) -> Option<HtmlElement> {
    let img = element("img", class)?;
    set_attr(&img, "src", src);
    set_attr(&img, "alt", alt);
    Some(img)
}

/// Append `child` to `parent`, logging failures.
pub(crate) fn append(parent: &Element, child: &Element) {
    if let Err(err) = parent.append_child(child) {
        tracing::error!(error = %describe(&err), "append child failed");
    }
}

/// Append to `<body>`; returns `false` when the document has no body.
pub(crate) fn append_to_body(child: &Element) -> bool {
    let Some(body) = document().body() else {
        tracing::warn!("document has no body");
        return false;
    };
    append(&body, child);
    true
}

/// Read the layout so a following class change transitions instead of snapping.
pub(crate) fn flush_layout(node: &HtmlElement) {
    let _ = node.offset_height();
}

/// Mount `node` on the body and start its entrance transition.
pub(crate) fn show_overlay(node: &HtmlElement) {
    if append_to_body(node) {
        flush_layout(node);
        add_class(node, VISIBLE_CLASS);
    }
}

/// Start the exit transition of an overlay container.
pub(crate) fn hide_overlay(node: &Element) {
    remove_class(node, VISIBLE_CLASS);
    add_class(node, CLOSING_CLASS);
}

pub(crate) fn add_class(node: &Element, class: &str) {
    if let Err(err) = node.class_list().add_1(class) {
        tracing::debug!(class, error = %describe(&err), "add class failed");
    }
}

pub(crate) fn remove_class(node: &Element, class: &str) {
    if let Err(err) = node.class_list().remove_1(class) {
        tracing::debug!(class, error = %describe(&err), "remove class failed");
    }
}

pub(crate) fn toggle_class(node: &Element, class: &str, on: bool) {
    if on {
        add_class(node, class);
    } else {
        remove_class(node, class);
    }
}

pub(crate) fn set_attr(node: &Element, name: &str, value: &str) {
    if let Err(err) = node.set_attribute(name, value) {
        tracing::debug!(name, error = %describe(&err), "set attribute failed");
    }
}

/// Read an attribute.
pub(crate) fn attr(node: &Element, name: &str) -> Option<String> {
    node.get_attribute(name)
}

/// Every element matching `selector`, in document order.
pub(crate) fn query_all(selector: &str) -> Vec<Element> {
    let Ok(list) = document().query_selector_all(selector) else {
        tracing::warn!(selector, "invalid selector");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.get(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Closest ancestor (or self) of an event target matching `selector`.
pub(crate) fn closest(target: Option<web_sys::EventTarget>, selector: &str) -> Option<Element> {
    target?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}
