//! Functions exported to page scripts.
//!
//! Rejected arguments are logged and ignored; nothing here throws into JavaScript.

use crate::app::{Runtime, runtime};
use crate::core::gallery::GalleryOptions;
use crate::core::sequence::{Completion, SequenceItem};
use crate::core::viewer::DocumentDescriptor;
use gloo::events::EventListener;
use gloo::utils::document;
use js_sys::{Function, JSON};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

/// Start hook: installs logging, applies preferences and binds page widgets
/// once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let runtime = runtime();
    let doc = document();
    if doc.ready_state() == "loading" {
        EventListener::once(&doc, "DOMContentLoaded", move |_| runtime.attach_page()).forget();
    } else {
        runtime.attach_page();
    }
}

fn with_runtime<R>(op: impl FnOnce(&Runtime) -> R) -> R {
    op(&runtime())
}

fn from_js<T: DeserializeOwned>(value: &JsValue, argument: &'static str) -> Option<T> {
    let Some(json) = JSON::stringify(value).ok().and_then(|json| json.as_string()) else {
        tracing::warn!(argument, "argument is not serialisable");
        return None;
    };
    serde_json::from_str(&json)
        .map_err(|err| tracing::warn!(argument, error = %err, "argument rejected"))
        .ok()
}

/// Show `items` one at a time; `on_complete` runs after the last is dismissed.
#[wasm_bindgen(js_name = startSequence)]
pub fn start_sequence(items: &JsValue, on_complete: Option<Function>) {
    let Some(items) = from_js::<Vec<SequenceItem>>(items, "items") else {
        return;
    };
    let on_complete: Completion = Box::new(move || {
        if let Some(callback) = on_complete
            && let Err(err) = callback.call0(&JsValue::NULL)
        {
            tracing::error!(error = ?err, "sequence completion callback failed");
        }
    });
    with_runtime(|runtime| runtime.sequence().start(items, on_complete));
}

/// Re-arm every scroll-triggered popup on the page.
#[wasm_bindgen(js_name = resetSystemPopups)]
pub fn reset_system_popups() {
    with_runtime(|runtime| runtime.triggers().reset());
}

/// Open the document viewer with `{kind, source, markup, title}`.
#[wasm_bindgen(js_name = openDocument)]
pub fn open_document(descriptor: &JsValue) {
    if let Some(descriptor) = from_js::<DocumentDescriptor>(descriptor, "descriptor") {
        with_runtime(|runtime| runtime.viewer().open(descriptor));
    }
}

/// Close the document viewer.
#[wasm_bindgen(js_name = closeDocument)]
pub fn close_document() {
    with_runtime(|runtime| runtime.viewer().close());
}

/// Open the gallery with `{images, title}`.
#[wasm_bindgen(js_name = openGallery)]
pub fn open_gallery(options: &JsValue) {
    if let Some(options) = from_js::<GalleryOptions>(options, "options") {
        with_runtime(|runtime| runtime.gallery().open(options));
    }
}

/// Close the gallery.
#[wasm_bindgen(js_name = closeGallery)]
pub fn close_gallery() {
    with_runtime(|runtime| runtime.gallery().close());
}

/// Jump to a zero-based gallery page.
#[wasm_bindgen(js_name = galleryGoToPage)]
pub fn gallery_go_to_page(index: usize) {
    with_runtime(|runtime| runtime.gallery().go_to_page(index));
}

/// Next gallery page.
#[wasm_bindgen(js_name = galleryNextPage)]
pub fn gallery_next_page() {
    with_runtime(|runtime| runtime.gallery().next_page());
}

/// Previous gallery page.
#[wasm_bindgen(js_name = galleryPrevPage)]
pub fn gallery_prev_page() {
    with_runtime(|runtime| runtime.gallery().prev_page());
}

/// Apply and persist `"light"` or `"dark"`.
#[wasm_bindgen(js_name = setTheme)]
pub fn set_theme(theme: &str) {
    with_runtime(|runtime| runtime.preferences().set_theme(theme));
}

/// Flip between light and dark.
#[wasm_bindgen(js_name = toggleTheme)]
pub fn toggle_theme() {
    with_runtime(|runtime| runtime.preferences().toggle_theme());
}

/// Theme currently applied.
#[wasm_bindgen(js_name = getTheme)]
#[must_use]
pub fn get_theme() -> String {
    with_runtime(|runtime| runtime.preferences().theme().as_str().to_string())
}

/// Apply and persist a font size step.
#[wasm_bindgen(js_name = setFontSize)]
pub fn set_font_size(size: &str) {
    with_runtime(|runtime| runtime.preferences().set_font_size(size));
}

/// One font size step larger.
#[wasm_bindgen(js_name = increaseFontSize)]
pub fn increase_font_size() {
    with_runtime(|runtime| runtime.preferences().increase_font_size());
}

/// One font size step smaller.
#[wasm_bindgen(js_name = decreaseFontSize)]
pub fn decrease_font_size() {
    with_runtime(|runtime| runtime.preferences().decrease_font_size());
}

/// Font size currently applied.
#[wasm_bindgen(js_name = getFontSize)]
#[must_use]
pub fn get_font_size() -> String {
    with_runtime(|runtime| runtime.preferences().font_size().as_str().to_string())
}

/// Hold the shared backdrop for a script-managed overlay.
#[wasm_bindgen(js_name = showBackdrop)]
pub fn show_backdrop() {
    with_runtime(|runtime| runtime.scripts().acquire());
}

/// Release one backdrop hold taken by `showBackdrop`; widgets keep their own.
#[wasm_bindgen(js_name = hideBackdrop)]
pub fn hide_backdrop() {
    with_runtime(|runtime| runtime.scripts().release());
}
