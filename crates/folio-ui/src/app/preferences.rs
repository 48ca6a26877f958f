//! Browser bindings for the preference store.
//!
//! # Design
//! - Values live in `localStorage` as plain strings (not JSON) so pages and
//!   inline head scripts can read them directly.
//! - Change events are queued while the store is borrowed and dispatched after,
//!   so page listeners may call back into the store.

use crate::app::dom;
use crate::core::config::StorageKeys;
use crate::core::events::PreferenceEvent;
use crate::core::preferences::{FontSize, PreferenceBackend, PreferenceStore, PreferenceSurface, Theme};
use gloo::events::EventListener;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::{document, window};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, MediaQueryList, MediaQueryListEvent};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
const THEME_TOGGLE: &str = "[data-theme-toggle]";
const FONT_SIZE_ACTION: &str = "[data-font-size-action]";
const FONT_SIZE_OPTION: &str = "[data-font-size-option]";

/// `localStorage` plus the `prefers-color-scheme` media query.
pub(crate) struct LocalStorageBackend;

impl PreferenceBackend for LocalStorageBackend {
    fn load(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn store(&self, key: &str, value: &str) {
        if let Err(err) = LocalStorage::raw().set_item(key, value) {
            tracing::error!(key, error = %dom::describe(&err), "storage write failed");
        }
    }

    fn system_prefers_dark(&self) -> bool {
        dark_query().is_some_and(|media| media.matches())
    }
}

fn dark_query() -> Option<MediaQueryList> {
    window().match_media(DARK_QUERY).ok().flatten()
}

/// Root attributes, bound controls and queued change events.
#[derive(Clone, Default)]
pub(crate) struct DocumentSurface {
    outbox: Rc<RefCell<Vec<PreferenceEvent>>>,
}

impl DocumentSurface {
    fn drain(&self) -> Vec<PreferenceEvent> {
        self.outbox.borrow_mut().drain(..).collect()
    }
}

impl PreferenceSurface for DocumentSurface {
    fn apply_theme(&self, theme: Theme) {
        if let Some(root) = document().document_element() {
            dom::set_attr(&root, "data-theme", theme.as_str());
        }
        let pressed = if theme == Theme::Dark { "true" } else { "false" };
        for toggle in dom::query_all(THEME_TOGGLE) {
            dom::set_attr(&toggle, "aria-pressed", pressed);
        }
    }

    fn apply_font_size(&self, size: FontSize) {
        if let Some(root) = document().document_element() {
            dom::set_attr(&root, "data-font-size", size.as_str());
        }
        for option in dom::query_all(FONT_SIZE_OPTION) {
            let active = dom::attr(&option, "data-font-size-option").as_deref() == Some(size.as_str());
            dom::toggle_class(&option, "active", active);
            dom::set_attr(&option, "aria-pressed", if active { "true" } else { "false" });
        }
        for action in dom::query_all(FONT_SIZE_ACTION) {
            let exhausted = match dom::attr(&action, "data-font-size-action").as_deref() {
                Some("increase") => size.larger().is_none(),
                Some("decrease") => size.smaller().is_none(),
                _ => false,
            };
            if exhausted {
                dom::set_attr(&action, "disabled", "");
            } else if let Err(err) = action.remove_attribute("disabled") {
                tracing::debug!(error = %dom::describe(&err), "enable control failed");
            }
        }
    }

    fn notify(&self, event: &PreferenceEvent) {
        self.outbox.borrow_mut().push(*event);
    }
}

type Store = PreferenceStore<LocalStorageBackend, DocumentSurface>;

/// Preference store wired to the document.
#[derive(Clone)]
pub(crate) struct PreferenceDriver {
    store: Rc<RefCell<Store>>,
    surface: DocumentSurface,
    listeners: Rc<RefCell<Vec<EventListener>>>,
}

impl PreferenceDriver {
    pub(crate) fn new(keys: StorageKeys) -> Self {
        let surface = DocumentSurface::default();
        let store = PreferenceStore::new(LocalStorageBackend, surface.clone(), keys);
        Self {
            store: Rc::new(RefCell::new(store)),
            surface,
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Apply persisted values and start listening for system and control changes.
    pub(crate) fn init(&self) {
        self.with_store(PreferenceStore::init);
        let mut listeners = Vec::new();

        if let Some(media) = dark_query() {
            let driver = self.clone();
            listeners.push(EventListener::new(&media, "change", move |event| {
                if let Some(change) = event.dyn_ref::<MediaQueryListEvent>() {
                    let prefers_dark = change.matches();
                    driver.with_store(|store| store.system_theme_changed(prefers_dark));
                }
            }));
        }

        let driver = self.clone();
        listeners.push(EventListener::new(&document(), "click", move |event| {
            driver.handle_control_click(event);
        }));
        *self.listeners.borrow_mut() = listeners;
    }

    /// Re-apply control state once the page's controls exist.
    pub(crate) fn refresh_controls(&self) {
        self.store.borrow().refresh_surface();
    }

    pub(crate) fn theme(&self) -> Theme {
        self.store.borrow().theme()
    }

    pub(crate) fn font_size(&self) -> FontSize {
        self.store.borrow().font_size()
    }

    pub(crate) fn set_theme(&self, value: &str) {
        let _ = self.with_store(|store| store.set_theme(value));
    }

    pub(crate) fn toggle_theme(&self) {
        self.with_store(PreferenceStore::toggle_theme);
    }

    pub(crate) fn set_font_size(&self, value: &str) {
        let _ = self.with_store(|store| store.set_font_size(value));
    }

    pub(crate) fn increase_font_size(&self) {
        self.with_store(PreferenceStore::increase_font_size);
    }

    pub(crate) fn decrease_font_size(&self) {
        self.with_store(PreferenceStore::decrease_font_size);
    }

    fn handle_control_click(&self, event: &web_sys::Event) {
        if dom::closest(event.target(), THEME_TOGGLE).is_some() {
            self.toggle_theme();
            return;
        }
        if let Some(action) = dom::closest(event.target(), FONT_SIZE_ACTION) {
            match dom::attr(&action, "data-font-size-action").as_deref() {
                Some("increase") => self.increase_font_size(),
                Some("decrease") => self.decrease_font_size(),
                other => tracing::debug!(action = ?other, "unknown font size action"),
            }
            return;
        }
        if let Some(option) = dom::closest(event.target(), FONT_SIZE_OPTION)
            && let Some(value) = dom::attr(&option, "data-font-size-option")
        {
            self.set_font_size(&value);
        }
    }

    fn with_store<R>(&self, op: impl FnOnce(&mut Store) -> R) -> R {
        let result = op(&mut *self.store.borrow_mut());
        for event in self.surface.drain() {
            dispatch(&event);
        }
        result
    }
}

fn dispatch(event: &PreferenceEvent) {
    let init = CustomEventInit::new();
    match js_sys::JSON::parse(&event.detail_json()) {
        Ok(detail) => init.set_detail(&detail),
        Err(err) => tracing::debug!(error = %dom::describe(&err), "event detail parse failed"),
    }
    match CustomEvent::new_with_event_init_dict(event.event_name(), &init) {
        Ok(custom) => {
            if let Err(err) = document().dispatch_event(&custom) {
                tracing::warn!(event = event.event_name(), error = %dom::describe(&err), "dispatch failed");
            }
        }
        Err(err) => tracing::warn!(error = %dom::describe(&err), "custom event construction failed"),
    }
}
