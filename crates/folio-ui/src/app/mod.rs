//! Browser runtime: page configuration, the shared backdrop and one driver per widget.
//!
//! # Design
//! - One runtime per page, created on first use so exported functions work
//!   even when page scripts call them before the start hook.
//! - Preferences apply immediately; marker scanning and link interception wait
//!   for the document to finish parsing.

use crate::core::config::FolioConfig;
use crate::core::error::FolioResult;
use crate::core::overlay::{OverlayHost, ScriptLeases};
use backdrop::DomBackdrop;
use gallery::GalleryDriver;
use gloo::utils::document;
use preferences::PreferenceDriver;
use sequence::SequenceDriver;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use trigger::TriggerDriver;
use viewer::ViewerDriver;

mod backdrop;
mod dom;
pub mod exports;
mod gallery;
mod preferences;
mod sequence;
mod telemetry;
mod transition;
mod trigger;
mod viewer;

const CONFIG_ELEMENT_ID: &str = "folio-config";

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = const { RefCell::new(None) };
}

/// Every widget on the page, sharing one overlay host.
pub(crate) struct Runtime {
    scripts: ScriptLeases,
    preferences: PreferenceDriver,
    sequence: SequenceDriver,
    triggers: TriggerDriver,
    viewer: ViewerDriver,
    gallery: GalleryDriver,
    attached: Cell<bool>,
}

impl Runtime {
    fn new(config: &FolioConfig) -> Self {
        let backdrop = DomBackdrop::default();
        let host = OverlayHost::new(Box::new(backdrop.clone()));
        let policy = config.markup_policy;
        let timing = config.transitions;
        Self {
            preferences: PreferenceDriver::new(config.storage.clone()),
            sequence: SequenceDriver::new(Rc::clone(&host), policy, timing),
            triggers: TriggerDriver::new(Rc::clone(&host), policy, config.trigger.clone(), timing),
            viewer: ViewerDriver::new(
                Rc::clone(&host),
                backdrop,
                policy,
                &config.default_document_title,
                timing,
            ),
            gallery: GalleryDriver::new(Rc::clone(&host), timing),
            scripts: ScriptLeases::new(host),
            attached: Cell::new(false),
        }
    }

    /// Bind the widgets that depend on page content; runs once.
    pub(crate) fn attach_page(&self) {
        if self.attached.replace(true) {
            return;
        }
        self.preferences.refresh_controls();
        self.triggers.init();
        self.viewer.init();
        tracing::info!("folio widgets ready");
    }

    /// Backdrop leases held by page scripts.
    pub(crate) const fn scripts(&self) -> &ScriptLeases {
        &self.scripts
    }

    pub(crate) const fn preferences(&self) -> &PreferenceDriver {
        &self.preferences
    }

    pub(crate) const fn sequence(&self) -> &SequenceDriver {
        &self.sequence
    }

    pub(crate) const fn triggers(&self) -> &TriggerDriver {
        &self.triggers
    }

    pub(crate) const fn viewer(&self) -> &ViewerDriver {
        &self.viewer
    }

    pub(crate) const fn gallery(&self) -> &GalleryDriver {
        &self.gallery
    }
}

/// Page runtime, created (and its preferences applied) on first call.
pub(crate) fn runtime() -> Rc<Runtime> {
    let existing = RUNTIME.with(|slot| slot.borrow().clone());
    if let Some(runtime) = existing {
        return runtime;
    }
    let config = configure();
    let runtime = Rc::new(Runtime::new(&config));
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&runtime)));
    // Stored first: change events from init may re-enter through the exports.
    runtime.preferences.init();
    runtime
}

fn configure() -> FolioConfig {
    let (config, problem) = match read_config() {
        Ok(Some(config)) => (config, None),
        Ok(None) => (FolioConfig::default(), None),
        Err(err) => (FolioConfig::default(), Some(err)),
    };
    telemetry::init_logging(&config.log_level);
    if let Some(err) = problem {
        tracing::warn!(error = %err, "invalid page configuration; using defaults");
    }
    config
}

fn read_config() -> FolioResult<Option<FolioConfig>> {
    let Some(node) = document().get_element_by_id(CONFIG_ELEMENT_ID) else {
        return Ok(None);
    };
    let raw = node.text_content().unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    FolioConfig::from_json(&raw).map(Some)
}
