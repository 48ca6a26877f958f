#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Folio overlay widgets and reading preferences for static story pages.
//!
//! `core` holds the DOM-free state machines and is tested natively; the wasm32
//! build adds the browser bindings and the JavaScript surface.

pub mod core;

pub use crate::core::config::FolioConfig;
pub use crate::core::error::{FolioError, FolioResult};
pub use crate::core::overlay::{OverlayHost, OverlayLease};
pub use crate::core::preferences::{FontSize, PreferenceStore, Theme};

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;

#[cfg(target_arch = "wasm32")]
pub use app::exports;
