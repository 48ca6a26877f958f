//! Core, DOM-free state machines and helpers for the widgets.
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod keys;
pub mod markup;
pub mod overlay;
pub mod preferences;
pub mod sequence;
pub mod trigger;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;
