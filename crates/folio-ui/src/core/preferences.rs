//! Persisted reading preferences (theme and font size).
//!
//! # Design
//! - Values are closed enumerations; anything else is rejected before it can reach
//!   storage or the document.
//! - Storage and document access sit behind [`PreferenceBackend`] and
//!   [`PreferenceSurface`] so the store runs without a browser.
//! - Load-time application never writes to storage; only explicit choices persist.

use crate::core::config::StorageKeys;
use crate::core::error::{FolioError, FolioResult};
use crate::core::events::PreferenceEvent;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Colour theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// Attribute and storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Theme matching a `prefers-color-scheme` query result.
    #[must_use]
    pub const fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

impl FromStr for Theme {
    type Err = FolioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(FolioError::InvalidTheme {
                value: other.to_string(),
            }),
        }
    }
}

/// Reading font size, ordered smallest to largest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    /// Small text.
    Small,
    /// Default text size.
    #[default]
    Normal,
    /// Large text.
    Large,
    /// Extra large text.
    XLarge,
}

impl FontSize {
    /// Every size in ascending order.
    pub const ORDERED: [Self; 4] = [Self::Small, Self::Normal, Self::Large, Self::XLarge];

    /// Attribute and storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Normal => "normal",
            Self::Large => "large",
            Self::XLarge => "x-large",
        }
    }

    /// Next larger size, if any.
    #[must_use]
    pub const fn larger(self) -> Option<Self> {
        match self {
            Self::Small => Some(Self::Normal),
            Self::Normal => Some(Self::Large),
            Self::Large => Some(Self::XLarge),
            Self::XLarge => None,
        }
    }

    /// Next smaller size, if any.
    #[must_use]
    pub const fn smaller(self) -> Option<Self> {
        match self {
            Self::Small => None,
            Self::Normal => Some(Self::Small),
            Self::Large => Some(Self::Normal),
            Self::XLarge => Some(Self::Large),
        }
    }
}

impl FromStr for FontSize {
    type Err = FolioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ORDERED
            .into_iter()
            .find(|size| size.as_str() == value)
            .ok_or_else(|| FolioError::InvalidFontSize {
                value: value.to_string(),
            })
    }
}

/// Whether an applied value is written to storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persist {
    /// Write to storage.
    Store,
    /// Apply only (load-time application).
    Skip,
}

/// Persistent key/value storage plus the platform colour-scheme query.
pub trait PreferenceBackend {
    /// Read a stored value.
    fn load(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn store(&self, key: &str, value: &str);
    /// Whether the platform currently prefers a dark colour scheme.
    fn system_prefers_dark(&self) -> bool;
}

/// Document-side effects of applying a preference.
pub trait PreferenceSurface {
    /// Reflect the theme on the root element and bound controls.
    fn apply_theme(&self, theme: Theme);
    /// Reflect the font size on the root element and bound controls.
    fn apply_font_size(&self, size: FontSize);
    /// Broadcast a change to other page scripts.
    fn notify(&self, event: &PreferenceEvent);
}

/// Theme and font-size state with validation and persistence.
#[derive(Debug)]
pub struct PreferenceStore<B, S> {
    backend: B,
    surface: S,
    keys: StorageKeys,
    theme: Theme,
    font_size: FontSize,
}

impl<B: PreferenceBackend, S: PreferenceSurface> PreferenceStore<B, S> {
    /// Build a store; call [`PreferenceStore::init`] to apply persisted values.
    pub fn new(backend: B, surface: S, keys: StorageKeys) -> Self {
        Self {
            backend,
            surface,
            keys,
            theme: Theme::Light,
            font_size: FontSize::default(),
        }
    }

    /// Apply persisted values, falling back to the system theme and default size.
    pub fn init(&mut self) {
        let theme = self
            .stored_theme()
            .unwrap_or_else(|| Theme::from_system(self.backend.system_prefers_dark()));
        self.apply_theme(theme, Persist::Skip);

        let font_size = self
            .backend
            .load(&self.keys.font_size)
            .and_then(|value| value.parse::<FontSize>().ok())
            .unwrap_or_default();
        self.apply_font_size(font_size, Persist::Skip);
    }

    /// Currently applied theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Currently applied font size.
    #[must_use]
    pub const fn font_size(&self) -> FontSize {
        self.font_size
    }

    /// Validate and apply a theme value.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::InvalidTheme`] and leaves state untouched when the
    /// value is not a known theme.
    pub fn set_theme(&mut self, value: &str) -> FolioResult<Theme> {
        let theme = value.parse::<Theme>().inspect_err(|_| {
            tracing::warn!(value, "rejected theme value");
        })?;
        self.apply_theme(theme, Persist::Store);
        Ok(theme)
    }

    /// Switch between light and dark and persist the choice.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggled();
        self.apply_theme(theme, Persist::Store);
        theme
    }

    /// Validate and apply a font size value.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::InvalidFontSize`] and leaves state untouched when
    /// the value is not a known size.
    pub fn set_font_size(&mut self, value: &str) -> FolioResult<FontSize> {
        let size = value.parse::<FontSize>().inspect_err(|_| {
            tracing::warn!(value, "rejected font size value");
        })?;
        self.apply_font_size(size, Persist::Store);
        Ok(size)
    }

    /// Step one size up; returns `false` at the largest size.
    pub fn increase_font_size(&mut self) -> bool {
        self.font_size
            .larger()
            .map(|size| self.apply_font_size(size, Persist::Store))
            .is_some()
    }

    /// Step one size down; returns `false` at the smallest size.
    pub fn decrease_font_size(&mut self) -> bool {
        self.font_size
            .smaller()
            .map(|size| self.apply_font_size(size, Persist::Store))
            .is_some()
    }

    /// Push the current values to the surface again without storing or
    /// announcing them, for controls parsed after [`PreferenceStore::init`].
    pub fn refresh_surface(&self) {
        self.surface.apply_theme(self.theme);
        self.surface.apply_font_size(self.font_size);
    }

    /// Follow a platform colour-scheme change unless the reader chose a theme.
    pub fn system_theme_changed(&mut self, prefers_dark: bool) {
        if self.stored_theme().is_some() {
            tracing::debug!("system theme change ignored; explicit theme persisted");
            return;
        }
        self.apply_theme(Theme::from_system(prefers_dark), Persist::Skip);
    }

    /// Apply a theme that is already known to be valid.
    pub fn apply_theme(&mut self, theme: Theme, persist: Persist) {
        self.theme = theme;
        self.surface.apply_theme(theme);
        if persist == Persist::Store {
            self.backend.store(&self.keys.theme, theme.as_str());
        }
        tracing::debug!(theme = theme.as_str(), "theme applied");
        self.surface.notify(&PreferenceEvent::ThemeChanged { theme });
    }

    /// Apply a font size that is already known to be valid.
    pub fn apply_font_size(&mut self, font_size: FontSize, persist: Persist) {
        self.font_size = font_size;
        self.surface.apply_font_size(font_size);
        if persist == Persist::Store {
            self.backend.store(&self.keys.font_size, font_size.as_str());
        }
        tracing::debug!(font_size = font_size.as_str(), "font size applied");
        self.surface
            .notify(&PreferenceEvent::FontSizeChanged { font_size });
    }

    fn stored_theme(&self) -> Option<Theme> {
        self.backend
            .load(&self.keys.theme)
            .and_then(|value| value.parse::<Theme>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{MemoryBackend, RecordingSurface};

    fn store_with(
        backend: &MemoryBackend,
        surface: &RecordingSurface,
    ) -> PreferenceStore<MemoryBackend, RecordingSurface> {
        let mut store =
            PreferenceStore::new(backend.clone(), surface.clone(), StorageKeys::default());
        store.init();
        store
    }

    #[test]
    fn valid_values_round_trip_through_set_and_get() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);

        for value in ["light", "dark"] {
            let theme = store.set_theme(value).expect("valid theme");
            assert_eq!(store.theme().as_str(), value);
            assert_eq!(surface.theme_attr(), Some(theme));
            assert_eq!(backend.get("story-theme").as_deref(), Some(value));
        }
        for size in FontSize::ORDERED {
            store.set_font_size(size.as_str()).expect("valid size");
            assert_eq!(store.font_size(), size);
            assert_eq!(surface.font_size_attr(), Some(size));
            assert_eq!(backend.get("story-font-size").as_deref(), Some(size.as_str()));
        }
    }

    #[test]
    fn invalid_values_leave_state_unchanged() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);
        store.set_theme("dark").expect("valid theme");
        store.set_font_size("large").expect("valid size");
        let events = surface.events().len();

        let err = store.set_theme("sepia").expect_err("unknown theme");
        assert_eq!(
            err,
            FolioError::InvalidTheme {
                value: "sepia".to_string()
            }
        );
        assert!(store.set_font_size("huge").is_err());
        assert!(store.set_font_size("LARGE").is_err());

        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.font_size(), FontSize::Large);
        assert_eq!(surface.theme_attr(), Some(Theme::Dark));
        assert_eq!(surface.font_size_attr(), Some(FontSize::Large));
        assert_eq!(surface.events().len(), events);
    }

    #[test]
    fn font_size_steps_clamp_at_both_ends() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);

        assert!(store.increase_font_size());
        assert!(store.increase_font_size());
        assert_eq!(store.font_size(), FontSize::XLarge);
        let writes = backend.writes();
        assert!(!store.increase_font_size());
        assert!(!store.increase_font_size());
        assert_eq!(store.font_size(), FontSize::XLarge);
        assert_eq!(backend.writes(), writes);

        for _ in 0..3 {
            assert!(store.decrease_font_size());
        }
        assert_eq!(store.font_size(), FontSize::Small);
        assert!(!store.decrease_font_size());
        assert_eq!(store.font_size(), FontSize::Small);
    }

    #[test]
    fn system_dark_preference_applies_without_writing() {
        let backend = MemoryBackend::default().with_system_dark(true);
        let surface = RecordingSurface::default();
        let store = store_with(&backend, &surface);

        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.font_size(), FontSize::Normal);
        assert_eq!(surface.theme_attr(), Some(Theme::Dark));
        assert_eq!(backend.writes(), 0);
    }

    #[test]
    fn persisted_values_win_over_system_preference() {
        let backend = MemoryBackend::default()
            .with_system_dark(true)
            .with_value("story-theme", "light")
            .with_value("story-font-size", "x-large");
        let surface = RecordingSurface::default();
        let store = store_with(&backend, &surface);

        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.font_size(), FontSize::XLarge);
    }

    #[test]
    fn corrupt_persisted_values_fall_back_to_defaults() {
        let backend = MemoryBackend::default()
            .with_value("story-theme", "neon")
            .with_value("story-font-size", "gigantic");
        let surface = RecordingSurface::default();
        let store = store_with(&backend, &surface);

        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.font_size(), FontSize::Normal);
    }

    #[test]
    fn system_changes_apply_only_without_explicit_theme() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);

        store.system_theme_changed(true);
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(backend.writes(), 0);

        store.toggle_theme();
        assert_eq!(store.theme(), Theme::Light);
        store.system_theme_changed(true);
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn every_applied_change_is_broadcast() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);
        store.toggle_theme();
        store.increase_font_size();

        let events = surface.events();
        assert_eq!(
            events.last(),
            Some(&PreferenceEvent::FontSizeChanged {
                font_size: FontSize::Large
            })
        );
        assert!(events.contains(&PreferenceEvent::ThemeChanged { theme: Theme::Dark }));
    }

    #[test]
    fn custom_storage_keys_are_honoured() {
        let backend = MemoryBackend::default();
        let surface = RecordingSurface::default();
        let keys = StorageKeys {
            theme: "chapter-theme".to_string(),
            font_size: "chapter-size".to_string(),
        };
        let mut store = PreferenceStore::new(backend.clone(), surface, keys);
        store.init();
        store.set_theme("dark").expect("valid theme");
        assert_eq!(backend.get("chapter-theme").as_deref(), Some("dark"));
        assert_eq!(backend.get("story-theme"), None);
    }

    #[test]
    fn refresh_reapplies_without_storing_or_announcing() {
        let backend = MemoryBackend::default().with_value("story-font-size", "large");
        let surface = RecordingSurface::default();
        let mut store = store_with(&backend, &surface);
        store.set_theme("dark").expect("valid theme");
        let writes = backend.writes();
        let events = surface.events().len();
        let applies = surface.applies();

        store.refresh_surface();
        assert_eq!(surface.applies(), applies + 2);
        assert_eq!(surface.theme_attr(), Some(Theme::Dark));
        assert_eq!(surface.font_size_attr(), Some(FontSize::Large));
        assert_eq!(backend.writes(), writes);
        assert_eq!(surface.events().len(), events);
    }
}
