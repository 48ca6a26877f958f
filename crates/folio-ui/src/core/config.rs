//! Runtime configuration for the widgets.
//!
//! # Design
//! - Every field has a default so pages can ship a partial (or no) config block.
//! - Validation runs once at load; an invalid document falls back to defaults.

use crate::core::error::{FolioError, FolioResult};
use crate::core::markup::MarkupPolicy;
use serde::{Deserialize, Serialize};

/// Default storage key for the persisted theme.
pub const DEFAULT_THEME_KEY: &str = "story-theme";
/// Default storage key for the persisted font size.
pub const DEFAULT_FONT_SIZE_KEY: &str = "story-font-size";
/// Viewport band used to fire scroll triggers (middle fifth of the screen).
pub const DEFAULT_TRIGGER_MARGIN: &str = "-40% 0px -40% 0px";
/// Fallback wait when a container never reports `transitionend`.
pub const DEFAULT_EXIT_FALLBACK_MS: u32 = 400;
/// Pause between dismissing one queued popup and presenting the next.
pub const DEFAULT_QUEUE_GAP_MS: u32 = 100;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level widget configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolioConfig {
    /// Persisted preference keys.
    pub storage: StorageKeys,
    /// Scroll trigger observation settings.
    pub trigger: TriggerConfig,
    /// Overlay transition timing.
    pub transitions: TransitionConfig,
    /// How caller-supplied markup is rendered.
    pub markup_policy: MarkupPolicy,
    /// Title used by the document viewer when neither data nor link text provide one.
    pub default_document_title: String,
    /// Minimum log level forwarded to the browser console.
    pub log_level: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            storage: StorageKeys::default(),
            trigger: TriggerConfig::default(),
            transitions: TransitionConfig::default(),
            markup_policy: MarkupPolicy::Trusted,
            default_document_title: "Document".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Local storage keys for persisted preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    /// Key holding the theme value.
    pub theme: String,
    /// Key holding the font size value.
    pub font_size: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME_KEY.to_string(),
            font_size: DEFAULT_FONT_SIZE_KEY.to_string(),
        }
    }
}

/// Intersection settings for scroll-triggered popups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerConfig {
    /// CSS margin narrowing the observed viewport.
    pub root_margin: String,
    /// Overlap ratio required to fire.
    pub threshold: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_TRIGGER_MARGIN.to_string(),
            threshold: 0.0,
        }
    }
}

/// Transition timing shared by every overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    /// Upper bound on waiting for `transitionend`.
    pub exit_fallback_ms: u32,
    /// Pause between consecutive queued popups.
    pub queue_gap_ms: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            exit_fallback_ms: DEFAULT_EXIT_FALLBACK_MS,
            queue_gap_ms: DEFAULT_QUEUE_GAP_MS,
        }
    }
}

impl FolioConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::InvalidConfig`] when the document is malformed or a
    /// field fails validation.
    pub fn from_json(raw: &str) -> FolioResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|_| FolioError::InvalidConfig {
            field: "document",
            reason: "malformed json",
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check field-level invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> FolioResult<()> {
        if self.storage.theme.trim().is_empty() {
            return Err(invalid("storage.theme", "must not be empty"));
        }
        if self.storage.font_size.trim().is_empty() {
            return Err(invalid("storage.fontSize", "must not be empty"));
        }
        if self.storage.theme == self.storage.font_size {
            return Err(invalid("storage.fontSize", "must differ from storage.theme"));
        }
        if !(0.0..=1.0).contains(&self.trigger.threshold) {
            return Err(invalid("trigger.threshold", "must be between 0 and 1"));
        }
        if self.transitions.exit_fallback_ms == 0 {
            return Err(invalid("transitions.exitFallbackMs", "must be positive"));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(invalid("logLevel", "unknown level"));
        }
        Ok(())
    }
}

const fn invalid(field: &'static str, reason: &'static str) -> FolioError {
    FolioError::InvalidConfig { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = FolioConfig::from_json("{}").expect("empty config should parse");
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.storage.theme, "story-theme");
        assert_eq!(config.storage.font_size, "story-font-size");
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = FolioConfig::from_json(
            r#"{"transitions":{"queueGapMs":250},"markupPolicy":"escaped","logLevel":"debug"}"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.transitions.queue_gap_ms, 250);
        assert_eq!(
            config.transitions.exit_fallback_ms,
            DEFAULT_EXIT_FALLBACK_MS
        );
        assert_eq!(config.markup_policy, MarkupPolicy::Escaped);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let err = FolioConfig::from_json(r#"{"trigger":{"threshold":1.5}}"#)
            .expect_err("threshold above one");
        assert_eq!(
            err,
            FolioError::InvalidConfig {
                field: "trigger.threshold",
                reason: "must be between 0 and 1",
            }
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = FolioConfig::from_json("{not json").expect_err("malformed");
        assert!(matches!(
            err,
            FolioError::InvalidConfig {
                field: "document",
                ..
            }
        ));
    }

    #[test]
    fn colliding_storage_keys_are_rejected() {
        let err = FolioConfig::from_json(r#"{"storage":{"theme":"prefs","fontSize":"prefs"}}"#)
            .expect_err("same key twice");
        assert!(matches!(
            err,
            FolioError::InvalidConfig {
                field: "storage.fontSize",
                ..
            }
        ));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(FolioConfig::from_json(r#"{"logLevel":"verbose"}"#).is_err());
    }
}
