//! Change notifications emitted to page scripts.
//!
//! # Design
//! - Dispatched as DOM `CustomEvent`s; the detail payload is the JSON form below.

use crate::core::preferences::{FontSize, Theme};
use serde::Serialize;

/// Preference change broadcast after every applied set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PreferenceEvent {
    /// Theme was applied.
    ThemeChanged {
        /// Applied theme.
        theme: Theme,
    },
    /// Font size was applied.
    FontSizeChanged {
        /// Applied font size.
        #[serde(rename = "fontSize")]
        font_size: FontSize,
    },
}

impl PreferenceEvent {
    /// DOM event type used for dispatch.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ThemeChanged { .. } => "themechange",
            Self::FontSizeChanged { .. } => "fontsizechange",
        }
    }

    /// JSON payload placed in `CustomEvent.detail`.
    #[must_use]
    pub fn detail_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_event_serializes_value() {
        let event = PreferenceEvent::ThemeChanged { theme: Theme::Dark };
        assert_eq!(event.event_name(), "themechange");
        assert_eq!(event.detail_json(), r#"{"theme":"dark"}"#);
    }

    #[test]
    fn font_size_event_uses_camel_case_key() {
        let event = PreferenceEvent::FontSizeChanged {
            font_size: FontSize::XLarge,
        };
        assert_eq!(event.event_name(), "fontsizechange");
        assert_eq!(event.detail_json(), r#"{"fontSize":"x-large"}"#);
    }
}
