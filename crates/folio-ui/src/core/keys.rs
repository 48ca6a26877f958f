//! Keyboard input understood by the overlays.

/// Keys the overlays react to, parsed from `KeyboardEvent.key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKey {
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
}

impl OverlayKey {
    /// Parse a DOM key name, accepting the legacy IE/Edge spellings.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Self::Enter),
            " " | "Spacebar" => Some(Self::Space),
            "Escape" | "Esc" => Some(Self::Escape),
            "ArrowLeft" | "Left" => Some(Self::ArrowLeft),
            "ArrowRight" | "Right" => Some(Self::ArrowRight),
            _ => None,
        }
    }

    /// Keys that advance or dismiss a click-through overlay.
    #[must_use]
    pub const fn dismisses(self) -> bool {
        matches!(self, Self::Enter | Self::Space | Self::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::OverlayKey;

    #[test]
    fn parses_modern_and_legacy_names() {
        assert_eq!(OverlayKey::from_key(" "), Some(OverlayKey::Space));
        assert_eq!(OverlayKey::from_key("Spacebar"), Some(OverlayKey::Space));
        assert_eq!(OverlayKey::from_key("Esc"), Some(OverlayKey::Escape));
        assert_eq!(OverlayKey::from_key("Right"), Some(OverlayKey::ArrowRight));
        assert_eq!(OverlayKey::from_key("Tab"), None);
    }

    #[test]
    fn arrows_do_not_dismiss() {
        assert!(OverlayKey::Enter.dismisses());
        assert!(OverlayKey::Escape.dismisses());
        assert!(!OverlayKey::ArrowLeft.dismisses());
    }
}
