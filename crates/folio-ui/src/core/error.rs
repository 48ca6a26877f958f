//! Error types for widget operations.
//!
//! # Design
//! - Every rejection is a typed variant so the wasm surface can log it with context.
//! - None of these escape to page scripts; the JS bindings log and swallow them.

use thiserror::Error;

/// Primary error type for overlay and preference operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FolioError {
    /// Theme value is not one of the supported themes.
    #[error("invalid theme value")]
    InvalidTheme {
        /// Value supplied by the caller.
        value: String,
    },
    /// Font size value is not one of the supported sizes.
    #[error("invalid font size value")]
    InvalidFontSize {
        /// Value supplied by the caller.
        value: String,
    },
    /// Gallery was opened without any images.
    #[error("gallery requires at least one image")]
    EmptyGallery,
    /// Gallery was opened while another gallery is still on screen.
    #[error("gallery is already open")]
    GalleryAlreadyOpen,
    /// Gallery navigation targeted a page that does not exist.
    #[error("gallery page out of range")]
    PageOutOfRange {
        /// Requested page index.
        index: usize,
        /// Number of pages in the gallery.
        len: usize,
    },
    /// Configuration field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidConfig {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for results produced by widget operations.
pub type FolioResult<T> = Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::FolioError;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            FolioError::InvalidTheme {
                value: "sepia".to_string()
            }
            .to_string(),
            "invalid theme value"
        );
        assert_eq!(
            FolioError::PageOutOfRange { index: 4, len: 3 }.to_string(),
            "gallery page out of range"
        );
    }
}
