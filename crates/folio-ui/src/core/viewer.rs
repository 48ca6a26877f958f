//! Document viewer overlay for embedded documents, images and articles.
//!
//! # Design
//! - Single instance: opening replaces whatever is on screen, including a viewer
//!   that is still animating out.
//! - Descriptors are built from link data attributes with graceful fallbacks.

use crate::core::keys::OverlayKey;
use crate::core::markup::Markup;
use crate::core::overlay::{Generation, OverlayHost, OverlayLease, Pending, TransitionToken};
use serde::{Deserialize, Deserializer, Serialize};
use std::rc::Rc;

/// What the viewer renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Embedded frame (PDF or HTML page).
    EmbeddedDoc,
    /// Single image.
    #[default]
    Image,
    /// Inline article markup.
    Article,
}

impl DocumentKind {
    /// Parse a `data-doc-type` value; unknown values render as images.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("pdf" | "embed" | "document" | "embedded-doc") => Self::EmbeddedDoc,
            Some("article" | "html") => Self::Article,
            _ => Self::Image,
        }
    }
}

impl<'de> Deserialize<'de> for DocumentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_attribute(raw.as_deref()))
    }
}

/// Content for one viewer session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    /// Rendering mode.
    #[serde(default)]
    pub kind: DocumentKind,
    /// URL for frames and images.
    #[serde(default)]
    pub source: Option<String>,
    /// Article body.
    #[serde(default)]
    pub markup: Option<Markup>,
    /// Header title.
    #[serde(default)]
    pub title: String,
}

/// Raw data attributes read from an activating element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentAttributes {
    /// `data-doc-type`.
    pub kind: Option<String>,
    /// `data-doc-src`.
    pub source: Option<String>,
    /// `href`, used when no explicit source is present.
    pub href: Option<String>,
    /// `data-doc-html`.
    pub markup: Option<String>,
    /// `data-doc-title`.
    pub title: Option<String>,
    /// Visible link text.
    pub text: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl DocumentDescriptor {
    /// Build a descriptor, falling back to `href` for the source and to the link
    /// text, then `default_title`, for the title.
    #[must_use]
    pub fn from_attributes(attrs: DocumentAttributes, default_title: &str) -> Self {
        let title = non_blank(attrs.title)
            .or_else(|| non_blank(attrs.text))
            .unwrap_or_else(|| default_title.to_string());
        Self {
            kind: DocumentKind::from_attribute(attrs.kind.as_deref()),
            source: non_blank(attrs.source).or_else(|| non_blank(attrs.href)),
            markup: attrs.markup.map(Markup::new).filter(|markup| !markup.is_blank()),
            title,
        }
    }

    /// Apply the title fallback to a descriptor supplied by a page script.
    #[must_use]
    pub fn with_default_title(mut self, default_title: &str) -> Self {
        if self.title.trim().is_empty() {
            self.title = default_title.to_string();
        }
        self
    }
}

/// Rendering side of the viewer.
pub trait ViewerView {
    /// Build the container for `descriptor`.
    fn build(&mut self, descriptor: &DocumentDescriptor);
    /// Animate the container out.
    fn play_close(&mut self);
    /// Remove the container.
    fn destroy(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Closed,
    Open,
    Closing(TransitionToken),
}

/// On-demand single-document overlay.
pub struct DocumentViewer<V> {
    view: V,
    host: Rc<OverlayHost>,
    phase: Phase,
    generation: Generation,
    lease: Option<OverlayLease>,
    current: Option<DocumentDescriptor>,
}

impl<V: ViewerView> DocumentViewer<V> {
    /// Build a closed viewer.
    pub fn new(view: V, host: Rc<OverlayHost>) -> Self {
        Self {
            view,
            host,
            phase: Phase::Closed,
            generation: Generation::default(),
            lease: None,
            current: None,
        }
    }

    /// Show `descriptor`, replacing any viewer already on screen.
    pub fn open(&mut self, descriptor: DocumentDescriptor) {
        if self.phase != Phase::Closed {
            tracing::debug!("replacing open document viewer");
            self.view.destroy();
        }
        self.generation.advance();
        if self.lease.is_none() {
            self.lease = Some(self.host.acquire());
        }
        tracing::debug!(title = %descriptor.title, kind = ?descriptor.kind, "opening document");
        self.view.build(&descriptor);
        self.current = Some(descriptor);
        self.phase = Phase::Open;
    }

    /// Start closing; no-op unless open.
    pub fn close(&mut self) -> Option<Pending> {
        if self.phase != Phase::Open {
            return None;
        }
        let token = self.generation.advance();
        self.phase = Phase::Closing(token);
        self.lease = None;
        self.view.play_close();
        Some(Pending::Transition(token))
    }

    /// Escape closes while open; other keys are ignored.
    pub fn handle_key(&mut self, key: OverlayKey) -> Option<Pending> {
        if key == OverlayKey::Escape {
            self.close()
        } else {
            None
        }
    }

    /// Remove the container once the exit transition finished.
    pub fn finish_transition(&mut self, token: TransitionToken) {
        if !self.generation.is_current(token) {
            return;
        }
        if self.phase == Phase::Closing(token) {
            self.view.destroy();
            self.current = None;
            self.phase = Phase::Closed;
        }
    }

    /// Whether the viewer is open (not closing).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Open)
    }

    /// Descriptor currently on screen.
    #[must_use]
    pub const fn current(&self) -> Option<&DocumentDescriptor> {
        self.current.as_ref()
    }

    /// Rendering view.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingBackdrop, RecordingViewerView};

    fn viewer() -> (DocumentViewer<RecordingViewerView>, RecordingViewerView, Rc<OverlayHost>) {
        let view = RecordingViewerView::default();
        let host = OverlayHost::new(Box::new(RecordingBackdrop::default()));
        (DocumentViewer::new(view.clone(), Rc::clone(&host)), view, host)
    }

    fn image(title: &str) -> DocumentDescriptor {
        DocumentDescriptor {
            kind: DocumentKind::Image,
            source: Some(format!("{title}.png")),
            markup: None,
            title: title.to_string(),
        }
    }

    #[test]
    fn open_then_close_releases_backdrop_and_destroys() {
        let (mut viewer, view, host) = viewer();
        viewer.open(image("map"));
        assert!(viewer.is_open());
        assert!(host.is_visible());

        let pending = viewer.close().expect("open viewer closes");
        assert!(!host.is_visible());
        assert_eq!(view.live(), 1);
        viewer.finish_transition(pending.token());
        assert_eq!(view.live(), 0);
        assert!(viewer.current().is_none());
        assert!(viewer.close().is_none());
    }

    #[test]
    fn reopening_replaces_without_stacking() {
        let (mut viewer, view, host) = viewer();
        viewer.open(image("first"));
        viewer.open(image("second"));
        assert_eq!(view.live(), 1);
        assert_eq!(host.open_count(), 1);
        assert_eq!(viewer.current().map(|doc| doc.title.as_str()), Some("second"));
    }

    #[test]
    fn stale_close_does_not_destroy_replacement() {
        let (mut viewer, view, host) = viewer();
        viewer.open(image("first"));
        let pending = viewer.close().expect("close");
        viewer.open(image("second"));
        viewer.finish_transition(pending.token());
        assert!(viewer.is_open());
        assert_eq!(view.live(), 1);
        assert_eq!(host.open_count(), 1);
    }

    #[test]
    fn escape_closes_only_while_open() {
        let (mut viewer, _view, _host) = viewer();
        assert!(viewer.handle_key(OverlayKey::Escape).is_none());
        viewer.open(image("letter"));
        assert!(viewer.handle_key(OverlayKey::Enter).is_none());
        assert!(viewer.handle_key(OverlayKey::Escape).is_some());
        assert!(viewer.handle_key(OverlayKey::Escape).is_none());
    }

    #[test]
    fn attributes_fall_back_to_href_and_link_text() {
        let descriptor = DocumentDescriptor::from_attributes(
            DocumentAttributes {
                kind: Some("pdf".into()),
                href: Some("/docs/report.pdf".into()),
                text: Some("  Incident report ".into()),
                ..DocumentAttributes::default()
            },
            "Document",
        );
        assert_eq!(descriptor.kind, DocumentKind::EmbeddedDoc);
        assert_eq!(descriptor.source.as_deref(), Some("/docs/report.pdf"));
        assert_eq!(descriptor.title, "Incident report");
    }

    #[test]
    fn unknown_kind_renders_as_image_with_default_title() {
        let descriptor = DocumentDescriptor::from_attributes(
            DocumentAttributes {
                kind: Some("hologram".into()),
                source: Some("scan.jpg".into()),
                ..DocumentAttributes::default()
            },
            "Document",
        );
        assert_eq!(descriptor.kind, DocumentKind::Image);
        assert_eq!(descriptor.title, "Document");
    }

    #[test]
    fn script_descriptors_deserialize_with_defaults() {
        let descriptor: DocumentDescriptor =
            serde_json::from_str(r#"{"kind":"article","markup":"<p>Day one</p>"}"#)
                .expect("valid descriptor");
        let descriptor = descriptor.with_default_title("Journal");
        assert_eq!(descriptor.kind, DocumentKind::Article);
        assert_eq!(descriptor.title, "Journal");
        assert_eq!(descriptor.markup, Some(Markup::new("<p>Day one</p>")));
    }

    #[test]
    fn script_descriptors_accept_attribute_kinds() {
        let parse = |json: &str| {
            serde_json::from_str::<DocumentDescriptor>(json)
                .expect("valid descriptor")
                .kind
        };
        assert_eq!(
            parse(r#"{"kind":"hologram","source":"scan.jpg","title":"Scan"}"#),
            DocumentKind::Image
        );
        assert_eq!(parse(r#"{"kind":"pdf","source":"a.pdf"}"#), DocumentKind::EmbeddedDoc);
        assert_eq!(parse(r#"{"kind":"embedded-doc"}"#), DocumentKind::EmbeddedDoc);
        assert_eq!(parse(r#"{"kind":"html","markup":"<p>x</p>"}"#), DocumentKind::Article);
        assert_eq!(parse(r#"{"kind":null,"source":"a.png"}"#), DocumentKind::Image);
    }
}
