//! Paged image gallery.
//!
//! # Design
//! - [`GalleryState`] holds the page invariant `current < len`; every navigation
//!   goes through [`GalleryState::go_to`].
//! - [`Gallery`] adds the overlay lifecycle (single instance, backdrop lease,
//!   animated close) on top of the state.

use crate::core::error::{FolioError, FolioResult};
use crate::core::keys::OverlayKey;
use crate::core::overlay::{Generation, OverlayHost, OverlayLease, Pending, TransitionToken};
use serde::Deserialize;
use std::rc::Rc;

/// Options accepted by `openGallery`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GalleryOptions {
    /// Image URLs in page order.
    pub images: Vec<String>,
    /// Header title.
    pub title: String,
}

/// Pages of an open gallery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryState {
    images: Vec<String>,
    title: String,
    current: usize,
}

impl GalleryState {
    /// Build a gallery positioned on the first page.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::EmptyGallery`] when `images` is empty.
    pub fn new(images: Vec<String>, title: impl Into<String>) -> FolioResult<Self> {
        if images.is_empty() {
            return Err(FolioError::EmptyGallery);
        }
        Ok(Self {
            images,
            title: title.into(),
            current: 0,
        })
    }

    /// Move to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::PageOutOfRange`] and keeps the current page when
    /// `index` is not a valid page.
    pub fn go_to(&mut self, index: usize) -> FolioResult<()> {
        if index >= self.images.len() {
            return Err(FolioError::PageOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Move forward one page; `false` on the last page.
    pub fn next(&mut self) -> bool {
        self.can_next() && self.go_to(self.current + 1).is_ok()
    }

    /// Move back one page; `false` on the first page.
    pub fn prev(&mut self) -> bool {
        self.can_prev() && self.go_to(self.current - 1).is_ok()
    }

    /// Whether the previous button is enabled.
    #[must_use]
    pub const fn can_prev(&self) -> bool {
        self.current > 0
    }

    /// Whether the next button is enabled.
    #[must_use]
    pub fn can_next(&self) -> bool {
        self.current + 1 < self.images.len()
    }

    /// Zero-based current page.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always `false`; kept alongside `len` for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Header title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Image for the current page.
    #[must_use]
    pub fn current_image(&self) -> &str {
        self.images
            .get(self.current)
            .map_or("", String::as_str)
    }

    /// Human-readable position, e.g. `Page 1 of 3`.
    #[must_use]
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current + 1, self.images.len())
    }

    /// One flag per page, `true` for the current page.
    pub fn indicators(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.images.len()).map(move |idx| idx == self.current)
    }
}

/// Rendering side of the gallery.
pub trait GalleryView {
    /// Create the container and render the first page.
    fn mount(&mut self, state: &GalleryState);
    /// Re-render after a page change.
    fn show_page(&mut self, state: &GalleryState);
    /// Animate the container out.
    fn play_close(&mut self);
    /// Remove the container.
    fn unmount(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Closed,
    Open,
    Closing(TransitionToken),
}

/// On-demand paged gallery overlay.
pub struct Gallery<V> {
    view: V,
    host: Rc<OverlayHost>,
    state: Option<GalleryState>,
    phase: Phase,
    generation: Generation,
    lease: Option<OverlayLease>,
}

impl<V: GalleryView> Gallery<V> {
    /// Build a closed gallery.
    pub fn new(view: V, host: Rc<OverlayHost>) -> Self {
        Self {
            view,
            host,
            state: None,
            phase: Phase::Closed,
            generation: Generation::default(),
            lease: None,
        }
    }

    /// Open on the first page.
    ///
    /// A gallery that is still animating out is removed immediately.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::GalleryAlreadyOpen`] while another gallery is open
    /// and [`FolioError::EmptyGallery`] for an empty image list.
    pub fn open(&mut self, options: GalleryOptions) -> FolioResult<()> {
        if self.phase == Phase::Open {
            tracing::debug!("gallery already open");
            return Err(FolioError::GalleryAlreadyOpen);
        }
        let state = GalleryState::new(options.images, options.title).inspect_err(|_| {
            tracing::warn!("gallery opened without images");
        })?;
        if matches!(self.phase, Phase::Closing(_)) {
            self.view.unmount();
        }
        self.generation.advance();
        self.lease = Some(self.host.acquire());
        self.view.mount(&state);
        tracing::debug!(title = state.title(), pages = state.len(), "gallery opened");
        self.state = Some(state);
        self.phase = Phase::Open;
        Ok(())
    }

    /// Jump to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::PageOutOfRange`] for an invalid index; the page is unchanged.
    pub fn go_to_page(&mut self, index: usize) -> FolioResult<()> {
        let Some(state) = self.open_state() else {
            return Ok(());
        };
        state.go_to(index)?;
        self.refresh();
        Ok(())
    }

    /// Next page; no-op on the last page.
    pub fn next_page(&mut self) -> bool {
        let moved = self.open_state().is_some_and(GalleryState::next);
        if moved {
            self.refresh();
        }
        moved
    }

    /// Previous page; no-op on the first page.
    pub fn prev_page(&mut self) -> bool {
        let moved = self.open_state().is_some_and(GalleryState::prev);
        if moved {
            self.refresh();
        }
        moved
    }

    /// Arrow keys page, Escape closes.
    pub fn handle_key(&mut self, key: OverlayKey) -> Option<Pending> {
        match key {
            OverlayKey::ArrowLeft => {
                self.prev_page();
                None
            }
            OverlayKey::ArrowRight => {
                self.next_page();
                None
            }
            OverlayKey::Escape => self.close(),
            OverlayKey::Enter | OverlayKey::Space => None,
        }
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

    /// Remove the container once the exit transition finished.
    pub fn finish_transition(&mut self, token: TransitionToken) {
        if self.generation.is_current(token) && self.phase == Phase::Closing(token) {
            self.view.unmount();
            self.state = None;
            self.phase = Phase::Closed;
        }
    }

    /// Whether the gallery is open (not closing).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Open)
    }

    /// State of the open gallery.
    #[must_use]
    pub const fn state(&self) -> Option<&GalleryState> {
        self.state.as_ref()
    }

    /// Rendering view.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Mutable rendering view, for wiring browser callbacks.
    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn open_state(&mut self) -> Option<&mut GalleryState> {
        if self.phase == Phase::Open {
            self.state.as_mut()
        } else {
            None
        }
    }

    fn refresh(&mut self) {
        if let Some(state) = &self.state {
            self.view.show_page(state);
        }
    }
}
