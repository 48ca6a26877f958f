//! Shared backdrop accounting and transition sequencing for overlays.
//!
//! # Design
//! - One backdrop serves every overlay; [`OverlayHost`] counts open overlays and
//!   only conceals the backdrop when the last one closes.
//! - Overlays hold an [`OverlayLease`] while visible; dropping it releases the backdrop.
//! - Animated teardown is driven by [`Pending`] values carrying a [`TransitionToken`].
//!   Each component bumps its [`Generation`] on open/close so completions that
//!   belong to an earlier cycle are recognised and ignored.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Capability set for the backdrop element.
pub trait BackdropSurface {
    /// Make the backdrop visible, creating it on first use.
    fn reveal(&self);
    /// Hide the backdrop.
    fn conceal(&self);
    /// Suppress (`true`) or restore (`false`) page scrolling.
    fn lock_scroll(&self, locked: bool);
}

/// Reference-counted owner of the shared backdrop.
pub struct OverlayHost {
    surface: Box<dyn BackdropSurface>,
    open: Cell<usize>,
}

impl fmt::Debug for OverlayHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHost")
            .field("open", &self.open.get())
            .finish_non_exhaustive()
    }
}

impl OverlayHost {
    /// Build a host around a backdrop surface.
    #[must_use]
    pub fn new(surface: Box<dyn BackdropSurface>) -> Rc<Self> {
        Rc::new(Self {
            surface,
            open: Cell::new(0),
        })
    }

    /// Register one more visible overlay.
    pub fn show(&self) {
        let open = self.open.get();
        self.open.set(open + 1);
        if open == 0 {
            tracing::trace!("backdrop revealed");
            self.surface.reveal();
            self.surface.lock_scroll(true);
        }
    }

    /// Unregister a visible overlay; hides the backdrop when none remain.
    pub fn hide(&self) {
        match self.open.get() {
            0 => tracing::debug!("backdrop hide without matching show"),
            1 => {
                self.open.set(0);
                tracing::trace!("backdrop concealed");
                self.surface.conceal();
                self.surface.lock_scroll(false);
            }
            open => self.open.set(open - 1),
        }
    }

    /// Show the backdrop for the lifetime of the returned lease.
    #[must_use]
    pub fn acquire(self: &Rc<Self>) -> OverlayLease {
        self.show();
        OverlayLease {
            host: Rc::clone(self),
        }
    }

    /// Number of overlays currently holding the backdrop.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open.get()
    }

    /// Whether the backdrop is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.open.get() > 0
    }
}

/// Keeps the backdrop visible until dropped.
#[derive(Debug)]
pub struct OverlayLease {
    host: Rc<OverlayHost>,
}

impl Drop for OverlayLease {
    fn drop(&mut self) {
        self.host.hide();
    }
}

/// Leases taken on behalf of page scripts.
///
/// Releases only what the scripts themselves acquired, so an unbalanced release
/// cannot hide the backdrop under a widget that still holds it.
#[derive(Debug)]
pub struct ScriptLeases {
    host: Rc<OverlayHost>,
    held: RefCell<Vec<OverlayLease>>,
}

impl ScriptLeases {
    /// Track leases against `host`.
    #[must_use]
    pub const fn new(host: Rc<OverlayHost>) -> Self {
        Self {
            host,
            held: RefCell::new(Vec::new()),
        }
    }

    /// Take one more lease.
    pub fn acquire(&self) {
        let lease = self.host.acquire();
        self.held.borrow_mut().push(lease);
    }

    /// Drop one script lease; a release without a matching acquire is ignored.
    pub fn release(&self) {
        let lease = self.held.borrow_mut().pop();
        if lease.is_none() {
            tracing::debug!("script backdrop release without matching show");
        }
    }

    /// Number of leases held for scripts.
    #[must_use]
    pub fn held(&self) -> usize {
        self.held.borrow().len()
    }
}

/// Identifies one pending transition of one component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// Raw counter value, for diagnostics.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic token source for a single component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Invalidate every outstanding token and mint a new one.
    pub const fn advance(&mut self) -> TransitionToken {
        self.current += 1;
        TransitionToken(self.current)
    }

    /// Whether `token` is the most recently minted one.
    #[must_use]
    pub const fn is_current(&self, token: TransitionToken) -> bool {
        token.0 == self.current
    }
}

/// Wait the driver must complete before calling back into a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
    /// Wait for the overlay's exit transition to finish.
    Transition(TransitionToken),
    /// Wait for the configured pause between queued popups.
    Pause(TransitionToken),
}

impl Pending {
    /// Token to hand back once the wait completes.
    #[must_use]
    pub const fn token(self) -> TransitionToken {
        match self {
            Self::Transition(token) | Self::Pause(token) => token,
        }
    }
}
