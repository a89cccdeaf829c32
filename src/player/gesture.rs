// SPDX-License-Identifier: MPL-2.0
//! Drag gesture sessions.
//!
//! A seek or volume drag keeps tracking the pointer after it leaves the
//! narrow track, which needs listeners on the whole document. Those
//! listeners are owned by a [`GestureSession`] created on pointer-down and
//! released when it ends, is cancelled or is dropped. [`GestureTracker`]
//! holds at most one session per player.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Document events a drag listens to.
pub const DRAG_EVENTS: [&str; 4] = ["mousemove", "mouseup", "touchmove", "touchend"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Seek,
    Volume,
}

/// Host hook for registering document-level drag listeners.
pub trait DocumentListeners {
    /// Registers move and release listeners for `kind`.
    fn attach(&mut self, kind: GestureKind);

    /// Removes the listeners registered for `kind`.
    fn detach(&mut self, kind: GestureKind);
}

/// Listener registry that only counts registrations. Hosts that route
/// pointer events to the player themselves use it as is.
#[derive(Debug, Clone, Default)]
pub struct CountingListeners {
    attached: Rc<Cell<usize>>,
}

impl CountingListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener sets currently registered.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.attached.get()
    }
}

impl DocumentListeners for CountingListeners {
    fn attach(&mut self, _kind: GestureKind) {
        self.attached.set(self.attached.get() + 1);
    }

    fn detach(&mut self, _kind: GestureKind) {
        self.attached.set(self.attached.get().saturating_sub(1));
    }
}

/// An active drag. Dropping it releases its listeners.
pub struct GestureSession {
    kind: GestureKind,
    listeners: Box<dyn DocumentListeners>,
}

impl GestureSession {
    fn open(kind: GestureKind, mut listeners: Box<dyn DocumentListeners>) -> Self {
        listeners.attach(kind);
        Self { kind, listeners }
    }

    #[must_use]
    pub fn kind(&self) -> GestureKind {
        self.kind
    }
}

impl fmt::Debug for GestureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureSession")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        self.listeners.detach(self.kind);
    }
}

/// Owner of the player's single gesture slot.
pub struct GestureTracker {
    factory: Box<dyn Fn() -> Box<dyn DocumentListeners>>,
    session: Option<GestureSession>,
}

impl fmt::Debug for GestureTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureTracker")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl GestureTracker {
    /// `listeners` is cloned into each session.
    pub fn new<L>(listeners: L) -> Self
    where
        L: DocumentListeners + Clone + 'static,
    {
        Self {
            factory: Box::new(move || Box::new(listeners.clone())),
            session: None,
        }
    }

    /// Opens a session for `kind`. Refused while another gesture is active.
    pub fn begin(&mut self, kind: GestureKind) -> bool {
        if let Some(active) = &self.session {
            tracing::debug!(active = ?active.kind(), requested = ?kind, "gesture refused");
            return false;
        }
        self.session = Some(GestureSession::open(kind, (self.factory)()));
        tracing::debug!(?kind, "gesture started");
        true
    }

    /// Closes the active session, returning what it was.
    pub fn end(&mut self) -> Option<GestureKind> {
        let kind = self.session.take().map(|session| session.kind());
        if let Some(kind) = kind {
            tracing::debug!(?kind, "gesture released");
        }
        kind
    }

    #[must_use]
    pub fn active(&self) -> Option<GestureKind> {
        self.session.as_ref().map(GestureSession::kind)
    }

    #[must_use]
    pub fn is_active(&self, kind: GestureKind) -> bool {
        self.active() == Some(kind)
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(CountingListeners::new())
    }
}
