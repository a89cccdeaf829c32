// SPDX-License-Identifier: MPL-2.0
//! Fullscreen capability.
//!
//! Browsers expose fullscreen under four naming schemes. [`Fullscreen`]
//! probes the document once, keeps the first scheme it supports and
//! presents a single request/exit/query surface. When none is supported it
//! stays inert and the player hides its fullscreen button.

use super::media::ElementId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenVendor {
    Standard,
    Webkit,
    Moz,
    Ms,
}

impl FullscreenVendor {
    /// Probe order.
    pub const ALL: [Self; 4] = [Self::Standard, Self::Webkit, Self::Moz, Self::Ms];

    #[must_use]
    pub fn request_method(self) -> &'static str {
        match self {
            Self::Standard => "requestFullscreen",
            Self::Webkit => "webkitRequestFullscreen",
            Self::Moz => "mozRequestFullScreen",
            Self::Ms => "msRequestFullscreen",
        }
    }

    #[must_use]
    pub fn exit_method(self) -> &'static str {
        match self {
            Self::Standard => "exitFullscreen",
            Self::Webkit => "webkitExitFullscreen",
            Self::Moz => "mozCancelFullScreen",
            Self::Ms => "msExitFullscreen",
        }
    }

    #[must_use]
    pub fn element_property(self) -> &'static str {
        match self {
            Self::Standard => "fullscreenElement",
            Self::Webkit => "webkitFullscreenElement",
            Self::Moz => "mozFullScreenElement",
            Self::Ms => "msFullscreenElement",
        }
    }

    #[must_use]
    pub fn change_event(self) -> &'static str {
        match self {
            Self::Standard => "fullscreenchange",
            Self::Webkit => "webkitfullscreenchange",
            Self::Moz => "mozfullscreenchange",
            Self::Ms => "MSFullscreenChange",
        }
    }
}

/// The document's fullscreen API, addressed per naming scheme.
pub trait FullscreenDocument {
    fn supports(&self, vendor: FullscreenVendor) -> bool;

    fn request(&mut self, vendor: FullscreenVendor, element: ElementId);

    fn exit(&mut self, vendor: FullscreenVendor);

    fn fullscreen_element(&self, vendor: FullscreenVendor) -> Option<ElementId>;

    /// Starts delivering `event` to the player.
    fn subscribe(&mut self, event: &'static str);

    fn unsubscribe(&mut self, event: &'static str);
}

pub struct Fullscreen {
    backend: Option<(FullscreenVendor, Box<dyn FullscreenDocument>)>,
    subscribed: bool,
}

impl fmt::Debug for Fullscreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fullscreen")
            .field("vendor", &self.vendor())
            .field("subscribed", &self.subscribed)
            .finish()
    }
}

impl Fullscreen {
    /// Picks the first naming scheme `document` supports.
    #[must_use]
    pub fn detect(document: Box<dyn FullscreenDocument>) -> Self {
        let vendor = FullscreenVendor::ALL
            .into_iter()
            .find(|&vendor| document.supports(vendor));
        match vendor {
            Some(vendor) => {
                tracing::debug!(?vendor, "fullscreen api detected");
                Self {
                    backend: Some((vendor, document)),
                    subscribed: false,
                }
            }
            None => {
                tracing::debug!("fullscreen api unavailable");
                Self::unsupported()
            }
        }
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            backend: None,
            subscribed: false,
        }
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub fn vendor(&self) -> Option<FullscreenVendor> {
        self.backend.as_ref().map(|(vendor, _)| *vendor)
    }

    pub fn request(&mut self, element: ElementId) {
        if let Some((vendor, document)) = self.backend.as_mut() {
            document.request(*vendor, element);
        }
    }

    pub fn exit(&mut self) {
        if let Some((vendor, document)) = self.backend.as_mut() {
            document.exit(*vendor);
        }
    }

    /// Whether any element of the document is fullscreen.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|(vendor, document)| document.fullscreen_element(*vendor).is_some())
    }

    #[must_use]
    pub fn is_fullscreen_element(&self, element: ElementId) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|(vendor, document)| document.fullscreen_element(*vendor) == Some(element))
    }

    /// The normalized change event name for the detected scheme.
    #[must_use]
    pub fn change_event(&self) -> Option<&'static str> {
        self.vendor().map(FullscreenVendor::change_event)
    }

    pub fn subscribe(&mut self) {
        if self.subscribed {
            return;
        }
        if let Some((vendor, document)) = self.backend.as_mut() {
            document.subscribe(vendor.change_event());
            self.subscribed = true;
        }
    }

    pub fn unsubscribe(&mut self) {
        if !self.subscribed {
            return;
        }
        if let Some((vendor, document)) = self.backend.as_mut() {
            document.unsubscribe(vendor.change_event());
        }
        self.subscribed = false;
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    element: Option<ElementId>,
    listeners: Vec<&'static str>,
    changes: usize,
}

/// In-memory document with one fullscreen slot shared by all clones.
///
/// Requesting fullscreen for a second element replaces the first, as
/// browsers do. Each change increments a counter the host can use to
/// dispatch change notifications.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    vendor: FullscreenVendor,
    state: Rc<RefCell<DocumentState>>,
}

impl HeadlessDocument {
    #[must_use]
    pub fn new(vendor: FullscreenVendor) -> Self {
        Self {
            vendor,
            state: Rc::new(RefCell::new(DocumentState::default())),
        }
    }

    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        self.state.borrow().element
    }

    #[must_use]
    pub fn changes(&self) -> usize {
        self.state.borrow().changes
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl FullscreenDocument for HeadlessDocument {
    fn supports(&self, vendor: FullscreenVendor) -> bool {
        vendor == self.vendor
    }

    fn request(&mut self, _vendor: FullscreenVendor, element: ElementId) {
        let mut state = self.state.borrow_mut();
        if state.element != Some(element) {
            state.element = Some(element);
            state.changes += 1;
        }
    }

    fn exit(&mut self, _vendor: FullscreenVendor) {
        let mut state = self.state.borrow_mut();
        if state.element.take().is_some() {
            state.changes += 1;
        }
    }

    fn fullscreen_element(&self, _vendor: FullscreenVendor) -> Option<ElementId> {
        self.state.borrow().element
    }

    fn subscribe(&mut self, event: &'static str) {
        self.state.borrow_mut().listeners.push(event);
    }

    fn unsubscribe(&mut self, event: &'static str) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.listeners.iter().position(|&e| e == event) {
            state.listeners.remove(index);
        }
    }
}
