// SPDX-License-Identifier: MPL-2.0
//! Scroll-driven viewport intersection checks.

use super::timer::Throttle;
use crate::config::SCROLL_THROTTLE;
use iced::Rectangle;
use std::time::Instant;

/// Whether any part of `rect` (client coordinates) lies within a viewport
/// of `viewport_height`. Touching an edge counts as visible.
#[must_use]
pub fn in_view(rect: Rectangle, viewport_height: f32) -> bool {
    rect.y <= viewport_height && rect.y + rect.height >= 0.0
}

/// Throttles scroll notifications into intersection checks.
///
/// [`on_scroll`](Self::on_scroll) and [`poll`](Self::poll) return the
/// viewport height to check against whenever a check is due.
#[derive(Debug, Clone)]
pub struct ViewportWatcher {
    throttle: Throttle,
    viewport_height: f32,
}

impl ViewportWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            throttle: Throttle::new(SCROLL_THROTTLE),
            viewport_height: 0.0,
        }
    }

    /// Records a scroll or resize. Returns the height to check now, if the
    /// throttle allows it.
    pub fn on_scroll(&mut self, now: Instant, viewport_height: f32) -> Option<f32> {
        self.viewport_height = viewport_height;
        self.throttle.call(now).then_some(self.viewport_height)
    }

    /// Returns the height for a trailing check that has come due.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        self.throttle.poll(now).then_some(self.viewport_height)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.throttle.is_pending()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    pub fn cancel(&mut self) {
        self.throttle.cancel();
    }
}

impl Default for ViewportWatcher {
    fn default() -> Self {
        Self::new()
    }
}
