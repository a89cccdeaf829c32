// SPDX-License-Identifier: MPL-2.0
//! Pointer geometry for the custom sliders.
//!
//! Converts a pointer event and the layout of a track element into a
//! normalized `[0, 1] x [0, 1]` position. Pure and deterministic.

use iced::{Point, Rectangle, Vector};

/// Layout of an element as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    /// Bounding client rectangle, in viewport coordinates.
    pub client_rect: Rectangle,
    /// Page scroll offset at the time of measurement.
    pub scroll: Vector,
    /// Border offset of the document root (`clientLeft`/`clientTop`).
    pub client_offset: Vector,
}

impl ElementBox {
    /// An element measured on an unscrolled page.
    #[must_use]
    pub fn new(client_rect: Rectangle) -> Self {
        Self {
            client_rect,
            scroll: Vector::new(0.0, 0.0),
            client_offset: Vector::new(0.0, 0.0),
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll: Vector) -> Self {
        self.scroll = scroll;
        self
    }

    /// Top-left corner of the element in page coordinates.
    #[must_use]
    pub fn page_origin(&self) -> Point {
        Point::new(
            self.client_rect.x + self.scroll.x - self.client_offset.x,
            self.client_rect.y + self.scroll.y - self.client_offset.y,
        )
    }
}

/// A mouse event, or a touch event converted to the same shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerInput {
    /// Page coordinates of the pointer.
    pub page: Point,
    /// Page coordinates of the touches that changed in this event.
    pub changed_touches: Vec<Point>,
}

impl PointerInput {
    #[must_use]
    pub fn mouse(page: Point) -> Self {
        Self {
            page,
            changed_touches: Vec::new(),
        }
    }

    #[must_use]
    pub fn touch(changed_touches: Vec<Point>) -> Self {
        Self {
            page: changed_touches.first().copied().unwrap_or(Point::ORIGIN),
            changed_touches,
        }
    }

    /// The point the geometry is computed from: the first changed touch
    /// when there is one, the mouse position otherwise.
    #[must_use]
    pub fn effective_point(&self) -> Point {
        self.changed_touches.first().copied().unwrap_or(self.page)
    }
}

/// Normalized pointer position within an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

fn fraction(offset: f64, extent: f64) -> f64 {
    if extent.is_nan() || extent <= 0.0 {
        return 0.0;
    }
    let value = offset / extent;
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Returns where `event` falls inside `element`, clamped at the edges.
///
/// A missing element yields the origin, same as a zero-sized one.
#[must_use]
pub fn pointer_position(element: Option<&ElementBox>, event: &PointerInput) -> PointerPosition {
    let Some(element) = element else {
        return PointerPosition::default();
    };

    let origin = element.page_origin();
    let point = event.effective_point();

    PointerPosition {
        x: fraction(
            f64::from(point.x) - f64::from(origin.x),
            f64::from(element.client_rect.width),
        ),
        y: fraction(
            f64::from(point.y) - f64::from(origin.y),
            f64::from(element.client_rect.height),
        ),
    }
}
