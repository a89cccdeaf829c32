// SPDX-License-Identifier: MPL-2.0
//! Drag-to-seek on the progress track.

use super::geometry::{pointer_position, ElementBox, PointerInput};
use super::gesture::{GestureKind, GestureTracker};
use super::media::MediaAdapter;

/// Outcome of a pointer update during a seek drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekUpdate {
    /// Horizontal position on the track, `[0, 1]`.
    pub fraction: f64,
    /// Time written to the element, `None` while the duration is unknown.
    pub time: Option<f64>,
}

/// `Idle -> Dragging -> Idle` for the seek track.
///
/// Whether to resume after the drag is captured on pointer-down and not
/// re-derived from `paused`, since the drag itself pauses the element.
#[derive(Debug, Clone, Default)]
pub struct SeekController {
    track: Option<ElementBox>,
    resume_after_drag: bool,
}

impl SeekController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resume_after_drag(&self) -> bool {
        self.resume_after_drag
    }

    /// Pointer-down on the track: pauses, seeks to the pointer and opens
    /// the gesture session. Returns `None` when another gesture is active.
    pub fn begin(
        &mut self,
        gestures: &mut GestureTracker,
        media: &mut MediaAdapter,
        track: ElementBox,
        event: &PointerInput,
    ) -> Option<SeekUpdate> {
        if !gestures.begin(GestureKind::Seek) {
            return None;
        }
        self.resume_after_drag = !media.paused();
        self.track = Some(track);
        media.pause();
        Some(self.seek_to(media, event))
    }

    /// Pointer-move anywhere in the document while dragging.
    pub fn drag(
        &mut self,
        gestures: &GestureTracker,
        media: &mut MediaAdapter,
        event: &PointerInput,
    ) -> Option<SeekUpdate> {
        if !gestures.is_active(GestureKind::Seek) {
            return None;
        }
        Some(self.seek_to(media, event))
    }

    /// Pointer-up anywhere in the document. Releases the session and
    /// returns whether playback should resume.
    pub fn end(&mut self, gestures: &mut GestureTracker) -> bool {
        if !gestures.is_active(GestureKind::Seek) {
            return false;
        }
        gestures.end();
        self.track = None;
        std::mem::take(&mut self.resume_after_drag)
    }

    /// Drops the gesture without resuming, e.g. on unmount.
    pub fn cancel(&mut self, gestures: &mut GestureTracker) {
        if gestures.is_active(GestureKind::Seek) {
            gestures.end();
        }
        self.track = None;
        self.resume_after_drag = false;
    }

    fn seek_to(&mut self, media: &mut MediaAdapter, event: &PointerInput) -> SeekUpdate {
        let position = pointer_position(self.track.as_ref(), event);
        let time = media.seek_fraction(position.x);
        tracing::trace!(fraction = position.x, ?time, "seek drag");
        SeekUpdate {
            fraction: position.x,
            time,
        }
    }
}
