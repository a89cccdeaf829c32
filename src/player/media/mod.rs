// SPDX-License-Identifier: MPL-2.0
//! Media element seam.
//!
//! [`MediaElement`] is the narrow command surface of a live audio/video
//! element. The player never touches it directly: every write goes through
//! [`MediaAdapter`], which refuses writes that would put the element in an
//! invalid state (`NaN` times, seeks before metadata, out-of-range volume).

mod headless;

pub use headless::HeadlessMedia;

use crate::error::MediaError;
use iced::Rectangle;

/// Identity of a concrete element. Reattaching the same id is a no-op for
/// resources bound to the element (audio graph source nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Imperative interface to a media element.
///
/// Setters mirror the element's properties. The element reports the
/// consequences of those writes asynchronously through [`MediaEvent`]s the
/// host forwards to the player.
pub trait MediaElement {
    fn id(&self) -> ElementId;

    /// Source URL currently loaded.
    fn src(&self) -> &str;

    /// Requests playback. Browsers may reject it (autoplay policy).
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, secs: f64);

    /// `NaN` until metadata has loaded.
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    fn muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// End of the last buffered time range, if any.
    fn buffered_end(&self) -> Option<f64>;

    /// Bounding client rectangle, used for viewport intersection.
    fn client_rect(&self) -> Rectangle;
}

/// Native events fired by a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate,
    Progress,
    LoadedData,
    CanPlayThrough,
    VolumeChange,
    Waiting,
    Error(MediaError),
}

/// Guarded access to the live element.
pub struct MediaAdapter {
    element: Box<dyn MediaElement>,
}

/// Returns the duration when it is usable as a seek bound.
fn known_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

impl MediaAdapter {
    #[must_use]
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self { element }
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.element.id()
    }

    #[must_use]
    pub fn src(&self) -> &str {
        self.element.src()
    }

    pub fn play(&mut self) -> Result<(), MediaError> {
        self.element.play()
    }

    pub fn pause(&mut self) {
        self.element.pause();
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.element.paused()
    }

    /// Current time, or 0 when the element reports garbage.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        let time = self.element.current_time();
        if time.is_finite() && time >= 0.0 {
            time
        } else {
            0.0
        }
    }

    /// Duration, or 0 while unknown.
    #[must_use]
    pub fn duration(&self) -> f64 {
        known_duration(self.element.duration()).unwrap_or(0.0)
    }

    #[must_use]
    pub fn has_duration(&self) -> bool {
        known_duration(self.element.duration()).is_some()
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        let volume = self.element.volume();
        if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn muted(&self) -> bool {
        self.element.muted()
    }

    /// Moves the playhead to `secs`, clamped to `[0, duration]`.
    ///
    /// Returns the time written, or `None` when the write was skipped
    /// because the duration is unknown or `secs` is not a number.
    pub fn seek(&mut self, secs: f64) -> Option<f64> {
        let duration = known_duration(self.element.duration())?;
        if secs.is_nan() {
            return None;
        }
        let target = secs.clamp(0.0, duration);
        self.element.set_current_time(target);
        Some(target)
    }

    /// Seeks to `fraction` of the duration.
    pub fn seek_fraction(&mut self, fraction: f64) -> Option<f64> {
        let duration = known_duration(self.element.duration())?;
        self.seek(duration * fraction)
    }

    /// Seeks relative to the current time.
    pub fn seek_by(&mut self, delta_secs: f64) -> Option<f64> {
        self.seek(self.current_time() + delta_secs)
    }

    /// Writes a volume clamped to `[0, 1]`; `NaN` is skipped.
    pub fn set_volume(&mut self, volume: f64) -> Option<f64> {
        if volume.is_nan() {
            return None;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.element.set_volume(volume);
        Some(volume)
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    /// Buffered fraction in `[0, 1]`, 0 while nothing is buffered.
    #[must_use]
    pub fn buffered_fraction(&self) -> f64 {
        match (self.element.buffered_end(), known_duration(self.element.duration())) {
            (Some(end), Some(duration)) if end.is_finite() => (end / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Fraction of the duration already played, 0 while unknown.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        match known_duration(self.element.duration()) {
            Some(duration) => (self.current_time() / duration).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    #[must_use]
    pub fn client_rect(&self) -> Rectangle {
        self.element.client_rect()
    }
}
