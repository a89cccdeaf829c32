// SPDX-License-Identifier: MPL-2.0
//! Volume level type and the volume track controller.

use super::geometry::{pointer_position, ElementBox, PointerInput};
use super::gesture::{GestureKind, GestureTracker};
use super::media::MediaAdapter;
use crate::config::{DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME, UNMUTE_VOLUME_FLOOR, VOLUME_STEP};

/// Volume level, guaranteed to be within `0.0..=1.0`.
///
/// # Example
///
/// ```
/// use inline_player::player::Volume;
///
/// assert_eq!(Volume::new(0.5).value(), 0.5);
/// assert_eq!(Volume::new(2.0).value(), 1.0);
/// assert_eq!(Volume::new(f64::NAN).value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Volume(f64);

impl Volume {
    /// Clamps to the valid range. `NaN` becomes silence.
    #[must_use]
    pub fn new(volume: f64) -> Self {
        if volume.is_nan() {
            return Self(MIN_VOLUME);
        }
        Self(volume.clamp(MIN_VOLUME, MAX_VOLUME))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 <= MIN_VOLUME
    }

    /// One keyboard step louder, clamped.
    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(self.0 + VOLUME_STEP)
    }

    /// One keyboard step quieter, clamped.
    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(self.0 - VOLUME_STEP)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

/// Volume and mute state after a write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeUpdate {
    pub volume: f64,
    pub muted: bool,
}

impl VolumeUpdate {
    /// Muted or silent. The slider shows an empty bar in both cases.
    #[must_use]
    pub fn effectively_muted(&self) -> bool {
        self.muted || self.volume == 0.0
    }
}

fn current(media: &MediaAdapter) -> VolumeUpdate {
    VolumeUpdate {
        volume: media.volume(),
        muted: media.muted(),
    }
}

/// Writes `volume` and derives the mute state from it.
fn apply(media: &mut MediaAdapter, volume: Volume) -> VolumeUpdate {
    let volume = volume.value();
    media.set_volume(volume);
    media.set_muted(volume == 0.0);
    VolumeUpdate {
        volume,
        muted: volume == 0.0,
    }
}

/// Drag, mute toggle and keyboard steps for the volume track.
///
/// The drag has the same lifecycle as a seek drag, including the pause
/// while the pointer is down.
#[derive(Debug, Clone, Default)]
pub struct VolumeController {
    track: Option<ElementBox>,
    resume_after_drag: bool,
}

impl VolumeController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(
        &mut self,
        gestures: &mut GestureTracker,
        media: &mut MediaAdapter,
        track: ElementBox,
        event: &PointerInput,
    ) -> Option<VolumeUpdate> {
        if !gestures.begin(GestureKind::Volume) {
            return None;
        }
        self.resume_after_drag = !media.paused();
        self.track = Some(track);
        media.pause();
        Some(self.set_from_pointer(media, event))
    }

    pub fn drag(
        &mut self,
        gestures: &GestureTracker,
        media: &mut MediaAdapter,
        event: &PointerInput,
    ) -> Option<VolumeUpdate> {
        if !gestures.is_active(GestureKind::Volume) {
            return None;
        }
        Some(self.set_from_pointer(media, event))
    }

    /// Releases the session and returns whether playback should resume.
    pub fn end(&mut self, gestures: &mut GestureTracker) -> bool {
        if !gestures.is_active(GestureKind::Volume) {
            return false;
        }
        gestures.end();
        self.track = None;
        std::mem::take(&mut self.resume_after_drag)
    }

    pub fn cancel(&mut self, gestures: &mut GestureTracker) {
        if gestures.is_active(GestureKind::Volume) {
            gestures.end();
        }
        self.track = None;
        self.resume_after_drag = false;
    }

    /// Mute button. Unmuting a silent element restores the small floor
    /// volume so the bar is never "unmuted but empty".
    pub fn toggle_mute(media: &mut MediaAdapter) -> VolumeUpdate {
        let before = current(media);
        if before.effectively_muted() {
            media.set_muted(false);
            if before.volume == 0.0 {
                media.set_volume(UNMUTE_VOLUME_FLOOR);
            }
        } else {
            media.set_muted(true);
        }
        current(media)
    }

    /// One keyboard step up or down. Any nonzero result unmutes.
    pub fn step(media: &mut MediaAdapter, louder: bool) -> VolumeUpdate {
        let volume = Volume::new(media.volume());
        let next = if louder {
            volume.increase()
        } else {
            volume.decrease()
        };
        apply(media, next)
    }

    fn set_from_pointer(&mut self, media: &mut MediaAdapter, event: &PointerInput) -> VolumeUpdate {
        let position = pointer_position(self.track.as_ref(), event);
        let update = apply(media, Volume::new(position.x));
        tracing::trace!(volume = update.volume, "volume drag");
        update
    }
}
