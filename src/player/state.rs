// SPDX-License-Identifier: MPL-2.0
//! Per-player render state.
//!
//! [`PlayerState`] mirrors the media element for display. It is written
//! only by the player in response to element events and user gestures, so
//! it always reflects what the element last reported.

use super::time_format::format_time;
use crate::error::MediaError;

/// Playback axis of the state machine. Reveal and fullscreen are
/// orthogonal flags on [`PlayerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// `preload` hint for the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preload {
    Auto,
    Metadata,
    None,
}

impl Preload {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Metadata => "metadata",
            Self::None => "none",
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub current_time: f64,
    /// 0 until metadata loads.
    pub duration: f64,
    pub paused: bool,
    pub volume: f64,
    pub muted: bool,
    pub buffered_fraction: f64,
    /// A seek or volume gesture is active.
    pub dragging: bool,
    pub revealed: bool,
    pub fullscreen: bool,
    pub hovered: bool,
    /// The element is waiting for data.
    pub buffering: bool,
    pub last_error: Option<MediaError>,
}

impl PlayerState {
    #[must_use]
    pub fn new(volume: f64, muted: bool, revealed: bool) -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            paused: true,
            volume,
            muted,
            buffered_fraction: 0.0,
            dragging: false,
            revealed,
            fullscreen: false,
            hovered: false,
            buffering: false,
            last_error: None,
        }
    }

    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    /// Stores the element's clock. Keeps `current_time <= duration` once the
    /// duration is known; garbage reads as zero.
    pub fn sync_time(&mut self, current_time: f64, duration: f64) {
        self.duration = finite_or_zero(duration);
        let current_time = finite_or_zero(current_time);
        self.current_time = if self.duration > 0.0 {
            current_time.min(self.duration)
        } else {
            current_time
        };
    }

    #[must_use]
    pub fn effectively_muted(&self) -> bool {
        self.muted || self.volume == 0.0
    }

    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Volume shown on the slider: empty while effectively muted.
    #[must_use]
    pub fn displayed_volume(&self) -> f64 {
        if self.effectively_muted() {
            0.0
        } else {
            self.volume
        }
    }

    /// Controls stay visible while paused or hovered.
    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.paused || self.hovered
    }

    /// `aria-valuenow` of the seek slider, in percent.
    #[must_use]
    pub fn seek_value_now(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).min(100.0)
        } else {
            0.0
        }
    }

    /// `aria-valuenow` of the volume slider, in percent.
    #[must_use]
    pub fn volume_value_now(&self) -> f64 {
        self.displayed_volume() * 100.0
    }

    #[must_use]
    pub fn current_time_label(&self) -> String {
        format_time(self.current_time)
    }

    #[must_use]
    pub fn duration_label(&self) -> String {
        format_time(self.duration)
    }

    #[must_use]
    pub fn play_label(&self) -> &'static str {
        if self.paused {
            "video.play"
        } else {
            "video.pause"
        }
    }

    #[must_use]
    pub fn mute_label(&self) -> &'static str {
        if self.effectively_muted() {
            "video.unmute"
        } else {
            "video.mute"
        }
    }

    #[must_use]
    pub fn fullscreen_label(&self) -> &'static str {
        if self.fullscreen {
            "video.exit_fullscreen"
        } else {
            "video.fullscreen"
        }
    }

    /// Preload hint: eager once playback context exists, metadata on detail
    /// views, nothing for feed items.
    #[must_use]
    pub fn preload(&self, has_start_time: bool, detailed: bool) -> Preload {
        if has_start_time || self.fullscreen || self.dragging {
            Preload::Auto
        } else if detailed {
            Preload::Metadata
        } else {
            Preload::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_paused_at_zero() {
        let state = PlayerState::new(0.5, false, true);
        assert_eq!(state.playback(), PlaybackState::Paused);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
        assert!(state.controls_visible());
    }

    #[test]
    fn sync_time_caps_at_duration_and_rejects_nan() {
        let mut state = PlayerState::new(0.5, false, true);
        state.sync_time(130.0, 120.0);
        assert_eq!(state.current_time, 120.0);

        state.sync_time(f64::NAN, f64::NAN);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);

        state.sync_time(-4.0, 10.0);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn aria_values_follow_state() {
        let mut state = PlayerState::new(0.3, false, true);
        state.sync_time(30.0, 120.0);
        assert_eq!(state.seek_value_now(), 25.0);
        assert_eq!(state.volume_value_now(), 30.0);

        state.muted = true;
        assert_eq!(state.volume_value_now(), 0.0);
        assert_eq!(state.mute_label(), "video.unmute");
    }

    #[test]
    fn preload_policy() {
        let mut state = PlayerState::new(0.5, false, true);
        assert_eq!(state.preload(false, false), Preload::None);
        assert_eq!(state.preload(false, true), Preload::Metadata);
        assert_eq!(state.preload(true, false), Preload::Auto);

        state.dragging = true;
        assert_eq!(state.preload(false, true).as_str(), "auto");
    }

    #[test]
    fn labels_reflect_playback() {
        let mut state = PlayerState::new(0.5, false, true);
        assert_eq!(state.play_label(), "video.play");
        state.paused = false;
        assert_eq!(state.play_label(), "video.pause");
        assert!(!state.controls_visible());
        state.sync_time(60.0, 120.0);
        assert_eq!(state.current_time_label(), "01:00");
        assert_eq!(state.duration_label(), "02:00");
    }
}
