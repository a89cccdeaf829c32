// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the player. Constants are organized by category.
//!
//! # Categories
//!
//! - **Volume**: Playback volume bounds, keyboard step and unmute floor
//! - **Timing**: Click disambiguation, control fade and scroll throttling
//! - **Seeking**: Keyboard skip distance and frame-rate fallback
//! - **Visualizer**: Analyser parameters and default band count
//! - **Animation**: Spring preset driving the progress/volume bars

use std::time::Duration;

// ==========================================================================
// Volume Defaults
// ==========================================================================

/// Volume used when nothing has been persisted yet (0.0 to 1.0).
pub const DEFAULT_VOLUME: f64 = 0.5;

/// Minimum volume level.
pub const MIN_VOLUME: f64 = 0.0;

/// Maximum volume level.
pub const MAX_VOLUME: f64 = 1.0;

/// Volume adjustment per ArrowUp/ArrowDown key press.
pub const VOLUME_STEP: f64 = 0.15;

/// Volume restored when unmuting a player whose volume is exactly zero.
pub const UNMUTE_VOLUME_FLOOR: f64 = 0.05;

// ==========================================================================
// Timing Defaults
// ==========================================================================

/// Window in which a second click turns a pending play/pause into fullscreen.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(250);

/// Inactivity delay after which the control bar fades out.
pub const HOVER_FADE_DELAY: Duration = Duration::from_millis(4000);

/// Minimum spacing between two viewport visibility checks.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(150);

/// Lifetime of an on-screen hotkey indicator.
pub const HOTKEY_TOAST_DURATION: Duration = Duration::from_millis(800);

// ==========================================================================
// Seeking Defaults
// ==========================================================================

/// Distance skipped by `j`/`l` and the arrow keys, in seconds.
pub const KEYBOARD_SKIP_SECS: f64 = 5.0;

/// Frame rate assumed when the declared one cannot be parsed.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

// ==========================================================================
// Visualizer Defaults
// ==========================================================================

/// Number of frequency bands sampled for the audio visualizer.
pub const DEFAULT_VISUALIZER_BANDS: usize = 3;

/// Maximum number of bands a configuration may request.
pub const MAX_VISUALIZER_BANDS: usize = 64;

/// FFT window size of the analyser (frequency bin count is half of it).
pub const ANALYSER_FFT_SIZE: usize = 2048;

/// Temporal smoothing applied between consecutive analyser frames.
pub const ANALYSER_SMOOTHING: f32 = 0.8;

/// Magnitude (dB) mapped to byte value 0.
pub const ANALYSER_MIN_DECIBELS: f32 = -100.0;

/// Magnitude (dB) mapped to byte value 255.
pub const ANALYSER_MAX_DECIBELS: f32 = -30.0;

// ==========================================================================
// Animation Defaults
// ==========================================================================

/// Spring tension of the "stiff" preset.
pub const SPRING_TENSION: f64 = 210.0;

/// Spring friction of the "stiff" preset.
pub const SPRING_FRICTION: f64 = 20.0;

/// Distance below which a spring is considered settled.
pub const SPRING_PRECISION: f64 = 0.0005;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Number of user actions kept in a player's action log.
pub const ACTION_LOG_CAPACITY: usize = 200;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Volume validation
    assert!(MIN_VOLUME >= 0.0);
    assert!(MAX_VOLUME > MIN_VOLUME);
    assert!(DEFAULT_VOLUME >= MIN_VOLUME);
    assert!(DEFAULT_VOLUME <= MAX_VOLUME);
    assert!(VOLUME_STEP > 0.0);
    assert!(UNMUTE_VOLUME_FLOOR > MIN_VOLUME);
    assert!(UNMUTE_VOLUME_FLOOR < MAX_VOLUME);

    // Visualizer validation
    assert!(DEFAULT_VISUALIZER_BANDS > 0);
    assert!(DEFAULT_VISUALIZER_BANDS <= MAX_VISUALIZER_BANDS);
    assert!(ANALYSER_FFT_SIZE.is_power_of_two());
    assert!(ANALYSER_SMOOTHING >= 0.0);
    assert!(ANALYSER_SMOOTHING < 1.0);
    assert!(ANALYSER_MAX_DECIBELS > ANALYSER_MIN_DECIBELS);

    // Spring validation
    assert!(SPRING_TENSION > 0.0);
    assert!(SPRING_FRICTION > 0.0);

    assert!(ACTION_LOG_CAPACITY > 0);
};
