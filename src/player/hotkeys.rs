// SPDX-License-Identifier: MPL-2.0
//! Keyboard shortcuts and the on-screen hotkey feedback queue.

use crate::config::HOTKEY_TOAST_DURATION;
use std::time::{Duration, Instant};

/// Keys the player reacts to, independent of the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
    SkipBackward,
    SkipForward,
    FrameBackward,
    FrameForward,
    VolumeUp,
    VolumeDown,
    ExitFullscreen,
}

impl Hotkey {
    /// Maps a key to its shortcut. Letters are case-sensitive.
    #[must_use]
    pub fn from_key(key: KeyInput) -> Option<Self> {
        let hotkey = match key {
            KeyInput::Char('k') | KeyInput::Space => Self::TogglePlay,
            KeyInput::Char('m') => Self::ToggleMute,
            KeyInput::Char('f') => Self::ToggleFullscreen,
            KeyInput::Char('j') | KeyInput::ArrowLeft => Self::SkipBackward,
            KeyInput::Char('l') | KeyInput::ArrowRight => Self::SkipForward,
            KeyInput::Char(',') => Self::FrameBackward,
            KeyInput::Char('.') => Self::FrameForward,
            KeyInput::ArrowUp => Self::VolumeUp,
            KeyInput::ArrowDown => Self::VolumeDown,
            KeyInput::Escape => Self::ExitFullscreen,
            KeyInput::Char(_) | KeyInput::Other => return None,
        };
        Some(hotkey)
    }
}

/// Icon shown in a hotkey toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyIcon {
    Play,
    Pause,
    VolumeUp,
    VolumeDown,
    VolumeOff,
    Fullscreen,
    FullscreenExit,
    Replay5,
    Forward5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotkeyEventId(u64);

/// Feedback for one shortcut press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyEvent {
    pub id: HotkeyEventId,
    pub icon: HotkeyIcon,
    /// Message id for the host to localize.
    pub label: &'static str,
    created_at: Instant,
}

impl HotkeyEvent {
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Short-lived queue of hotkey toasts.
///
/// Ids grow monotonically for the queue's lifetime so a renderer can key
/// its animations on them.
#[derive(Debug, Clone)]
pub struct HotkeyQueue {
    events: Vec<HotkeyEvent>,
    next_id: u64,
    lifetime: Duration,
}

impl HotkeyQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::with_lifetime(HOTKEY_TOAST_DURATION)
    }

    #[must_use]
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
            lifetime,
        }
    }

    fn make(&mut self, icon: HotkeyIcon, label: &'static str, now: Instant) -> HotkeyEvent {
        let id = HotkeyEventId(self.next_id);
        self.next_id += 1;
        HotkeyEvent {
            id,
            icon,
            label,
            created_at: now,
        }
    }

    /// Shows `icon`/`label`, replacing whatever toast is on screen.
    pub fn register(&mut self, icon: HotkeyIcon, label: &'static str, now: Instant) -> HotkeyEventId {
        let event = self.make(icon, label, now);
        let id = event.id;
        self.events.clear();
        self.events.push(event);
        id
    }

    /// Shows `icon`/`label` after the toasts already on screen.
    pub fn push(&mut self, icon: HotkeyIcon, label: &'static str, now: Instant) -> HotkeyEventId {
        let event = self.make(icon, label, now);
        let id = event.id;
        self.events.push(event);
        id
    }

    /// Removes a toast whose animation finished early.
    pub fn dismiss(&mut self, id: HotkeyEventId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    /// Drops toasts older than the lifetime.
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.events
            .retain(|event| now.saturating_duration_since(event.created_at) < lifetime);
    }

    /// Earliest instant at which a toast expires.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.events
            .iter()
            .map(|event| event.created_at + self.lifetime)
            .min()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn events(&self) -> &[HotkeyEvent] {
        &self.events
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for HotkeyQueue {
    fn default() -> Self {
        Self::new()
    }
}
