// SPDX-License-Identifier: MPL-2.0
//! Inline media player core.
//!
//! The player is headless: it drives a [`MediaElement`] supplied by the host
//! and exposes a [`PlayerSnapshot`] for rendering. Platform services
//! (audio analysis, fullscreen, document listeners, settings storage) come
//! in through [`PlayerEnv`].

pub mod animation;
pub mod audio_graph;
mod component;
pub mod fullscreen;
pub mod geometry;
pub mod gesture;
pub mod hotkeys;
pub mod media;
pub mod props;
mod seek;
pub mod settings;
mod state;
mod time_format;
pub mod timer;
pub mod viewport;
mod volume;

pub use audio_graph::{reduce_bands, AudioContextApi, AudioContextState, AudioGraph, SoftwareAnalyser};
pub use component::{Player, PlayerEnv, PlayerSnapshot};
pub use fullscreen::{Fullscreen, FullscreenDocument, FullscreenVendor, HeadlessDocument};
pub use geometry::{pointer_position, ElementBox, PointerInput, PointerPosition};
pub use gesture::{CountingListeners, DocumentListeners, GestureKind};
pub use hotkeys::{Hotkey, HotkeyEvent, HotkeyIcon, KeyInput};
pub use media::{ElementId, HeadlessMedia, MediaElement, MediaEvent};
pub use props::{AudioColors, HandOff, MediaKind, OpenVideoOptions, PlayerCallbacks, PlayerProps};
pub use seek::{SeekController, SeekUpdate};
pub use settings::{CborFileBackend, MemoryBackend, PersistedSettings, PlayerSettings, SharedSettings};
pub use state::{PlaybackState, PlayerState, Preload};
pub use time_format::{format_time, frame_duration, parse_frame_rate};
pub use volume::{Volume, VolumeController, VolumeUpdate};
