// SPDX-License-Identifier: MPL-2.0
//! The inline player.
//!
//! [`Player`] owns one media element for the lifetime of a mount and keeps
//! [`PlayerState`] in step with it. The host forwards three kinds of input:
//!
//! - native element events through [`Player::handle_media_event`],
//! - user input (clicks, pointer drags, keys, scroll, hover),
//! - time, through [`Player::tick`] for timers and
//!   [`Player::on_animation_frame`] for the two animation loops.
//!
//! Every write to the element goes through [`MediaAdapter`], every document
//! listener through the gesture tracker, and every deferred action through a
//! timer owned here, so [`Player::unmount`] can release all of them.

use super::animation::{BarAnimations, FrameLoop};
use super::audio_graph::{AudioGraph, GraphHandle};
use super::fullscreen::Fullscreen;
use super::geometry::{ElementBox, PointerInput};
use super::gesture::{DocumentListeners, GestureKind, GestureTracker};
use super::hotkeys::{Hotkey, HotkeyEvent, HotkeyIcon, HotkeyQueue, KeyInput};
use super::media::{ElementId, MediaAdapter, MediaElement, MediaEvent};
use super::props::{HandOff, MediaKind, OpenVideoOptions, PlayerCallbacks, PlayerProps};
use super::seek::{SeekController, SeekUpdate};
use super::settings::SharedSettings;
use super::state::{PlayerState, Preload};
use super::time_format::frame_duration;
use super::timer::Timer;
use super::viewport::{in_view, ViewportWatcher};
use super::volume::{VolumeController, VolumeUpdate};
use crate::config::{DOUBLE_CLICK_THRESHOLD, HOVER_FADE_DELAY, KEYBOARD_SKIP_SECS};
use crate::diagnostics::{ActionLog, UserAction};
use iced::{Point, Rectangle, Size};
use std::time::Instant;

/// Platform capabilities handed to a player at mount.
pub struct PlayerEnv {
    pub settings: SharedSettings,
    pub audio: AudioGraph,
    pub fullscreen: Fullscreen,
    pub gestures: GestureTracker,
}

impl PlayerEnv {
    /// No audio graph, no fullscreen, counting-only document listeners.
    #[must_use]
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            settings,
            audio: AudioGraph::unavailable(),
            fullscreen: Fullscreen::unsupported(),
            gestures: GestureTracker::default(),
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio: AudioGraph) -> Self {
        self.audio = audio;
        self
    }

    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: Fullscreen) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    #[must_use]
    pub fn with_listeners<L>(mut self, listeners: L) -> Self
    where
        L: DocumentListeners + Clone + 'static,
    {
        self.gestures = GestureTracker::new(listeners);
        self
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub kind: MediaKind,
    pub state: PlayerState,
    /// Animated widths, as fractions of their track.
    pub progress_width: f64,
    pub buffer_width: f64,
    pub volume_width: f64,
    pub current_time_label: String,
    pub duration_label: String,
    pub seek_value_now: f64,
    pub volume_value_now: f64,
    pub play_label: &'static str,
    pub mute_label: &'static str,
    pub fullscreen_label: &'static str,
    pub preload: Preload,
    pub controls_visible: bool,
    pub show_spoiler: bool,
    pub show_hide_button: bool,
    pub show_blurhash: bool,
    pub fullscreen_supported: bool,
    pub hotkeys: Vec<HotkeyEvent>,
    /// Visualizer band energies, audio only.
    pub bands: Vec<f32>,
    pub poster: Option<String>,
    pub alt: Option<String>,
}

pub struct Player {
    props: PlayerProps,
    callbacks: PlayerCallbacks,
    settings: SharedSettings,
    media: Option<MediaAdapter>,
    audio: AudioGraph,
    graph: Option<GraphHandle>,
    fullscreen: Fullscreen,
    gestures: GestureTracker,
    seek: SeekController,
    volume: VolumeController,
    state: PlayerState,
    bars: BarAnimations,
    progress_loop: FrameLoop,
    spring_loop: FrameLoop,
    click_timer: Timer,
    hover_timer: Timer,
    viewport: ViewportWatcher,
    hotkeys: HotkeyQueue,
    actions: ActionLog,
    bands: Vec<f32>,
    mounted: bool,
    start_applied: bool,
    autoplayed: bool,
    /// The active drag was started by a slider widget.
    slider_drag: bool,
}

/// Track that slider fractions are positioned on.
fn unit_track() -> ElementBox {
    ElementBox::new(Rectangle::new(Point::ORIGIN, Size::new(1.0, 1.0)))
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("src", &self.props.src)
            .field("kind", &self.props.kind)
            .field("state", &self.state)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Mounts a player on `element`, restoring the persisted volume.
    pub fn mount(
        props: PlayerProps,
        element: Box<dyn MediaElement>,
        env: PlayerEnv,
        callbacks: PlayerCallbacks,
        now: Instant,
    ) -> Self {
        let (volume, muted) = {
            let settings = env.settings.borrow();
            (settings.volume(), settings.muted())
        };

        let mut media = MediaAdapter::new(element);
        media.set_volume(volume);
        media.set_muted(muted);

        let mut audio = env.audio;
        let graph = match props.kind {
            MediaKind::Audio => audio.attach(media.id()),
            MediaKind::Video => None,
        };
        audio.sync_gain(volume, muted);

        let mut fullscreen = env.fullscreen;
        fullscreen.subscribe();

        let mut state = PlayerState::new(volume, muted, props.initially_revealed());
        state.sync_time(media.current_time(), media.duration());
        state.paused = media.paused();
        let bars = BarAnimations::new(
            state.progress_fraction(),
            media.buffered_fraction(),
            state.displayed_volume(),
        );
        let bands = vec![0.0; props.visualizer_bands];

        tracing::debug!(src = %props.src, kind = props.kind.as_str(), "player mounted");

        let mut player = Self {
            props,
            callbacks,
            settings: env.settings,
            media: Some(media),
            audio,
            graph,
            fullscreen,
            gestures: env.gestures,
            seek: SeekController::new(),
            volume: VolumeController::new(),
            state,
            bars,
            progress_loop: FrameLoop::default(),
            spring_loop: FrameLoop::default(),
            click_timer: Timer::new(DOUBLE_CLICK_THRESHOLD),
            hover_timer: Timer::new(HOVER_FADE_DELAY),
            viewport: ViewportWatcher::new(),
            hotkeys: HotkeyQueue::new(),
            actions: ActionLog::new(now),
            bands,
            mounted: true,
            start_applied: false,
            autoplayed: false,
            slider_drag: false,
        };
        if player.state.revealed {
            player.start_loops();
        }
        player
    }

    /// Tears the player down. A playing element is handed to
    /// picture-in-picture first; afterwards no timer, frame or listener of
    /// this player remains. Calling it twice is a no-op.
    pub fn unmount(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.cancel_gestures();
        if self.is_playing() {
            self.hand_off(now);
        }
        self.exit_own_fullscreen();
        self.mounted = false;
        self.stop_loops();
        self.click_timer.cancel();
        self.hover_timer.cancel();
        self.viewport.cancel();
        self.hotkeys.clear();
        self.fullscreen.unsubscribe();
        if let Some(handle) = self.graph.take() {
            self.audio.detach(handle);
        }
        self.media = None;
        tracing::debug!(src = %self.props.src, "player unmounted");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub fn props(&self) -> &PlayerProps {
        &self.props
    }

    #[must_use]
    pub fn actions(&self) -> &ActionLog {
        &self.actions
    }

    #[must_use]
    pub fn bars(&self) -> &BarAnimations {
        &self.bars
    }

    #[must_use]
    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.gestures.active()
    }

    fn media_id(&self) -> Option<ElementId> {
        self.media.as_ref().map(MediaAdapter::id)
    }

    fn is_playing(&self) -> bool {
        self.media.as_ref().is_some_and(|media| !media.paused())
    }

    // ======================================================================
    // Element lifecycle
    // ======================================================================

    /// Swaps the element reference. `None` means the element went away: a
    /// playing element is handed off like on unmount. A new element is
    /// rebound to the audio graph and gets the current volume.
    pub fn replace_element(&mut self, element: Option<Box<dyn MediaElement>>, now: Instant) {
        if !self.mounted {
            return;
        }
        match element {
            None => {
                self.cancel_gestures();
                if self.is_playing() {
                    self.hand_off(now);
                }
                self.exit_own_fullscreen();
                if let Some(handle) = self.graph.take() {
                    self.audio.detach(handle);
                }
                self.media = None;
                self.state.paused = true;
            }
            Some(element) => {
                if self.media_id() == Some(element.id()) {
                    return;
                }
                self.cancel_gestures();
                let mut media = MediaAdapter::new(element);
                media.set_volume(self.state.volume);
                media.set_muted(self.state.muted);
                if self.props.kind == MediaKind::Audio {
                    self.graph = self.audio.attach(media.id());
                }
                self.state.sync_time(media.current_time(), media.duration());
                self.state.paused = media.paused();
                self.state.buffered_fraction = media.buffered_fraction();
                self.media = Some(media);
                self.start_applied = false;
                self.autoplayed = false;
            }
        }
    }

    /// Applies a native element event.
    pub fn handle_media_event(&mut self, event: MediaEvent, now: Instant) {
        if !self.mounted {
            return;
        }
        let Some(media) = self.media.as_mut() else {
            return;
        };
        let mut autoplay = false;
        match event {
            MediaEvent::Play => {
                self.state.paused = false;
                self.state.buffering = false;
                self.state.last_error = None;
            }
            MediaEvent::Pause => {
                self.state.paused = true;
            }
            MediaEvent::TimeUpdate => {
                self.state.sync_time(media.current_time(), media.duration());
                self.state.buffering = false;
            }
            MediaEvent::Progress => {
                self.state.buffered_fraction = media.buffered_fraction();
                self.bars.buffer.set_target(self.state.buffered_fraction);
            }
            MediaEvent::LoadedData => {
                if !self.start_applied {
                    self.start_applied = true;
                    if let Some(time) = self.props.start_time {
                        media.seek(time);
                    }
                    if let Some(volume) = self.props.start_volume {
                        media.set_volume(volume);
                    }
                    if let Some(muted) = self.props.start_muted {
                        media.set_muted(muted);
                    }
                }
                self.state.sync_time(media.current_time(), media.duration());
                self.state.volume = media.volume();
                self.state.muted = media.muted();
                self.bars.volume.set_target(self.state.displayed_volume());
            }
            MediaEvent::CanPlayThrough => {
                autoplay = self.props.start_playing && !self.autoplayed;
            }
            MediaEvent::VolumeChange => {
                self.state.volume = media.volume();
                self.state.muted = media.muted();
                self.bars.volume.set_target(self.state.displayed_volume());
                self.audio.sync_gain(self.state.volume, self.state.muted);
                if !self.state.dragging {
                    self.persist_volume();
                }
            }
            MediaEvent::Waiting => {
                self.state.buffering = true;
            }
            MediaEvent::Error(err) => {
                tracing::warn!(error = %err, src = %self.props.src, "media element error");
                self.state.buffering = err.is_transient();
                self.state.paused = media.paused();
                self.state.last_error = Some(err);
            }
        }
        if autoplay {
            self.autoplayed = true;
            self.play(now);
        }
    }

    // ======================================================================
    // Playback commands
    // ======================================================================

    fn play(&mut self, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        if let Err(err) = self.audio.play(media) {
            tracing::warn!(error = %err, "playback request rejected");
            self.state.last_error = Some(err);
        }
        self.state.paused = media.paused();
        if !self.state.paused {
            self.actions
                .record(UserAction::TogglePlayback { playing: true }, now);
        }
    }

    fn pause(&mut self, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        let was_playing = !media.paused();
        self.audio.pause(media);
        self.state.paused = true;
        if was_playing {
            self.actions
                .record(UserAction::TogglePlayback { playing: false }, now);
        }
    }

    pub fn toggle_play(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        if self.is_playing() {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    pub fn toggle_mute(&mut self, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        let update = VolumeController::toggle_mute(media);
        self.apply_volume_update(update, true);
        self.actions
            .record(UserAction::ToggleMute { muted: update.muted }, now);
    }

    /// Relative seek, skipped while the duration is unknown.
    pub fn seek_by(&mut self, delta_secs: f64, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        if let Some(time) = media.seek_by(delta_secs) {
            self.state.sync_time(time, media.duration());
            self.actions
                .record(UserAction::Seek { position_secs: time }, now);
        }
    }

    pub fn step_volume(&mut self, louder: bool, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        let update = VolumeController::step(media, louder);
        self.apply_volume_update(update, true);
        self.actions
            .record(UserAction::SetVolume { volume: update.volume }, now);
    }

    fn apply_volume_update(&mut self, update: VolumeUpdate, persist: bool) {
        self.state.volume = update.volume;
        self.state.muted = update.muted;
        self.audio.sync_gain(update.volume, update.muted);
        if persist {
            self.persist_volume();
        }
    }

    fn persist_volume(&self) {
        self.settings
            .borrow_mut()
            .persist_volume(self.state.volume, self.state.muted);
    }

    // ======================================================================
    // Fullscreen
    // ======================================================================

    pub fn toggle_fullscreen(&mut self, now: Instant) {
        let Some(id) = self.media_id() else {
            return;
        };
        if !self.fullscreen.is_supported() {
            return;
        }
        if self.fullscreen.is_fullscreen_element(id) {
            self.fullscreen.exit();
        } else {
            self.fullscreen.request(id);
        }
        self.on_fullscreen_change();
        self.actions.record(
            UserAction::ToggleFullscreen {
                fullscreen: self.state.fullscreen,
            },
            now,
        );
    }

    /// Leaves fullscreen if this player's element holds it.
    fn exit_own_fullscreen(&mut self) {
        if self
            .media_id()
            .is_some_and(|id| self.fullscreen.is_fullscreen_element(id))
        {
            self.fullscreen.exit();
        }
        self.state.fullscreen = false;
    }

    /// The document's fullscreen element changed.
    pub fn on_fullscreen_change(&mut self) {
        self.state.fullscreen = self
            .media_id()
            .is_some_and(|id| self.fullscreen.is_fullscreen_element(id));
    }

    fn fullscreen_toast(&self) -> (HotkeyIcon, &'static str) {
        if self.state.fullscreen {
            (HotkeyIcon::FullscreenExit, "video.exit_fullscreen")
        } else {
            (HotkeyIcon::Fullscreen, "video.fullscreen")
        }
    }

    // ======================================================================
    // Clicks and hover
    // ======================================================================

    /// Click on the video surface. A second click within the double-click
    /// threshold cancels the pending play/pause and toggles fullscreen; a
    /// later one first runs the pending play/pause, even if no tick came
    /// in between.
    pub fn on_click(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        if self.click_timer.poll(now) {
            self.single_click(now);
        }
        if self.click_timer.is_pending() {
            self.click_timer.cancel();
            let (icon, label) = self.fullscreen_toast();
            self.hotkeys.register(icon, label, now);
            self.toggle_fullscreen(now);
        } else {
            self.click_timer.start(now);
        }
    }

    /// The double-click window of an earlier click closed without a
    /// second click.
    fn single_click(&mut self, now: Instant) {
        let (icon, label) = if self.is_playing() {
            (HotkeyIcon::Pause, "video.pause")
        } else {
            (HotkeyIcon::Play, "video.play")
        };
        self.hotkeys.register(icon, label, now);
        self.toggle_play(now);
    }

    pub fn on_mouse_enter(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.state.hovered = true;
        self.hover_timer.reset(now);
    }

    pub fn on_mouse_move(&mut self, now: Instant) {
        self.on_mouse_enter(now);
    }

    pub fn on_touch_end(&mut self, now: Instant) {
        self.on_mouse_enter(now);
    }

    pub fn on_mouse_leave(&mut self) {
        self.state.hovered = false;
        self.hover_timer.cancel();
    }

    // ======================================================================
    // Keyboard
    // ======================================================================

    /// Handles a key press. Returns `true` when the key is consumed; every
    /// key is consumed while fullscreen.
    pub fn on_key(&mut self, key: KeyInput, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let handled = match Hotkey::from_key(key) {
            Some(Hotkey::ExitFullscreen) | None => false,
            Some(hotkey) => {
                self.run_hotkey(hotkey, now);
                true
            }
        };
        if self.state.fullscreen {
            if key == KeyInput::Escape {
                self.hotkeys
                    .push(HotkeyIcon::FullscreenExit, "video.exit_fullscreen", now);
                self.fullscreen.exit();
                self.on_fullscreen_change();
            }
            return true;
        }
        handled
    }

    fn run_hotkey(&mut self, hotkey: Hotkey, now: Instant) {
        match hotkey {
            Hotkey::TogglePlay => {
                let (icon, label) = if self.is_playing() {
                    (HotkeyIcon::Pause, "video.pause")
                } else {
                    (HotkeyIcon::Play, "video.play")
                };
                self.hotkeys.register(icon, label, now);
                self.toggle_play(now);
            }
            Hotkey::ToggleMute => {
                let muted = self.media.as_ref().is_some_and(MediaAdapter::muted);
                let (icon, label) = if muted {
                    (HotkeyIcon::VolumeUp, "video.unmute")
                } else {
                    (HotkeyIcon::VolumeOff, "video.mute")
                };
                self.hotkeys.register(icon, label, now);
                self.toggle_mute(now);
            }
            Hotkey::ToggleFullscreen => {
                let (icon, label) = self.fullscreen_toast();
                self.hotkeys.register(icon, label, now);
                self.toggle_fullscreen(now);
            }
            Hotkey::SkipBackward => {
                self.hotkeys
                    .register(HotkeyIcon::Replay5, "video.skip_backward", now);
                self.seek_by(-KEYBOARD_SKIP_SECS, now);
            }
            Hotkey::SkipForward => {
                self.hotkeys
                    .register(HotkeyIcon::Forward5, "video.skip_forward", now);
                self.seek_by(KEYBOARD_SKIP_SECS, now);
            }
            Hotkey::FrameBackward => {
                let frame = frame_duration(self.props.frame_rate.as_deref());
                self.seek_by(-frame, now);
            }
            Hotkey::FrameForward => {
                let frame = frame_duration(self.props.frame_rate.as_deref());
                self.seek_by(frame, now);
            }
            Hotkey::VolumeUp => {
                self.hotkeys
                    .register(HotkeyIcon::VolumeUp, "video.volume_up", now);
                self.step_volume(true, now);
            }
            Hotkey::VolumeDown => {
                self.hotkeys
                    .register(HotkeyIcon::VolumeDown, "video.volume_down", now);
                self.step_volume(false, now);
            }
            Hotkey::ExitFullscreen => {}
        }
    }

    /// Removes a toast whose animation finished.
    pub fn dismiss_hotkey(&mut self, event: &HotkeyEvent) {
        self.hotkeys.dismiss(event.id);
    }

    // ======================================================================
    // Pointer gestures
    // ======================================================================

    /// Pointer-down on the seek track.
    pub fn on_seek_pointer_down(&mut self, track: ElementBox, event: &PointerInput, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(media) = self.media.as_mut() else {
            return false;
        };
        let Some(update) = self.seek.begin(&mut self.gestures, media, track, event) else {
            return false;
        };
        self.state.dragging = true;
        self.state.paused = true;
        self.apply_seek_update(update, now);
        true
    }

    /// Pointer-down on the volume track.
    pub fn on_volume_pointer_down(&mut self, track: ElementBox, event: &PointerInput, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(media) = self.media.as_mut() else {
            return false;
        };
        let Some(update) = self.volume.begin(&mut self.gestures, media, track, event) else {
            return false;
        };
        self.state.dragging = true;
        self.state.paused = true;
        self.apply_volume_drag(update, now);
        true
    }

    /// Seek slider moved to `fraction` of its track.
    ///
    /// A slider reports track fractions rather than pointer positions, so
    /// while a drag it started is active [`on_pointer_move`](Self::on_pointer_move)
    /// ignores document pointer moves.
    pub fn on_seek_slider(&mut self, fraction: f64, now: Instant) {
        self.on_slider(GestureKind::Seek, fraction, now);
    }

    /// Volume slider moved to `fraction` of its track.
    pub fn on_volume_slider(&mut self, fraction: f64, now: Instant) {
        self.on_slider(GestureKind::Volume, fraction, now);
    }

    fn on_slider(&mut self, kind: GestureKind, fraction: f64, now: Instant) {
        let pointer = PointerInput::mouse(Point::new(fraction as f32, 0.0));
        match self.gestures.active() {
            Some(active) if active == kind && self.slider_drag => self.drag_to(&pointer, now),
            Some(_) => {}
            None => {
                let track = unit_track();
                self.slider_drag = match kind {
                    GestureKind::Seek => self.on_seek_pointer_down(track, &pointer, now),
                    GestureKind::Volume => self.on_volume_pointer_down(track, &pointer, now),
                };
            }
        }
    }

    /// Whether document pointer moves drive the active drag.
    #[must_use]
    pub fn tracks_document_pointer(&self) -> bool {
        self.gestures.active().is_some() && !self.slider_drag
    }

    /// Document-level pointer move.
    pub fn on_pointer_move(&mut self, event: &PointerInput, now: Instant) {
        if self.slider_drag {
            return;
        }
        self.drag_to(event, now);
    }

    fn drag_to(&mut self, event: &PointerInput, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        match self.gestures.active() {
            Some(GestureKind::Seek) => {
                if let Some(update) = self.seek.drag(&self.gestures, media, event) {
                    self.apply_seek_update(update, now);
                }
            }
            Some(GestureKind::Volume) => {
                if let Some(update) = self.volume.drag(&self.gestures, media, event) {
                    self.apply_volume_drag(update, now);
                }
            }
            None => {}
        }
    }

    /// Document-level pointer release, wherever it lands.
    pub fn on_pointer_up(&mut self, now: Instant) {
        self.slider_drag = false;
        let resume = match self.gestures.active() {
            Some(GestureKind::Seek) => self.seek.end(&mut self.gestures),
            Some(GestureKind::Volume) => {
                let resume = self.volume.end(&mut self.gestures);
                self.persist_volume();
                resume
            }
            None => return,
        };
        self.state.dragging = false;
        if resume {
            self.play(now);
        }
    }

    /// Pointer cancelled by the platform; behaves like a release.
    pub fn on_pointer_cancel(&mut self, now: Instant) {
        self.on_pointer_up(now);
    }

    fn apply_seek_update(&mut self, update: SeekUpdate, now: Instant) {
        let Some(time) = update.time else {
            return;
        };
        let duration = self.media.as_ref().map_or(0.0, MediaAdapter::duration);
        self.state.sync_time(time, duration);
        self.bars.progress.set_target(update.fraction);
        self.actions
            .record(UserAction::Seek { position_secs: time }, now);
    }

    fn apply_volume_drag(&mut self, update: VolumeUpdate, now: Instant) {
        self.apply_volume_update(update, false);
        self.bars.volume.jump(self.state.displayed_volume());
        self.actions
            .record(UserAction::SetVolume { volume: update.volume }, now);
    }

    fn cancel_gestures(&mut self) {
        self.seek.cancel(&mut self.gestures);
        self.volume.cancel(&mut self.gestures);
        self.state.dragging = false;
        self.slider_drag = false;
    }

    // ======================================================================
    // Viewport, reveal and modal hosting
    // ======================================================================

    /// Page scrolled or resized.
    pub fn on_scroll(&mut self, viewport_height: f32, now: Instant) {
        if !self.mounted {
            return;
        }
        if let Some(height) = self.viewport.on_scroll(now, viewport_height) {
            self.check_viewport(height, now);
        }
    }

    fn check_viewport(&mut self, viewport_height: f32, now: Instant) {
        let Some(media) = self.media.as_ref() else {
            return;
        };
        if media.paused() || in_view(media.client_rect(), viewport_height) {
            return;
        }
        tracing::debug!(src = %self.props.src, "player scrolled out of view");
        self.pause(now);
        self.hand_off(now);
    }

    fn hand_off(&mut self, now: Instant) {
        let Some(media) = self.media.as_ref() else {
            return;
        };
        let audio = self.props.kind == MediaKind::Audio;
        let payload = HandOff {
            kind: self.props.kind,
            src: media.src().to_string(),
            current_time: media.current_time(),
            muted: media.muted(),
            volume: media.volume(),
            poster: if audio { self.props.poster.clone() } else { None },
            colors: audio.then(|| self.props.colors.clone()),
        };
        self.actions.record(
            UserAction::HandOff {
                position_secs: payload.current_time,
            },
            now,
        );
        if let Some(deploy) = self.callbacks.deploy_picture_in_picture.as_mut() {
            deploy(payload);
        }
    }

    /// Content warning clicked, or the hide button.
    pub fn toggle_reveal(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        if let Some(toggle) = self.callbacks.on_toggle_visibility.as_mut() {
            toggle(());
            return;
        }
        self.set_revealed(!self.state.revealed, now);
    }

    /// Externally owned visibility changed.
    pub fn set_visible(&mut self, visible: Option<bool>, now: Instant) {
        self.props.visible = visible;
        let revealed = self.props.initially_revealed();
        self.set_revealed(revealed, now);
    }

    fn set_revealed(&mut self, revealed: bool, now: Instant) {
        if !self.mounted || self.state.revealed == revealed {
            return;
        }
        self.state.revealed = revealed;
        self.actions.record(UserAction::Reveal { revealed }, now);
        if revealed {
            self.start_loops();
        } else {
            self.pause(now);
            self.stop_loops();
        }
    }

    /// Expand button: pauses and asks the host to open a modal player
    /// continuing from here.
    pub fn open_in_modal(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        let Some(media) = self.media.as_ref() else {
            return;
        };
        let options = OpenVideoOptions {
            start_time: media.current_time(),
            autoplay: !media.paused(),
            default_volume: media.volume(),
        };
        self.pause(now);
        if let Some(open) = self.callbacks.on_open_video.as_mut() {
            open(options);
        }
    }

    /// Close button of a modal player.
    pub fn close(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.pause(now);
        if let Some(close) = self.callbacks.on_close_video.as_mut() {
            close(());
        }
    }

    // ======================================================================
    // Time
    // ======================================================================

    fn start_loops(&mut self) {
        self.progress_loop.request();
        self.spring_loop.request();
    }

    fn stop_loops(&mut self) {
        self.progress_loop.cancel();
        self.spring_loop.cancel();
    }

    /// Fires due timers: the single-click action, the hover fade, the
    /// trailing scroll check and toast expiry.
    pub fn tick(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        if self.click_timer.poll(now) {
            self.single_click(now);
        }
        if self.hover_timer.poll(now) {
            self.state.hovered = false;
        }
        if let Some(height) = self.viewport.poll(now) {
            self.check_viewport(height, now);
        }
        self.hotkeys.expire(now);
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.click_timer.deadline(),
            self.hover_timer.deadline(),
            self.viewport.deadline(),
            self.hotkeys.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Runs both animation loops once. Returns whether another frame is
    /// wanted; after unmount it is always `false` and nothing is touched.
    pub fn on_animation_frame(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let mut wants_frame = false;

        if self.progress_loop.frame(now).is_some() {
            wants_frame = true;
            if let Some(media) = self.media.as_ref() {
                if !self.state.dragging {
                    self.state.sync_time(media.current_time(), media.duration());
                    self.bars.progress.set_target(self.state.progress_fraction());
                }
            }
            if self.props.kind == MediaKind::Audio {
                self.bands = self.audio.sample_bands(self.props.visualizer_bands);
            }
        }

        if let Some(dt) = self.spring_loop.frame(now) {
            wants_frame = true;
            self.bars.step(dt);
        }

        if wants_frame {
            tracing::trace!(progress = self.bars.progress.value(), "animation frame");
        }
        wants_frame
    }

    /// Decoded PCM for software audio analysis.
    pub fn feed_audio(&mut self, samples: &[f32]) {
        if self.mounted {
            self.audio.feed(samples);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.clone();
        PlayerSnapshot {
            kind: self.props.kind,
            progress_width: self.bars.progress.value().clamp(0.0, 1.0),
            buffer_width: self.bars.buffer.value().clamp(0.0, 1.0),
            volume_width: self.bars.volume.value().clamp(0.0, 1.0),
            current_time_label: state.current_time_label(),
            duration_label: state.duration_label(),
            seek_value_now: state.seek_value_now(),
            volume_value_now: state.volume_value_now(),
            play_label: state.play_label(),
            mute_label: state.mute_label(),
            fullscreen_label: state.fullscreen_label(),
            preload: state.preload(self.props.start_time.is_some(), self.props.detailed),
            controls_visible: self.props.always_visible || state.controls_visible(),
            show_spoiler: !(state.revealed || self.props.editable),
            show_hide_button: self.callbacks.on_close_video.is_none()
                && !self.props.editable
                && !state.fullscreen
                && !self.props.always_visible
                && state.revealed,
            show_blurhash: self.props.use_blurhash && !state.revealed,
            fullscreen_supported: self.fullscreen.is_supported(),
            hotkeys: self.hotkeys.events().to_vec(),
            bands: self.bands.clone(),
            poster: self.props.poster.clone(),
            alt: self.props.alt.clone(),
            state,
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unmount(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::fullscreen::{FullscreenVendor, HeadlessDocument};
    use crate::player::gesture::CountingListeners;
    use crate::player::media::HeadlessMedia;
    use crate::player::settings::{MemoryBackend, PersistedSettings, PlayerSettings};
    use iced::{Point, Rectangle, Size};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    const MS: Duration = Duration::from_millis(1);

    struct Rig {
        player: Player,
        media: HeadlessMedia,
        backend: MemoryBackend,
        document: HeadlessDocument,
        listeners: CountingListeners,
        t0: Instant,
    }

    impl Rig {
        fn pump(&mut self, now: Instant) {
            for event in self.media.take_events() {
                self.player.handle_media_event(event, now);
            }
        }
    }

    fn rig(props: PlayerProps, callbacks: PlayerCallbacks) -> Rig {
        let t0 = Instant::now();
        let media = HeadlessMedia::new(1, &props.src);
        let backend = MemoryBackend::new();
        let document = HeadlessDocument::new(FullscreenVendor::Standard);
        let listeners = CountingListeners::new();
        let env = PlayerEnv::new(PlayerSettings::new(backend.clone()).shared())
            .with_fullscreen(Fullscreen::detect(Box::new(document.clone())))
            .with_listeners(listeners.clone());
        let player = Player::mount(props, Box::new(media.clone()), env, callbacks, t0);
        let mut rig = Rig {
            player,
            media,
            backend,
            document,
            listeners,
            t0,
        };
        rig.media.load(120.0);
        rig.pump(t0);
        rig
    }

    fn seek_track() -> ElementBox {
        ElementBox::new(Rectangle::new(Point::new(0.0, 300.0), Size::new(200.0, 6.0)))
    }

    #[test]
    fn mount_restores_persisted_volume() {
        let t0 = Instant::now();
        let media = HeadlessMedia::new(1, "a.mp4");
        let settings = PlayerSettings::new(MemoryBackend::with(PersistedSettings {
            volume: Some(0.3),
            muted: Some(true),
        }))
        .shared();
        let player = Player::mount(
            PlayerProps::video("a.mp4"),
            Box::new(media.clone()),
            PlayerEnv::new(settings),
            PlayerCallbacks::default(),
            t0,
        );

        assert_eq!(media.volume(), 0.3);
        assert!(media.muted());
        assert_eq!(player.snapshot().volume_width, 0.0);
    }

    #[test]
    fn single_click_toggles_play_after_threshold() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;

        rig.player.on_click(t0);
        rig.player.tick(t0 + 100 * MS);
        assert!(rig.player.state().paused);

        rig.player.tick(t0 + 250 * MS);
        assert!(!rig.player.state().paused);
        assert!(!rig.player.state().fullscreen);
    }

    #[test]
    fn double_click_toggles_fullscreen_only() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;

        rig.player.on_click(t0);
        rig.player.on_click(t0 + 120 * MS);
        rig.player.tick(t0 + 500 * MS);

        assert!(rig.player.state().paused);
        assert!(rig.player.state().fullscreen);
        assert_eq!(rig.document.element(), Some(ElementId(1)));
    }

    #[test]
    fn late_second_click_is_another_single_click() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;

        rig.player.on_click(t0);
        rig.player.on_click(t0 + 400 * MS);
        assert!(!rig.player.state().paused);
        assert!(!rig.player.state().fullscreen);

        rig.player.tick(t0 + 1000 * MS);
        assert!(rig.player.state().paused);
        assert!(!rig.player.state().fullscreen);
        assert_eq!(rig.document.element(), None);
    }

    #[test]
    fn unmount_mid_drag_releases_listeners_and_timers() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.toggle_play(t0);
        rig.player.on_scroll(800.0, t0);
        rig.player.on_scroll(800.0, t0 + 40 * MS);
        rig.player.on_mouse_enter(t0 + 45 * MS);
        rig.player.on_click(t0 + 50 * MS);
        assert!(rig.player.on_seek_pointer_down(
            seek_track(),
            &PointerInput::mouse(Point::new(50.0, 302.0)),
            t0 + 60 * MS,
        ));
        assert_eq!(rig.listeners.attached(), 1);
        assert!(rig.player.next_deadline().is_some());

        rig.player.unmount(t0 + 70 * MS);
        assert_eq!(rig.listeners.attached(), 0);
        assert_eq!(rig.player.next_deadline(), None);
        assert!(rig.player.active_gesture().is_none());

        let writes = rig.media.writes();
        rig.player
            .on_pointer_move(&PointerInput::mouse(Point::new(150.0, 302.0)), t0 + 80 * MS);
        rig.player.on_pointer_up(t0 + 90 * MS);
        rig.player.tick(t0 + 1000 * MS);
        assert_eq!(rig.media.writes(), writes);
        assert!(rig.media.paused());
    }

    #[test]
    fn unmount_leaves_own_fullscreen() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.on_key(KeyInput::Char('f'), t0);
        assert_eq!(rig.document.element(), Some(ElementId(1)));

        rig.player.unmount(t0);
        assert_eq!(rig.document.element(), None);
    }

    #[test]
    fn fullscreen_moves_between_players() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.toggle_fullscreen(t0);
        assert!(rig.player.state().fullscreen);

        let other_media = HeadlessMedia::new(2, "b.mp4");
        let env = PlayerEnv::new(PlayerSettings::in_memory().shared())
            .with_fullscreen(Fullscreen::detect(Box::new(rig.document.clone())));
        let mut other = Player::mount(
            PlayerProps::video("b.mp4"),
            Box::new(other_media),
            env,
            PlayerCallbacks::default(),
            t0,
        );

        other.toggle_fullscreen(t0);
        rig.player.on_fullscreen_change();
        assert_eq!(rig.document.element(), Some(ElementId(2)));
        assert!(other.state().fullscreen);
        assert!(!rig.player.state().fullscreen);

        other.unmount(t0);
        assert_eq!(rig.document.element(), None);
    }

    #[test]
    fn fullscreen_swallows_keys_and_escape_exits() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.on_key(KeyInput::Char('f'), t0);
        assert!(rig.player.state().fullscreen);

        assert!(rig.player.on_key(KeyInput::Char('z'), t0));
        assert!(rig.player.on_key(KeyInput::Escape, t0));
        assert!(!rig.player.state().fullscreen);
        assert!(!rig.player.on_key(KeyInput::Char('z'), t0));
    }

    #[test]
    fn keyboard_skip_and_frame_step() {
        let mut rig = rig(
            PlayerProps::video("a.mp4").with_frame_rate("50"),
            PlayerCallbacks::default(),
        );
        let t0 = rig.t0;

        rig.player.on_key(KeyInput::ArrowRight, t0);
        assert_eq!(rig.media.current_time(), 5.0);
        rig.player.on_key(KeyInput::Char('.'), t0);
        assert!((rig.media.current_time() - 5.02).abs() < 1e-9);
        rig.player.on_key(KeyInput::Char('j'), t0);
        rig.player.on_key(KeyInput::Char('j'), t0);
        assert_eq!(rig.media.current_time(), 0.0);

        let labels: Vec<_> = rig.player.snapshot().hotkeys.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["video.skip_backward"]);
    }

    #[test]
    fn start_overrides_apply_on_loaded_data() {
        let rig = rig(
            PlayerProps::video("a.mp4").with_start(Some(42.0), Some(0.8), Some(false)),
            PlayerCallbacks::default(),
        );
        assert_eq!(rig.media.current_time(), 42.0);
        assert_eq!(rig.media.volume(), 0.8);
        assert_eq!(rig.player.state().current_time, 42.0);
        assert_eq!(rig.player.snapshot().preload, Preload::Auto);
    }

    #[test]
    fn autoplay_requires_explicit_flag() {
        let rig_plain = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        assert!(rig_plain.player.state().paused);

        let rig_auto = rig(PlayerProps::video("a.mp4").start_playing(true), PlayerCallbacks::default());
        assert!(!rig_auto.player.state().paused);
    }

    #[test]
    fn rejected_play_stays_paused() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        rig.media.block_autoplay(true);

        rig.player.toggle_play(rig.t0);

        assert!(rig.player.state().paused);
        assert!(rig.player.state().last_error.is_some());
    }

    #[test]
    fn volume_drag_persists_on_release_only() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        let track = ElementBox::new(Rectangle::new(Point::new(100.0, 0.0), Size::new(100.0, 4.0)));
        let before = rig.backend.stored();

        rig.player
            .on_volume_pointer_down(track, &PointerInput::mouse(Point::new(120.0, 2.0)), t0);
        rig.pump(t0);
        rig.player
            .on_pointer_move(&PointerInput::mouse(Point::new(180.0, 2.0)), t0);
        rig.pump(t0);
        assert_eq!(rig.backend.stored(), before);

        rig.player.on_pointer_up(t0);
        let stored = rig.backend.stored().expect("persisted on release");
        assert!((stored.volume.unwrap_or_default() - 0.8).abs() < 1e-6);
        assert_eq!(stored.muted, Some(false));
        assert_eq!(rig.listeners.attached(), 0);
    }

    #[test]
    fn second_gesture_is_refused_while_one_is_active() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        let event = PointerInput::mouse(Point::new(10.0, 300.0));

        assert!(rig.player.on_seek_pointer_down(seek_track(), &event, t0));
        assert!(!rig.player.on_volume_pointer_down(seek_track(), &event, t0));
        assert_eq!(rig.player.active_gesture(), Some(GestureKind::Seek));
    }

    #[test]
    fn hiding_pauses_and_stops_loops() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.toggle_play(t0);

        rig.player.toggle_reveal(t0);

        assert!(!rig.player.state().revealed);
        assert!(rig.media.paused());
        assert!(!rig.player.on_animation_frame(t0 + 16 * MS));
        assert!(rig.player.snapshot().show_spoiler);
    }

    #[test]
    fn external_visibility_toggle_is_delegated() {
        let toggles = Rc::new(RefCell::new(0));
        let counter = toggles.clone();
        let callbacks = PlayerCallbacks::default().on_toggle_visibility(move || *counter.borrow_mut() += 1);
        let mut rig = rig(PlayerProps::video("a.mp4").with_visible(Some(true)), callbacks);

        rig.player.toggle_reveal(rig.t0);
        assert_eq!(*toggles.borrow(), 1);
        assert!(rig.player.state().revealed);

        rig.player.set_visible(Some(false), rig.t0);
        assert!(!rig.player.state().revealed);
    }

    #[test]
    fn open_in_modal_reports_playback_context() {
        let opened = Rc::new(RefCell::new(None));
        let sink = opened.clone();
        let callbacks = PlayerCallbacks::default().on_open_video(move |options| *sink.borrow_mut() = Some(options));
        let mut rig = rig(PlayerProps::video("a.mp4"), callbacks);
        let t0 = rig.t0;
        rig.player.toggle_play(t0);
        rig.media.advance(12.0);
        rig.pump(t0);

        rig.player.open_in_modal(t0);

        assert_eq!(
            *opened.borrow(),
            Some(OpenVideoOptions {
                start_time: 12.0,
                autoplay: true,
                default_volume: 0.5,
            })
        );
        assert!(rig.media.paused());
    }

    #[test]
    fn hover_fades_after_delay() {
        let mut rig = rig(PlayerProps::video("a.mp4"), PlayerCallbacks::default());
        let t0 = rig.t0;
        rig.player.toggle_play(t0);

        rig.player.on_mouse_enter(t0);
        assert!(rig.player.snapshot().controls_visible);
        rig.player.on_mouse_move(t0 + 3000 * MS);
        rig.player.tick(t0 + 4500 * MS);
        assert!(rig.player.state().hovered);

        rig.player.tick(t0 + 7000 * MS);
        assert!(!rig.player.snapshot().controls_visible);
    }

    #[test]
    fn audio_hand_off_carries_poster_and_colors() {
        let handed = Rc::new(RefCell::new(Vec::new()));
        let sink = handed.clone();
        let callbacks = PlayerCallbacks::default().deploy_picture_in_picture(move |h| sink.borrow_mut().push(h));
        let mut rig = rig(PlayerProps::audio("a.ogg").with_poster("cover.png"), callbacks);
        rig.player.toggle_play(rig.t0);

        rig.player.replace_element(None, rig.t0);

        let handed = handed.borrow();
        assert_eq!(handed.len(), 1);
        assert_eq!(handed[0].kind, MediaKind::Audio);
        assert_eq!(handed[0].poster.as_deref(), Some("cover.png"));
        assert_eq!(handed[0].colors.as_ref().map(|c| c.background.as_str()), Some("#000000"));
    }
}
