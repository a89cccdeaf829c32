// SPDX-License-Identifier: MPL-2.0
//! Integration tests for the inline player
//!
//! These tests drive a mounted player through the public API with an
//! in-memory media element, the way a host page would: forwarding element
//! events, pointer input, keys, scrolls and clock ticks.

use iced::{Point, Rectangle, Size};
use inline_player::error::MediaError;
use inline_player::player::{
    pointer_position, AudioGraph, ElementBox, ElementId, Fullscreen, FullscreenVendor, HandOff,
    HeadlessDocument, HeadlessMedia, MediaElement, MediaEvent, MediaKind, Player, PlayerCallbacks,
    PlayerEnv, PlayerProps, PlayerSettings, PointerInput, SoftwareAnalyser,
};
use inline_player::player::settings::{MemoryBackend, PersistedSettings};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

const MS: Duration = Duration::from_millis(1);

struct Harness {
    player: Player,
    media: HeadlessMedia,
    handoffs: Rc<RefCell<Vec<HandOff>>>,
    t0: Instant,
}

impl Harness {
    fn mount(props: PlayerProps) -> Self {
        Self::mount_with(props, PlayerSettings::in_memory())
    }

    fn mount_with(props: PlayerProps, settings: PlayerSettings) -> Self {
        let t0 = Instant::now();
        let media = HeadlessMedia::new(1, &props.src);
        let handoffs = Rc::new(RefCell::new(Vec::new()));
        let sink = handoffs.clone();
        let callbacks = PlayerCallbacks::default()
            .deploy_picture_in_picture(move |handoff| sink.borrow_mut().push(handoff));
        let env = PlayerEnv::new(settings.shared())
            .with_fullscreen(Fullscreen::detect(Box::new(HeadlessDocument::new(
                FullscreenVendor::Webkit,
            ))));
        let player = Player::mount(props, Box::new(media.clone()), env, callbacks, t0);
        Self {
            player,
            media,
            handoffs,
            t0,
        }
    }

    fn loaded(props: PlayerProps, duration: f64) -> Self {
        let mut harness = Self::mount(props);
        harness.media.load(duration);
        harness.pump();
        harness
    }

    fn pump(&mut self) {
        for event in self.media.take_events() {
            self.player.handle_media_event(event, self.t0);
        }
    }

    fn at(&self, millis: u64) -> Instant {
        self.t0 + MS * u32::try_from(millis).unwrap_or(u32::MAX)
    }
}

fn seek_track() -> ElementBox {
    ElementBox::new(Rectangle::new(Point::new(20.0, 340.0), Size::new(400.0, 8.0)))
}

fn track_point(fraction: f32) -> PointerInput {
    PointerInput::mouse(Point::new(20.0 + 400.0 * fraction, 344.0))
}

#[test]
fn test_pointer_fraction_is_clamped_offset_over_width() {
    let element = ElementBox::new(Rectangle::new(Point::new(50.0, 10.0), Size::new(200.0, 20.0)));

    for px in [-100.0_f32, 0.0, 50.0, 75.0, 150.0, 249.0, 250.0, 400.0] {
        let position = pointer_position(Some(&element), &PointerInput::mouse(Point::new(px, 20.0)));
        let expected = ((f64::from(px) - 50.0) / 200.0).clamp(0.0, 1.0);
        assert!((position.x - expected).abs() < 1e-9, "px = {px}");
        assert!((position.y - 0.5).abs() < 1e-9);
    }
}

#[test]
fn test_seek_drag_resumes_only_if_playing_before() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 120.0);
    let t0 = harness.t0;

    harness.player.toggle_play(t0);
    harness.pump();
    assert!(!harness.media.paused());

    assert!(harness.player.on_seek_pointer_down(seek_track(), &track_point(0.2), t0));
    assert!(harness.media.paused(), "drag must pause");
    harness.player.on_pointer_move(&track_point(0.3), t0);
    harness.player.on_pointer_up(t0);
    assert!(!harness.media.paused(), "resumes after a drag that began playing");

    harness.player.toggle_play(t0);
    assert!(harness.media.paused());
    harness.player.on_seek_pointer_down(seek_track(), &track_point(0.4), t0);
    harness.player.on_pointer_up(t0);
    assert!(harness.media.paused(), "stays paused after a drag that began paused");
}

#[test]
fn test_zero_volume_mutes_and_unmute_restores_floor() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 60.0);
    let t0 = harness.t0;
    let volume_track = ElementBox::new(Rectangle::new(Point::new(500.0, 340.0), Size::new(80.0, 8.0)));

    harness
        .player
        .on_volume_pointer_down(volume_track, &PointerInput::mouse(Point::new(400.0, 344.0)), t0);
    harness.player.on_pointer_up(t0);
    harness.pump();
    assert_eq!(harness.media.volume(), 0.0);
    assert!(harness.media.muted());
    assert!(harness.player.state().muted);

    harness.player.toggle_mute(t0);
    harness.pump();
    assert!((harness.media.volume() - 0.05).abs() < 1e-9);
    assert!(!harness.media.muted());
}

/// Element whose clock and duration are garbage.
struct GarbageMedia {
    inner: HeadlessMedia,
}

impl MediaElement for GarbageMedia {
    fn id(&self) -> ElementId {
        self.inner.id()
    }
    fn src(&self) -> &str {
        self.inner.src()
    }
    fn play(&mut self) -> Result<(), MediaError> {
        self.inner.play()
    }
    fn pause(&mut self) {
        self.inner.pause();
    }
    fn paused(&self) -> bool {
        self.inner.paused()
    }
    fn current_time(&self) -> f64 {
        f64::NAN
    }
    fn set_current_time(&mut self, secs: f64) {
        assert!(secs.is_finite() && secs >= 0.0, "wrote {secs}");
        self.inner.set_current_time(secs);
    }
    fn duration(&self) -> f64 {
        f64::INFINITY
    }
    fn volume(&self) -> f64 {
        self.inner.volume()
    }
    fn set_volume(&mut self, volume: f64) {
        self.inner.set_volume(volume);
    }
    fn muted(&self) -> bool {
        self.inner.muted()
    }
    fn set_muted(&mut self, muted: bool) {
        self.inner.set_muted(muted);
    }
    fn buffered_end(&self) -> Option<f64> {
        Some(f64::NAN)
    }
    fn client_rect(&self) -> Rectangle {
        self.inner.client_rect()
    }
}

#[test]
fn test_current_time_never_becomes_nan_or_negative() {
    let t0 = Instant::now();
    let inner = HeadlessMedia::new(9, "live.mp4");
    let mut player = Player::mount(
        PlayerProps::video("live.mp4").with_start(Some(-3.0), None, None),
        Box::new(GarbageMedia { inner }),
        PlayerEnv::new(PlayerSettings::in_memory().shared()),
        PlayerCallbacks::default(),
        t0,
    );

    for event in [
        MediaEvent::LoadedData,
        MediaEvent::TimeUpdate,
        MediaEvent::Progress,
        MediaEvent::Error(MediaError::Decode("corrupt frame".into())),
    ] {
        player.handle_media_event(event, t0);
    }
    player.on_seek_pointer_down(seek_track(), &PointerInput::mouse(Point::new(f32::NAN, 0.0)), t0);
    player.on_pointer_move(&PointerInput::mouse(Point::new(-1e9, 0.0)), t0);
    player.on_pointer_up(t0);
    player.on_animation_frame(t0 + 16 * MS);

    let state = player.state();
    assert_eq!(state.current_time, 0.0);
    assert_eq!(state.duration, 0.0);
    assert_eq!(state.buffered_fraction, 0.0);
    assert_eq!(player.snapshot().current_time_label, "00:00");
}

#[test]
fn test_unmount_while_playing_hands_off_once() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 120.0);
    let t0 = harness.t0;
    harness.player.toggle_play(t0);
    harness.media.advance(33.0);
    harness.pump();
    assert!(harness.player.on_animation_frame(harness.at(16)));

    harness.player.unmount(harness.at(20));
    harness.player.unmount(harness.at(30));

    {
        let handoffs = harness.handoffs.borrow();
        assert_eq!(handoffs.len(), 1);
        assert_eq!(handoffs[0].current_time, 33.0);
        assert_eq!(handoffs[0].volume, 0.5);
        assert!(!handoffs[0].muted);
        assert_eq!(handoffs[0].kind, MediaKind::Video);
        assert!(handoffs[0].poster.is_none());
    }

    let writes = harness.media.writes();
    assert!(!harness.player.on_animation_frame(harness.at(32)));
    harness.player.tick(harness.at(5_000));
    harness.player.on_key(inline_player::player::KeyInput::Space, harness.at(5_000));
    assert_eq!(harness.media.writes(), writes, "no writes after unmount");

    let Harness { player, handoffs, .. } = harness;
    drop(player);
    assert_eq!(handoffs.borrow().len(), 1);
}

#[test]
fn test_dragging_to_half_of_two_minutes_seeks_to_one_minute() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 120.0);
    let t0 = harness.t0;

    harness.player.on_seek_pointer_down(seek_track(), &track_point(0.1), t0);
    harness.player.on_pointer_move(&track_point(0.5), t0);
    harness.player.on_pointer_up(t0);
    harness.pump();

    assert_eq!(harness.media.current_time(), 60.0);
    assert_eq!(harness.player.snapshot().current_time_label, "01:00");
    assert_eq!(harness.player.snapshot().duration_label, "02:00");
}

#[test]
fn test_default_volume_mounts_at_half_width() {
    let backend = MemoryBackend::with(PersistedSettings {
        volume: Some(0.5),
        muted: Some(false),
    });
    let harness = Harness::mount_with(PlayerProps::video("clip.mp4"), PlayerSettings::new(backend));

    let snapshot = harness.player.snapshot();
    assert_eq!(snapshot.volume_width, 0.5);
    assert_eq!(snapshot.volume_value_now, 50.0);
}

#[test]
fn test_scrolling_out_of_view_pauses_and_hands_off_within_throttle() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 120.0);
    let t0 = harness.t0;
    harness.player.toggle_play(t0);
    harness.pump();

    // Leading check while still on screen.
    harness.player.on_scroll(800.0, t0);
    assert!(!harness.media.paused());

    harness
        .media
        .set_rect(Rectangle::new(Point::new(0.0, -900.0), Size::new(640.0, 360.0)));
    harness.player.on_scroll(800.0, harness.at(40));
    harness.player.on_scroll(800.0, harness.at(90));
    assert!(!harness.media.paused(), "throttled");

    harness.player.tick(harness.at(150));
    assert!(harness.media.paused());
    assert_eq!(harness.handoffs.borrow().len(), 1);

    harness.player.on_scroll(800.0, harness.at(400));
    harness.player.tick(harness.at(600));
    assert_eq!(harness.handoffs.borrow().len(), 1);
}

#[test]
fn test_double_click_toggles_fullscreen_not_playback() {
    let mut harness = Harness::loaded(PlayerProps::video("clip.mp4"), 120.0);

    harness.player.on_click(harness.at(0));
    harness.player.on_click(harness.at(180));
    harness.player.tick(harness.at(1_000));
    assert!(harness.player.state().fullscreen);
    assert!(harness.media.paused());

    harness.player.on_click(harness.at(2_000));
    harness.player.tick(harness.at(2_300));
    assert!(!harness.media.paused());
    assert!(harness.player.state().fullscreen);
}

#[test]
fn test_audio_player_samples_visualizer_bands() {
    let t0 = Instant::now();
    let media = HeadlessMedia::new(4, "song.ogg");
    let env = PlayerEnv::new(PlayerSettings::in_memory().shared())
        .with_audio(AudioGraph::new(Box::new(SoftwareAnalyser::new())));
    let mut player = Player::mount(
        PlayerProps::audio("song.ogg"),
        Box::new(media.clone()),
        env,
        PlayerCallbacks::default(),
        t0,
    );
    media.load(200.0);
    for event in media.take_events() {
        player.handle_media_event(event, t0);
    }
    player.toggle_play(t0);

    let samples: Vec<f32> = (0..2048)
        .map(|i| 0.5 * (i as f32 * 0.07).sin())
        .collect();
    player.feed_audio(&samples);
    assert!(player.on_animation_frame(t0 + 16 * MS));

    let bands = player.snapshot().bands;
    assert_eq!(bands.len(), 3);
    assert!(bands.iter().all(|b| (0.0..=1.0).contains(b)));
    assert!(bands[0] > 0.0);
}
