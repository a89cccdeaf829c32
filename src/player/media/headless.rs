// SPDX-License-Identifier: MPL-2.0
//! In-memory media element.
//!
//! Behaves like a browser media element without decoding anything: it keeps
//! its own playhead, validates writes the same way and queues the native
//! events a real element would fire. Clones share state, so a host can hand
//! one clone to the player and keep another to drive time and drain events.

use super::{ElementId, MediaElement, MediaEvent};
use crate::error::MediaError;
use iced::{Point, Rectangle, Size};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug)]
struct Inner {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    buffered_end: Option<f64>,
    rect: Rectangle,
    autoplay_blocked: bool,
    events: VecDeque<MediaEvent>,
    writes: usize,
}

#[derive(Debug, Clone)]
pub struct HeadlessMedia {
    id: ElementId,
    src: Rc<str>,
    inner: Rc<RefCell<Inner>>,
}

impl HeadlessMedia {
    pub fn new(id: u64, src: &str) -> Self {
        Self {
            id: ElementId(id),
            src: Rc::from(src),
            inner: Rc::new(RefCell::new(Inner {
                paused: true,
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                muted: false,
                buffered_end: None,
                rect: Rectangle::new(Point::ORIGIN, Size::new(640.0, 360.0)),
                autoplay_blocked: false,
                events: VecDeque::new(),
                writes: 0,
            })),
        }
    }

    /// Simulates metadata arrival: sets the duration and queues
    /// `loadeddata` followed by `canplaythrough`.
    pub fn load(&self, duration_secs: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.duration = duration_secs;
        inner.events.push_back(MediaEvent::LoadedData);
        inner.events.push_back(MediaEvent::CanPlayThrough);
    }

    /// Advances the playhead while playing, pausing at the end.
    pub fn advance(&self, secs: f64) {
        let mut inner = self.inner.borrow_mut();
        if inner.paused || !inner.duration.is_finite() {
            return;
        }
        inner.current_time = (inner.current_time + secs).min(inner.duration);
        inner.events.push_back(MediaEvent::TimeUpdate);
        if inner.current_time >= inner.duration {
            inner.paused = true;
            inner.events.push_back(MediaEvent::Pause);
        }
    }

    pub fn set_buffered(&self, end_secs: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.buffered_end = Some(end_secs);
        inner.events.push_back(MediaEvent::Progress);
    }

    /// Moves the element on screen (client coordinates).
    pub fn set_rect(&self, rect: Rectangle) {
        self.inner.borrow_mut().rect = rect;
    }

    /// Makes subsequent `play()` calls fail like a blocked autoplay.
    pub fn block_autoplay(&self, blocked: bool) {
        self.inner.borrow_mut().autoplay_blocked = blocked;
    }

    /// Queues an arbitrary event, e.g. a network stall.
    pub fn fire(&self, event: MediaEvent) {
        self.inner.borrow_mut().events.push_back(event);
    }

    /// Drains queued events in firing order.
    pub fn take_events(&self) -> Vec<MediaEvent> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    /// Number of imperative writes received so far.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl MediaElement for HeadlessMedia {
    fn id(&self) -> ElementId {
        self.id
    }

    fn src(&self) -> &str {
        &self.src
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        if inner.autoplay_blocked {
            return Err(MediaError::PlayRejected("user gesture required".into()));
        }
        if inner.paused {
            if inner.duration.is_finite() && inner.current_time >= inner.duration {
                inner.current_time = 0.0;
            }
            inner.paused = false;
            inner.events.push_back(MediaEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        if !inner.paused {
            inner.paused = true;
            inner.events.push_back(MediaEvent::Pause);
        }
    }

    fn paused(&self) -> bool {
        self.inner.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.inner.borrow().current_time
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        inner.current_time = secs;
        inner.events.push_back(MediaEvent::TimeUpdate);
    }

    fn duration(&self) -> f64 {
        self.inner.borrow().duration
    }

    fn volume(&self) -> f64 {
        self.inner.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        if inner.volume != volume {
            inner.volume = volume;
            inner.events.push_back(MediaEvent::VolumeChange);
        }
    }

    fn muted(&self) -> bool {
        self.inner.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        if inner.muted != muted {
            inner.muted = muted;
            inner.events.push_back(MediaEvent::VolumeChange);
        }
    }

    fn buffered_end(&self) -> Option<f64> {
        self.inner.borrow().buffered_end
    }

    fn client_rect(&self) -> Rectangle {
        self.inner.borrow().rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_and_pause_queue_events_once() {
        let mut media = HeadlessMedia::new(7, "a.mp3");
        media.play().expect("play allowed");
        media.play().expect("play allowed");
        media.pause();
        media.pause();

        assert_eq!(media.take_events(), vec![MediaEvent::Play, MediaEvent::Pause]);
    }

    #[test]
    fn blocked_autoplay_rejects_play() {
        let mut media = HeadlessMedia::new(7, "a.mp3");
        media.block_autoplay(true);

        assert!(matches!(media.play(), Err(MediaError::PlayRejected(_))));
        assert!(media.paused());
    }

    #[test]
    fn advance_stops_at_the_end() {
        let mut media = HeadlessMedia::new(7, "a.mp3");
        media.load(10.0);
        media.play().expect("play allowed");
        media.take_events();

        media.advance(4.0);
        media.advance(8.0);

        assert_eq!(media.current_time(), 10.0);
        assert!(media.paused());
        assert_eq!(
            media.take_events(),
            vec![MediaEvent::TimeUpdate, MediaEvent::TimeUpdate, MediaEvent::Pause]
        );
    }

    #[test]
    fn unchanged_volume_writes_fire_no_event() {
        let mut media = HeadlessMedia::new(7, "a.mp3");
        media.set_volume(1.0);
        media.set_muted(false);
        assert!(media.take_events().is_empty());
        assert_eq!(media.writes(), 2);
    }
}
