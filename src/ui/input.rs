// SPDX-License-Identifier: MPL-2.0
//! iced events to player input.

use crate::player::{Hotkey, KeyInput, Player, PointerInput};
use iced::keyboard::{self, key::Named, Key};
use iced::{mouse, touch, Event};
use std::time::Instant;

/// Maps a logical key to player key input.
#[must_use]
pub fn key_input(key: &Key) -> KeyInput {
    match key.as_ref() {
        Key::Named(Named::Space) => KeyInput::Space,
        Key::Named(Named::ArrowLeft) => KeyInput::ArrowLeft,
        Key::Named(Named::ArrowRight) => KeyInput::ArrowRight,
        Key::Named(Named::ArrowUp) => KeyInput::ArrowUp,
        Key::Named(Named::ArrowDown) => KeyInput::ArrowDown,
        Key::Named(Named::Escape) => KeyInput::Escape,
        Key::Character(" ") => KeyInput::Space,
        Key::Character(c) => {
            let mut chars = c.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyInput::Char(ch),
                _ => KeyInput::Other,
            }
        }
        _ => KeyInput::Other,
    }
}

/// The shortcut bound to `key`, if any.
#[must_use]
pub fn hotkey(key: &Key) -> Option<Hotkey> {
    Hotkey::from_key(key_input(key))
}

/// Forwards document-level events to `player`: key presses, and pointer
/// moves and releases for an active drag. Moves are skipped while a slider
/// drives the drag. Returns whether the event was consumed.
pub fn handle_event(player: &mut Player, event: &Event, now: Instant) -> bool {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            if modifiers.control() || modifiers.alt() || modifiers.logo() {
                return false;
            }
            player.on_key(key_input(key), now)
        }
        Event::Mouse(mouse::Event::CursorMoved { position }) => {
            if !player.tracks_document_pointer() {
                return false;
            }
            player.on_pointer_move(&PointerInput::mouse(*position), now);
            true
        }
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            if player.active_gesture().is_none() {
                return false;
            }
            player.on_pointer_up(now);
            true
        }
        Event::Touch(touch::Event::FingerMoved { position, .. }) => {
            if !player.tracks_document_pointer() {
                return false;
            }
            player.on_pointer_move(&PointerInput::touch(vec![*position]), now);
            true
        }
        Event::Touch(touch::Event::FingerLifted { .. }) => {
            player.on_touch_end(now);
            if player.active_gesture().is_none() {
                return false;
            }
            player.on_pointer_up(now);
            true
        }
        Event::Touch(touch::Event::FingerLost { .. }) => {
            if player.active_gesture().is_none() {
                return false;
            }
            player.on_pointer_cancel(now);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{
        ElementBox, HeadlessMedia, MediaElement, PlayerCallbacks, PlayerEnv, PlayerProps,
        PlayerSettings,
    };
    use crate::ui::controls::{self, Message};
    use iced::keyboard::key::Named;
    use iced::{Point, Rectangle, Size};

    fn mounted() -> (Player, HeadlessMedia, Instant) {
        let now = Instant::now();
        let media = HeadlessMedia::new(1, "clip.mp4");
        let mut player = Player::mount(
            PlayerProps::video("clip.mp4"),
            Box::new(media.clone()),
            PlayerEnv::new(PlayerSettings::in_memory().shared()),
            PlayerCallbacks::default(),
            now,
        );
        media.load(120.0);
        for event in media.take_events() {
            player.handle_media_event(event, now);
        }
        (player, media, now)
    }

    fn cursor(x: f32, y: f32) -> Event {
        Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(x, y),
        })
    }

    #[test]
    fn cursor_moves_do_not_hijack_slider_drags() {
        let (mut player, media, now) = mounted();

        controls::apply(&mut player, Message::SeekChanged(0.25), now);
        assert_eq!(media.current_time(), 30.0);

        assert!(!handle_event(&mut player, &cursor(180.0, 400.0), now));
        assert_eq!(media.current_time(), 30.0);

        controls::apply(&mut player, Message::SeekChanged(0.5), now);
        assert_eq!(media.current_time(), 60.0);

        let release = Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left));
        assert!(handle_event(&mut player, &release, now));
        assert!(player.active_gesture().is_none());
        assert_eq!(media.current_time(), 60.0);
    }

    #[test]
    fn cursor_moves_drive_track_drags() {
        let (mut player, media, now) = mounted();
        let track = ElementBox::new(Rectangle::new(Point::new(0.0, 300.0), Size::new(200.0, 6.0)));

        assert!(player.on_seek_pointer_down(track, &PointerInput::mouse(Point::new(50.0, 302.0)), now));
        assert_eq!(media.current_time(), 30.0);

        assert!(handle_event(&mut player, &cursor(150.0, 400.0), now));
        assert_eq!(media.current_time(), 90.0);
    }

    #[test]
    fn slider_after_track_drag_starts_fresh() {
        let (mut player, media, now) = mounted();
        let track = ElementBox::new(Rectangle::new(Point::new(0.0, 300.0), Size::new(200.0, 6.0)));
        player.on_seek_pointer_down(track, &PointerInput::mouse(Point::new(50.0, 302.0)), now);
        player.on_pointer_up(now);

        controls::apply(&mut player, Message::VolumeChanged(0.2), now);
        assert!((media.volume() - 0.2).abs() < 1e-6);
        assert!(!handle_event(&mut player, &cursor(150.0, 400.0), now));
        assert!((media.volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn named_keys_map_to_player_keys() {
        assert_eq!(key_input(&Key::Named(Named::Space)), KeyInput::Space);
        assert_eq!(key_input(&Key::Named(Named::Escape)), KeyInput::Escape);
        assert_eq!(key_input(&Key::Named(Named::ArrowUp)), KeyInput::ArrowUp);
        assert_eq!(key_input(&Key::Named(Named::Enter)), KeyInput::Other);
    }

    #[test]
    fn single_characters_are_kept_verbatim() {
        assert_eq!(key_input(&Key::Character("k".into())), KeyInput::Char('k'));
        assert_eq!(key_input(&Key::Character("K".into())), KeyInput::Char('K'));
        assert_eq!(key_input(&Key::Character(" ".into())), KeyInput::Space);
        assert_eq!(key_input(&Key::Character("ab".into())), KeyInput::Other);
    }

    #[test]
    fn keys_resolve_to_shortcuts() {
        assert_eq!(hotkey(&Key::Character("f".into())), Some(Hotkey::ToggleFullscreen));
        assert_eq!(hotkey(&Key::Named(Named::ArrowLeft)), Some(Hotkey::SkipBackward));
        assert_eq!(hotkey(&Key::Character("q".into())), None);
    }
}
