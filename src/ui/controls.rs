// SPDX-License-Identifier: MPL-2.0
//! Player controls overlay.
//!
//! Renders a [`PlayerSnapshot`] as an iced element tree. Sliders report
//! fractions of their track; [`apply`] hands them to the player's slider
//! gestures.

use crate::player::{HotkeyIcon, MediaKind, Player, PlayerSnapshot};
use iced::widget::{
    button, column, container, mouse_area, progress_bar, row, slider, text, Column, Row, Space,
};
use iced::{Element, Length, Point};
use std::time::Instant;

/// Slider resolution, as a fraction of the track.
const SLIDER_STEP: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    SurfaceClicked,
    TogglePlayback,
    ToggleMute,
    ToggleFullscreen,
    ToggleReveal,
    Expand,
    Close,
    /// Seek slider moved to a fraction of the track.
    SeekChanged(f64),
    VolumeChanged(f64),
    /// A slider was released.
    SliderReleased,
    HoverEntered,
    HoverMoved(Point),
    HoverExited,
}

/// Message translation for control labels.
pub struct ViewContext<'a> {
    pub translate: &'a dyn Fn(&str) -> String,
    /// Render the close button of a modal player.
    pub closable: bool,
    pub expandable: bool,
}

/// Applies a control message to `player`.
pub fn apply(player: &mut Player, message: Message, now: Instant) {
    match message {
        Message::SurfaceClicked => player.on_click(now),
        Message::TogglePlayback => player.toggle_play(now),
        Message::ToggleMute => player.toggle_mute(now),
        Message::ToggleFullscreen => player.toggle_fullscreen(now),
        Message::ToggleReveal => player.toggle_reveal(now),
        Message::Expand => player.open_in_modal(now),
        Message::Close => player.close(now),
        Message::SeekChanged(fraction) => player.on_seek_slider(fraction, now),
        Message::VolumeChanged(fraction) => player.on_volume_slider(fraction, now),
        Message::SliderReleased => player.on_pointer_up(now),
        Message::HoverEntered => player.on_mouse_enter(now),
        Message::HoverMoved(_) => player.on_mouse_move(now),
        Message::HoverExited => player.on_mouse_leave(),
    }
}

fn icon_glyph(icon: HotkeyIcon) -> &'static str {
    match icon {
        HotkeyIcon::Play => "▶",
        HotkeyIcon::Pause => "⏸",
        HotkeyIcon::VolumeUp => "🔊",
        HotkeyIcon::VolumeDown => "🔉",
        HotkeyIcon::VolumeOff => "🔇",
        HotkeyIcon::Fullscreen => "⛶",
        HotkeyIcon::FullscreenExit => "⤡",
        HotkeyIcon::Replay5 => "↺5",
        HotkeyIcon::Forward5 => "5↻",
    }
}

fn spoiler<'a>(ctx: &ViewContext<'a>, snapshot: &PlayerSnapshot) -> Element<'a, Message> {
    let mut warning = Column::new().spacing(4);
    if let Some(alt) = &snapshot.alt {
        warning = warning.push(text(alt.clone()).size(12));
    }
    let label = if snapshot.kind == MediaKind::Audio {
        (ctx.translate)("audio.hidden")
    } else {
        (ctx.translate)("video.hidden")
    };
    warning = warning.push(text(label).size(14));

    button(container(warning).center_x(Length::Fill).center_y(Length::Fill))
        .on_press(Message::ToggleReveal)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn toolbar<'a>(ctx: &ViewContext<'a>, snapshot: &PlayerSnapshot) -> Row<'a, Message> {
    let tr = ctx.translate;

    let play = button(text(tr(snapshot.play_label))).on_press(Message::TogglePlayback);
    let mute = button(text(tr(snapshot.mute_label))).on_press(Message::ToggleMute);
    let volume = slider(0.0..=1.0, snapshot.volume_width, Message::VolumeChanged)
        .on_release(Message::SliderReleased)
        .step(SLIDER_STEP)
        .width(Length::Fixed(80.0));
    let time = text(format!(
        "{} / {}",
        snapshot.current_time_label, snapshot.duration_label
    ))
    .size(12);

    let mut bar = row![play, mute, volume, time]
        .spacing(8)
        .align_y(iced::alignment::Vertical::Center)
        .push(Space::new().width(Length::Fill));

    if snapshot.show_hide_button {
        bar = bar.push(button(text(tr("video.hide"))).on_press(Message::ToggleReveal));
    }
    if ctx.expandable && snapshot.kind == MediaKind::Video {
        bar = bar.push(button(text(tr("video.expand"))).on_press(Message::Expand));
    }
    if ctx.closable {
        bar = bar.push(button(text(tr("video.close"))).on_press(Message::Close));
    }
    if snapshot.fullscreen_supported && snapshot.kind == MediaKind::Video {
        bar = bar.push(
            button(text(tr(snapshot.fullscreen_label))).on_press(Message::ToggleFullscreen),
        );
    }
    bar
}

/// Renders the player surface with its controls.
pub fn view<'a>(ctx: ViewContext<'a>, snapshot: &PlayerSnapshot) -> Element<'a, Message> {
    if snapshot.show_spoiler {
        return spoiler(&ctx, snapshot);
    }

    let toasts = snapshot.hotkeys.iter().fold(Row::new().spacing(4), |toasts, event| {
        toasts.push(text(format!("{} {}", icon_glyph(event.icon), (ctx.translate)(event.label))))
    });

    let mut surface = Column::new().push(toasts).push(Space::new().height(Length::Fill));

    if snapshot.kind == MediaKind::Audio && !snapshot.bands.is_empty() {
        let bands = snapshot.bands.iter().fold(Row::new().spacing(2), |bands, &band| {
            bands.push(
                container(Space::new())
                    .width(Length::Fixed(6.0))
                    .height(Length::Fixed(4.0 + band * 40.0)),
            )
        });
        surface = surface.push(bands);
    }

    if snapshot.controls_visible {
        let seek = slider(0.0..=1.0, snapshot.progress_width, Message::SeekChanged)
            .on_release(Message::SliderReleased)
            .step(SLIDER_STEP);
        let buffered = progress_bar(0.0..=1.0, snapshot.buffer_width as f32);
        surface = surface.push(column![buffered, seek, toolbar(&ctx, snapshot)].spacing(4));
    }

    mouse_area(container(surface).width(Length::Fill).height(Length::Fill))
        .on_press(Message::SurfaceClicked)
        .on_enter(Message::HoverEntered)
        .on_move(Message::HoverMoved)
        .on_exit(Message::HoverExited)
        .into()
}
