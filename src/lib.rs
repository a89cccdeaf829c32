// SPDX-License-Identifier: MPL-2.0
//! `inline_player` is an embeddable audio/video player core.
//!
//! It owns the interaction model of an inline media player (click and
//! double-click, drag-to-seek, volume, keyboard shortcuts, fullscreen,
//! sensitive-content reveal, hand-off to picture-in-picture) and drives a
//! host-provided media element. Rendering is available through the iced
//! widgets in [`ui`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod paths;
pub mod player;
pub mod ui;

#[cfg(test)]
mod test_utils;
