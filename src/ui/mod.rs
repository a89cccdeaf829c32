// SPDX-License-Identifier: MPL-2.0
//! iced front end for the player.
//!
//! Follows the "state down, messages up" pattern: [`controls::view`] renders
//! a snapshot, and [`controls::apply`] and [`input::handle_event`] feed
//! messages and raw events back into the player.
//!
//! - [`controls`] - Controls overlay, spoiler and hotkey toasts
//! - [`input`] - Keyboard, mouse and touch event mapping

pub mod controls;
pub mod input;
