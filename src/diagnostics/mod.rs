// SPDX-License-Identifier: MPL-2.0
//! In-memory action log for bug reports.
//!
//! Each player records the user actions it handles into a bounded
//! [`CircularBuffer`]. Hosts export the log as JSON when a user files a
//! report; nothing is written anywhere on its own.

mod actions;
mod buffer;

pub use actions::{ActionLog, ActionRecord, SerializableAction, UserAction};
pub use buffer::CircularBuffer;
