// SPDX-License-Identifier: MPL-2.0
//! User actions recorded for bug reports.

use super::buffer::CircularBuffer;
use crate::config::ACTION_LOG_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// User-initiated player actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    /// Play/pause toggle. `playing` is the state requested.
    TogglePlayback { playing: bool },

    /// Seek to a position in seconds.
    Seek { position_secs: f64 },

    SetVolume { volume: f64 },

    ToggleMute { muted: bool },

    ToggleFullscreen { fullscreen: bool },

    /// Sensitive content shown or hidden.
    Reveal { revealed: bool },

    /// Playback handed to picture-in-picture.
    HandOff { position_secs: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub at: Instant,
    pub action: UserAction,
}

/// Exported form with a timestamp relative to the log's creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerializableAction {
    pub timestamp_ms: u64,
    #[serde(flatten)]
    pub action: UserAction,
}

/// Bounded log of the most recent user actions.
#[derive(Debug, Clone)]
pub struct ActionLog {
    started_at: Instant,
    records: CircularBuffer<ActionRecord>,
}

impl ActionLog {
    #[must_use]
    pub fn new(started_at: Instant) -> Self {
        Self::with_capacity(started_at, ACTION_LOG_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(started_at: Instant, capacity: usize) -> Self {
        Self {
            started_at,
            records: CircularBuffer::new(capacity),
        }
    }

    pub fn record(&mut self, action: UserAction, at: Instant) {
        tracing::debug!(?action, "user action");
        self.records.push(ActionRecord { at, action });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&UserAction> {
        self.records.last().map(|record| &record.action)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn to_serializable(&self) -> Vec<SerializableAction> {
        self.records
            .iter()
            .map(|record| SerializableAction {
                timestamp_ms: u64::try_from(
                    record.at.saturating_duration_since(self.started_at).as_millis(),
                )
                .unwrap_or(u64::MAX),
                action: record.action.clone(),
            })
            .collect()
    }

    /// Pretty JSON array of the recorded actions.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_serializable())
    }
}
