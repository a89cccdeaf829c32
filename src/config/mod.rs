// SPDX-License-Identifier: MPL-2.0
//! This module handles the player's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! Volume and mute are *not* part of this file: they change on every slider
//! gesture and live in the binary player-settings store instead
//! (see [`crate::player::settings`]).
//!
//! # Examples
//!
//! ```no_run
//! use inline_player::config::{self, Config, DisplayMedia};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.display_media = Some(DisplayMedia::ShowAll);
//! config::save(&config).expect("Failed to save config");
//! ```

mod defaults;

pub use defaults::*;

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

/// Global preference deciding whether media starts revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMedia {
    /// Sensitive media is hidden, everything else is shown.
    #[default]
    Default,
    /// Everything is shown, including sensitive media.
    ShowAll,
    /// Everything is hidden behind a content warning.
    HideAll,
}

impl DisplayMedia {
    /// Resolves the initial reveal state of a player.
    #[must_use]
    pub fn reveals(self, sensitive: bool) -> bool {
        match self {
            DisplayMedia::ShowAll => true,
            DisplayMedia::HideAll => false,
            DisplayMedia::Default => !sensitive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display_media: Option<DisplayMedia>,
    #[serde(default)]
    pub use_blurhash: Option<bool>,
    #[serde(default)]
    pub visualizer_bands: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_media: Some(DisplayMedia::Default),
            use_blurhash: Some(true),
            visualizer_bands: Some(DEFAULT_VISUALIZER_BANDS),
        }
    }
}

impl Config {
    #[must_use]
    pub fn display_media(&self) -> DisplayMedia {
        self.display_media.unwrap_or_default()
    }

    /// Band count clamped to `1..=MAX_VISUALIZER_BANDS`.
    #[must_use]
    pub fn visualizer_bands(&self) -> usize {
        self.visualizer_bands
            .unwrap_or(DEFAULT_VISUALIZER_BANDS)
            .clamp(1, MAX_VISUALIZER_BANDS)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "invalid settings.toml, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
