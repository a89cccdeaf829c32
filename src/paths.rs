// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for player directories.
//!
//! # Path Resolution Order
//!
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **Environment variables** (`INLINE_PLAYER_DATA_DIR`, `INLINE_PLAYER_CONFIG_DIR`)
//! 3. **Platform default** - via `dirs`, with the application name appended

use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "InlinePlayer";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "INLINE_PLAYER_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "INLINE_PLAYER_CONFIG_DIR";

fn from_env(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the data directory holding persisted player settings.
///
/// Returns `None` if the data directory cannot be determined (rare edge case).
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Returns the data directory with an optional override, which takes priority.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path.or_else(|| from_env(ENV_DATA_DIR)).or_else(|| {
        dirs::data_dir().map(|mut path| {
            path.push(APP_NAME);
            path
        })
    })
}

/// Returns the config directory holding `settings.toml`.
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the config directory with an optional override, which takes priority.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path.or_else(|| from_env(ENV_CONFIG_DIR)).or_else(|| {
        dirs::config_dir().map(|mut path| {
            path.push(APP_NAME);
            path
        })
    })
}
