// SPDX-License-Identifier: MPL-2.0
//! Persisted player settings (last used volume and mute state).
//!
//! The store is process-wide: every player reads it when it mounts and writes
//! to it whenever the user settles a volume or mute change. The record is a
//! flat `{ volume, muted }` map stored in CBOR under a single namespaced key,
//! next to whatever else the host keeps in the same state file.
//!
//! Persistence is best-effort. Missing or malformed data reads as the
//! defaults (volume `0.5`, not muted) and failed writes are logged and
//! dropped; playback never depends on the disk.

use crate::config::{DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME};
use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::rc::Rc;

/// Key under which the record lives inside the state file.
pub const NAMESPACE: &str = "player_settings";

/// State file name within the app data directory.
const STATE_FILE: &str = "state.cbor";

/// The persisted record. Fields are optional so that absent keys stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub muted: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Volume,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Bool(bool),
}

/// Durable storage behind the settings store.
pub trait SettingsBackend {
    /// Reads the record. `Ok(None)` means nothing was stored yet.
    fn load(&self) -> Result<Option<PersistedSettings>>;

    /// Writes the whole record.
    fn save(&mut self, settings: &PersistedSettings) -> Result<()>;
}

/// Backend writing a namespaced CBOR map to the app data directory.
#[derive(Debug, Clone)]
pub struct CborFileBackend {
    path: PathBuf,
}

impl CborFileBackend {
    /// Uses `state.cbor` in the default data directory.
    pub fn new() -> Option<Self> {
        Self::in_dir(None)
    }

    /// Uses `state.cbor` in `base_dir`, or the default data directory when `None`.
    pub fn in_dir(base_dir: Option<PathBuf>) -> Option<Self> {
        paths::get_app_data_dir_with_override(base_dir).map(|mut path| {
            path.push(STATE_FILE);
            Self { path }
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, ciborium::Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let file = fs::File::open(&self.path)?;
        ciborium::from_reader(BufReader::new(file)).map_err(|err| Error::Settings(err.to_string()))
    }
}

impl SettingsBackend for CborFileBackend {
    fn load(&self) -> Result<Option<PersistedSettings>> {
        let map = self.read_map()?;
        match map.get(NAMESPACE) {
            Some(value) => value
                .deserialized()
                .map(Some)
                .map_err(|err| Error::Settings(err.to_string())),
            None => Ok(None),
        }
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<()> {
        // Other namespaces survive; an unreadable file is replaced.
        let mut map = self.read_map().unwrap_or_default();
        let value = ciborium::Value::serialized(settings)
            .map_err(|err| Error::Settings(err.to_string()))?;
        map.insert(NAMESPACE.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        ciborium::into_writer(&map, BufWriter::new(file))
            .map_err(|err| Error::Settings(err.to_string()))
    }
}

/// Volatile backend for hosts without durable storage, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    stored: Rc<RefCell<Option<PersistedSettings>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(settings: PersistedSettings) -> Self {
        Self {
            stored: Rc::new(RefCell::new(Some(settings))),
        }
    }

    /// What has been written so far.
    #[must_use]
    pub fn stored(&self) -> Option<PersistedSettings> {
        self.stored.borrow().clone()
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> Result<Option<PersistedSettings>> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<()> {
        *self.stored.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

/// Key/value store for the player settings record.
pub struct PlayerSettings {
    backend: Box<dyn SettingsBackend>,
    record: PersistedSettings,
}

/// Handle shared by every player of the process.
pub type SharedSettings = Rc<RefCell<PlayerSettings>>;

impl PlayerSettings {
    /// Reads the record from `backend`. Read failures degrade to defaults.
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        let record = match backend.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "player settings unreadable, using defaults");
                PersistedSettings::default()
            }
        };
        Self {
            backend: Box::new(backend),
            record,
        }
    }

    /// Store without durable backing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    #[must_use]
    pub fn shared(self) -> SharedSettings {
        Rc::new(RefCell::new(self))
    }

    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<SettingValue> {
        match key {
            SettingKey::Volume => self.record.volume.map(SettingValue::Number),
            SettingKey::Muted => self.record.muted.map(SettingValue::Bool),
        }
    }

    /// Stores `value` under `key` and writes the record. Mismatched value
    /// types are ignored.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) {
        match (key, value) {
            (SettingKey::Volume, SettingValue::Number(volume)) => self.record.volume = Some(volume),
            (SettingKey::Muted, SettingValue::Bool(muted)) => self.record.muted = Some(muted),
            _ => {
                tracing::debug!(?key, ?value, "ignoring mistyped player setting");
                return;
            }
        }
        self.flush();
    }

    /// Stores both fields with a single write.
    pub fn persist_volume(&mut self, volume: f64, muted: bool) {
        self.record.volume = Some(volume);
        self.record.muted = Some(muted);
        self.flush();
    }

    /// Stored volume, or the default when absent or out of range.
    #[must_use]
    pub fn volume(&self) -> f64 {
        match self.record.volume {
            Some(volume) if volume.is_finite() && (MIN_VOLUME..=MAX_VOLUME).contains(&volume) => {
                volume
            }
            _ => DEFAULT_VOLUME,
        }
    }

    /// Stored mute state, or `false` when absent.
    #[must_use]
    pub fn muted(&self) -> bool {
        self.record.muted.unwrap_or(false)
    }

    fn flush(&mut self) {
        if let Err(err) = self.backend.save(&self.record) {
            tracing::warn!(error = %err, "failed to persist player settings");
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::in_memory()
    }
}
