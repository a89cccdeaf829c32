// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Settings(String),
    Media(MediaError),
}

/// Failures reported by a media element.
///
/// None of these escape the player: they are logged and the player stays
/// paused with its controls visible. The message id lets the host show a
/// localized hint.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaError {
    /// Element has no metadata yet (duration unknown).
    NotReady,

    /// The element refused to start, e.g. autoplay policy without a gesture.
    PlayRejected(String),

    /// The media data could not be decoded.
    Decode(String),

    /// Fetching the media stalled or failed.
    Network(String),

    /// The browser lacks the capability (fullscreen, audio graph, codec).
    Unsupported(String),
}

impl MediaError {
    /// Returns the message id for this error type.
    pub fn message_id(&self) -> &'static str {
        match self {
            MediaError::NotReady => "video.error.not_ready",
            MediaError::PlayRejected(_) => "video.error.play_rejected",
            MediaError::Decode(_) => "video.error.decode",
            MediaError::Network(_) => "video.error.network",
            MediaError::Unsupported(_) => "video.error.unsupported",
        }
    }

    /// Transient errors clear themselves once the element recovers.
    pub fn is_transient(&self) -> bool {
        matches!(self, MediaError::Network(_) | MediaError::NotReady)
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::NotReady => write!(f, "Media is not ready"),
            MediaError::PlayRejected(msg) => write!(f, "Playback was rejected: {}", msg),
            MediaError::Decode(msg) => write!(f, "Decoding failed: {}", msg),
            MediaError::Network(msg) => write!(f, "Network error: {}", msg),
            MediaError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Settings(e) => write!(f, "Settings Error: {}", e),
            Error::Media(e) => write!(f, "Media Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<MediaError> for Error {
    fn from(err: MediaError) -> Self {
        Error::Media(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
