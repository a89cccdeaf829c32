// SPDX-License-Identifier: MPL-2.0
//! Declarative inputs of a player and the payloads it hands back.

use crate::config::{Config, DisplayMedia};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Type tag passed with a picture-in-picture hand-off.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Display colors of an audio player, as CSS hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioColors {
    pub background: String,
    pub foreground: String,
    pub accent: String,
}

impl Default for AudioColors {
    fn default() -> Self {
        Self {
            background: "#000000".to_string(),
            foreground: "#ffffff".to_string(),
            accent: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProps {
    pub src: String,
    pub kind: MediaKind,
    /// Preview image (video) or cover art (audio).
    pub poster: Option<String>,
    /// `"N"` or `"N/D"`, defaulting to 25 fps when absent or malformed.
    pub frame_rate: Option<String>,
    pub alt: Option<String>,
    pub sensitive: bool,
    /// Externally owned reveal state. Overrides the display preference.
    pub visible: Option<bool>,
    pub detailed: bool,
    pub editable: bool,
    pub always_visible: bool,
    pub start_time: Option<f64>,
    pub start_volume: Option<f64>,
    pub start_muted: Option<bool>,
    /// Play as soon as the element can play through.
    pub start_playing: bool,
    pub colors: AudioColors,
    pub display_media: DisplayMedia,
    /// Paint the blurred preview behind hidden media.
    pub use_blurhash: bool,
    pub visualizer_bands: usize,
}

impl PlayerProps {
    #[must_use]
    pub fn video(src: impl Into<String>) -> Self {
        Self::new(src, MediaKind::Video)
    }

    #[must_use]
    pub fn audio(src: impl Into<String>) -> Self {
        Self::new(src, MediaKind::Audio)
    }

    fn new(src: impl Into<String>, kind: MediaKind) -> Self {
        let config = Config::default();
        Self {
            src: src.into(),
            kind,
            poster: None,
            frame_rate: None,
            alt: None,
            sensitive: false,
            visible: None,
            detailed: false,
            editable: false,
            always_visible: false,
            start_time: None,
            start_volume: None,
            start_muted: None,
            start_playing: false,
            colors: AudioColors::default(),
            display_media: config.display_media(),
            use_blurhash: config.use_blurhash.unwrap_or(true),
            visualizer_bands: config.visualizer_bands(),
        }
    }

    /// Takes the display preferences and band count from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.display_media = config.display_media();
        self.use_blurhash = config.use_blurhash.unwrap_or(true);
        self.visualizer_bands = config.visualizer_bands();
        self
    }

    #[must_use]
    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    #[must_use]
    pub fn with_frame_rate(mut self, rate: impl Into<String>) -> Self {
        self.frame_rate = Some(rate.into());
        self
    }

    #[must_use]
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: Option<bool>) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    #[must_use]
    pub fn with_start(mut self, time: Option<f64>, volume: Option<f64>, muted: Option<bool>) -> Self {
        self.start_time = time;
        self.start_volume = volume;
        self.start_muted = muted;
        self
    }

    #[must_use]
    pub fn start_playing(mut self, start_playing: bool) -> Self {
        self.start_playing = start_playing;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: AudioColors) -> Self {
        self.colors = colors;
        self
    }

    /// Initial reveal state: the explicit prop, else the display preference.
    #[must_use]
    pub fn initially_revealed(&self) -> bool {
        self.visible
            .unwrap_or_else(|| self.display_media.reveals(self.sensitive))
    }
}

/// Playback context carried to picture-in-picture.
#[derive(Debug, Clone, PartialEq)]
pub struct HandOff {
    pub kind: MediaKind,
    pub src: String,
    pub current_time: f64,
    pub muted: bool,
    pub volume: f64,
    /// Audio only.
    pub poster: Option<String>,
    /// Audio only.
    pub colors: Option<AudioColors>,
}

/// Payload of the expand-to-modal request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenVideoOptions {
    pub start_time: f64,
    /// Whether the player was playing when expanded.
    pub autoplay: bool,
    pub default_volume: f64,
}

type Callback<T> = Option<Box<dyn FnMut(T)>>;

/// Hooks into the surrounding application. All optional.
#[derive(Default)]
pub struct PlayerCallbacks {
    pub on_open_video: Callback<OpenVideoOptions>,
    pub on_close_video: Callback<()>,
    pub on_toggle_visibility: Callback<()>,
    pub deploy_picture_in_picture: Callback<HandOff>,
}

impl std::fmt::Debug for PlayerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerCallbacks")
            .field("on_open_video", &self.on_open_video.is_some())
            .field("on_close_video", &self.on_close_video.is_some())
            .field("on_toggle_visibility", &self.on_toggle_visibility.is_some())
            .field("deploy_picture_in_picture", &self.deploy_picture_in_picture.is_some())
            .finish()
    }
}

impl PlayerCallbacks {
    #[must_use]
    pub fn on_open_video(mut self, f: impl FnMut(OpenVideoOptions) + 'static) -> Self {
        self.on_open_video = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_close_video(mut self, mut f: impl FnMut() + 'static) -> Self {
        self.on_close_video = Some(Box::new(move |()| f()));
        self
    }

    #[must_use]
    pub fn on_toggle_visibility(mut self, mut f: impl FnMut() + 'static) -> Self {
        self.on_toggle_visibility = Some(Box::new(move |()| f()));
        self
    }

    #[must_use]
    pub fn deploy_picture_in_picture(mut self, f: impl FnMut(HandOff) + 'static) -> Self {
        self.deploy_picture_in_picture = Some(Box::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_defaults_follow_display_preference() {
        let props = PlayerProps::video("a.mp4").sensitive(true);
        assert!(!props.initially_revealed());

        let mut show_all = props.clone();
        show_all.display_media = DisplayMedia::ShowAll;
        assert!(show_all.initially_revealed());

        let mut hide_all = PlayerProps::video("a.mp4");
        hide_all.display_media = DisplayMedia::HideAll;
        assert!(!hide_all.initially_revealed());
    }

    #[test]
    fn explicit_visibility_wins() {
        let props = PlayerProps::video("a.mp4")
            .sensitive(true)
            .with_visible(Some(true));
        assert!(props.initially_revealed());
    }

    #[test]
    fn audio_colors_default_to_black_and_white() {
        let colors = AudioColors::default();
        assert_eq!(colors.background, "#000000");
        assert_eq!(colors.foreground, "#ffffff");
        assert_eq!(colors.accent, "#ffffff");
        assert_eq!(MediaKind::Audio.as_str(), "audio");
    }
}
