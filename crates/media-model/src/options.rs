//! User-facing output options.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use serde::{Deserialize, Serialize};

/// x264/x265 encoder speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Superfast => "superfast",
            Preset::Veryfast => "veryfast",
            Preset::Faster => "faster",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Slower => "slower",
            Preset::Veryslow => "veryslow",
        }
    }
}

/// Output options for one render. Every field is optional; unset fields are
/// filled by the output policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    /// Audio encoder (`aac`, `libopus`, `copy`, ...).
    pub audio_codec: Option<String>,

    /// Video encoder (`libx264`, `libx265`, `libvpx-vp9`, `copy`, ...).
    pub video_codec: Option<String>,

    /// Output audio channel count.
    pub channels: Option<u8>,

    /// Output frame rate.
    pub fps: Option<f64>,

    /// Audio bitrate (e.g. `128k`).
    pub audio_bitrate: Option<String>,

    /// Video bitrate (e.g. `2M`).
    pub video_bitrate: Option<String>,

    /// Constant rate factor.
    pub crf: Option<u8>,

    pub preset: Option<Preset>,

    /// Output duration in seconds.
    pub duration: Option<f64>,

    /// Stop at the end of the shortest mapped stream. Defaults to true.
    pub shortest: Option<bool>,

    pub pixel_format: Option<String>,

    /// Overwrite an existing output file. Defaults to true.
    pub overwrite: Option<bool>,

    /// Drop audio from the output.
    pub audio_none: Option<bool>,

    /// Drop video from the output.
    pub video_none: Option<bool>,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }

    pub fn video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.audio_bitrate = Some(bitrate.into());
        self
    }

    pub fn video_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.video_bitrate = Some(bitrate.into());
        self
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }

    pub fn shortest(mut self, enabled: bool) -> Self {
        self.shortest = Some(enabled);
        self
    }

    pub fn pixel_format(mut self, format: impl Into<String>) -> Self {
        self.pixel_format = Some(format.into());
        self
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = Some(enabled);
        self
    }

    pub fn without_audio(mut self) -> Self {
        self.audio_none = Some(true);
        self
    }

    pub fn without_video(mut self) -> Self {
        self.video_none = Some(true);
        self
    }

    /// Fill every unset field from `defaults`.
    pub fn merged_over(&self, defaults: &OutputOptions) -> OutputOptions {
        OutputOptions {
            audio_codec: self.audio_codec.clone().or_else(|| defaults.audio_codec.clone()),
            video_codec: self.video_codec.clone().or_else(|| defaults.video_codec.clone()),
            channels: self.channels.or(defaults.channels),
            fps: self.fps.or(defaults.fps),
            audio_bitrate: self
                .audio_bitrate
                .clone()
                .or_else(|| defaults.audio_bitrate.clone()),
            video_bitrate: self
                .video_bitrate
                .clone()
                .or_else(|| defaults.video_bitrate.clone()),
            crf: self.crf.or(defaults.crf),
            preset: self.preset.or(defaults.preset),
            duration: self.duration.or(defaults.duration),
            shortest: self.shortest.or(defaults.shortest),
            pixel_format: self
                .pixel_format
                .clone()
                .or_else(|| defaults.pixel_format.clone()),
            overwrite: self.overwrite.or(defaults.overwrite),
            audio_none: self.audio_none.or(defaults.audio_none),
            video_none: self.video_none.or(defaults.video_none),
        }
    }

    pub fn wants_shortest(&self) -> bool {
        self.shortest.unwrap_or(true)
    }

    pub fn wants_overwrite(&self) -> bool {
        self.overwrite.unwrap_or(true)
    }

    pub fn excludes_audio(&self) -> bool {
        self.audio_none.unwrap_or(false)
    }

    pub fn excludes_video(&self) -> bool {
        self.video_none.unwrap_or(false)
    }

    /// Reject values the engine would refuse.
    pub fn validate(&self) -> ReelcutResult<()> {
        if let Some(channels) = self.channels {
            if !matches!(channels, 1 | 2 | 6 | 8) {
                return Err(ReelcutError::validation(
                    "output",
                    format!("channels must be one of 1, 2, 6, 8 (got {channels})"),
                ));
            }
        }
        if let Some(crf) = self.crf {
            if crf > 63 {
                return Err(ReelcutError::validation(
                    "output",
                    format!("crf must be within 0..=63 (got {crf})"),
                ));
            }
        }
        if let Some(fps) = self.fps {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(ReelcutError::validation("output", "fps must be positive"));
            }
        }
        if let Some(duration) = self.duration {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(ReelcutError::validation(
                    "output",
                    "duration must be positive",
                ));
            }
        }
        if self.excludes_audio() && self.excludes_video() {
            return Err(ReelcutError::config(
                "audio and video cannot both be excluded",
            ));
        }
        Ok(())
    }
}
