//! Media sources and their cached stream summaries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use reelcut_common::error::{ReelcutError, ReelcutResult};
use serde::{Deserialize, Serialize};

/// Kind of a registered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Image,
    Video,
}

impl MediaType {
    /// Classify a source from its probe summary.
    ///
    /// A visual stream with at most one frame, or without a duration, is a
    /// still image. A single frame counts as a still because image demuxers
    /// report a one-frame duration (`0.04` at 25 fps) for png and jpeg.
    pub fn from_summary(summary: &StreamSummary) -> ReelcutResult<Self> {
        if summary.has_audio && !summary.has_video {
            return Ok(MediaType::Audio);
        }
        if !summary.has_video {
            return Err(ReelcutError::metadata("No video or audio stream found"));
        }
        let single_frame = summary
            .estimated_frame_count()
            .map_or(true, |count| count <= 1);
        let no_duration = summary.duration.map_or(true, |secs| secs <= 0.0);
        if single_frame || no_duration {
            return Ok(MediaType::Image);
        }
        Ok(MediaType::Video)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// Reduced probe result for one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub has_audio: bool,
    pub has_video: bool,

    /// Container duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,

    /// File size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    /// Overall bitrate in bits per second.
    #[serde(default)]
    pub bit_rate: Option<u64>,

    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    /// Display aspect ratio as reported (e.g. `16:9`).
    #[serde(default)]
    pub aspect_ratio: Option<String>,

    #[serde(default)]
    pub frame_count: Option<u64>,

    /// Frames per second.
    #[serde(default)]
    pub frame_rate: Option<f64>,

    #[serde(default)]
    pub audio_channels: Option<u32>,

    /// Audio sample rate in Hz.
    #[serde(default)]
    pub audio_sample_rate: Option<u32>,

    #[serde(default)]
    pub format_name: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StreamSummary {
    /// Reported frame count, or one estimated from duration and frame rate.
    /// Matroska and WebM never report `nb_frames`.
    pub fn estimated_frame_count(&self) -> Option<u64> {
        self.frame_count.or_else(|| {
            let secs = self.duration.filter(|secs| *secs > 0.0)?;
            let rate = self
                .frame_rate
                .filter(|rate| rate.is_finite() && *rate > 0.0)?;
            Some((secs * rate).round() as u64)
        })
    }

    /// Summary for an audio-only source.
    pub fn audio(duration: f64, sample_rate: u32) -> Self {
        Self {
            has_audio: true,
            duration: Some(duration),
            audio_channels: Some(2),
            audio_sample_rate: Some(sample_rate),
            ..Self::default()
        }
    }

    /// Summary for a still image.
    pub fn image(width: u32, height: u32) -> Self {
        Self {
            has_video: true,
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Summary for a video source, optionally with an audio track.
    pub fn video(width: u32, height: u32, duration: f64, frame_rate: f64, with_audio: bool) -> Self {
        Self {
            has_audio: with_audio,
            has_video: true,
            duration: Some(duration),
            width: Some(width),
            height: Some(height),
            frame_rate: Some(frame_rate),
            frame_count: Some((duration * frame_rate).round() as u64),
            audio_channels: with_audio.then_some(2),
            audio_sample_rate: with_audio.then_some(48_000),
            ..Self::default()
        }
    }
}

/// A registered source: path, detected type, and cached metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInput {
    pub path: PathBuf,
    pub media_type: MediaType,
    pub metadata: StreamSummary,
}

impl MediaInput {
    /// Build an input, classifying it from its summary.
    pub fn from_summary(path: impl Into<PathBuf>, metadata: StreamSummary) -> ReelcutResult<Self> {
        let media_type = MediaType::from_summary(&metadata)?;
        Ok(Self {
            path: path.into(),
            media_type,
            metadata,
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type == MediaType::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_only_is_audio() {
        let summary = StreamSummary::audio(12.0, 44_100);
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Audio);
    }

    #[test]
    fn test_video_without_frames_is_image() {
        let mut summary = StreamSummary::image(640, 480);
        summary.duration = Some(0.04);
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Image);

        summary.frame_count = Some(1);
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Image);
    }

    #[test]
    fn test_video_with_frames_and_duration_is_video() {
        let summary = StreamSummary::video(1920, 1080, 10.0, 30.0, true);
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Video);
        assert_eq!(summary.frame_count, Some(300));
    }

    #[test]
    fn test_missing_frame_count_is_estimated_from_rate() {
        let mut summary = StreamSummary::video(1920, 1080, 120.5, 30.0, true);
        summary.frame_count = None;
        assert_eq!(summary.estimated_frame_count(), Some(3615));
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Video);
    }

    #[test]
    fn test_image_demuxer_single_frame_is_image() {
        let mut summary = StreamSummary::image(1280, 720);
        summary.duration = Some(0.04);
        summary.frame_rate = Some(25.0);
        assert_eq!(summary.estimated_frame_count(), Some(1));
        assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Image);
    }

    #[test]
    fn test_no_streams_is_an_error() {
        let err = MediaType::from_summary(&StreamSummary::default()).unwrap_err();
        assert!(matches!(err, ReelcutError::Metadata { .. }));
    }

    #[test]
    fn test_summary_roundtrip() {
        let summary = StreamSummary::video(1280, 720, 3.5, 25.0, false);
        let json = serde_json::to_string(&summary).unwrap();
        let parsed: StreamSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, parsed);
    }
}
