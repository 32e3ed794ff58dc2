//! The `Filter` trait and the fragment pair every formatter returns.

use reelcut_common::error::{ReelcutResult, StreamKind};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

/// Bare filter expressions for one operation, without pad tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    pub audio: Option<String>,
    pub video: Option<String>,
}

impl FilterOutput {
    pub fn audio(expr: impl Into<String>) -> Self {
        Self {
            audio: Some(expr.into()),
            video: None,
        }
    }

    pub fn video(expr: impl Into<String>) -> Self {
        Self {
            audio: None,
            video: Some(expr.into()),
        }
    }

    pub fn both(audio: impl Into<String>, video: impl Into<String>) -> Self {
        Self {
            audio: Some(audio.into()),
            video: Some(video.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }
}

/// Restrict a dual-stream filter to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSelect {
    Audio,
    Video,
}

/// Which streams a filter acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// Requires an audio stream.
    Audio,
    /// Requires a video stream.
    Video,
    /// Applies to every present stream, or only the selected one.
    Each(Option<StreamSelect>),
}

impl FilterTarget {
    /// The stream a missing-stream error should name.
    pub fn required_stream(self) -> StreamKind {
        match self {
            FilterTarget::Audio | FilterTarget::Each(Some(StreamSelect::Audio)) => {
                StreamKind::Audio
            }
            FilterTarget::Video | FilterTarget::Each(Some(StreamSelect::Video)) => {
                StreamKind::Video
            }
            FilterTarget::Each(None) => StreamKind::Any,
        }
    }

    pub fn wants_audio(self) -> bool {
        !matches!(
            self,
            FilterTarget::Video | FilterTarget::Each(Some(StreamSelect::Video))
        )
    }

    pub fn wants_video(self) -> bool {
        !matches!(
            self,
            FilterTarget::Audio | FilterTarget::Each(Some(StreamSelect::Audio))
        )
    }
}

/// A single-source filter: typed options, validation, and a pure formatter.
pub trait Filter {
    /// Name used in validation and missing-stream errors.
    fn name(&self) -> &'static str;

    fn target(&self) -> FilterTarget;

    fn validate(&self) -> ReelcutResult<()> {
        Ok(())
    }

    /// Format the filter against the primary source's summary.
    fn build(&self, source: &StreamSummary) -> FilterOutput;

    /// Whether the filter bounds the timeline. A trimmed still-image export
    /// gets no synthesized duration.
    fn bounds_timeline(&self) -> bool {
        false
    }
}
