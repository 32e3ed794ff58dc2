//! Filters that combine the current stream with a second source.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::draw::Enable;
use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{fmt_num, Param};

/// Draw a second source's video on top of the current video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlay {
    pub x: Param,
    pub y: Param,
    pub enable: Option<Enable>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            x: Param::Num(0.0),
            y: Param::Num(0.0),
            enable: None,
        }
    }
}

impl Overlay {
    pub fn at(x: impl Into<Param>, y: impl Into<Param>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            enable: None,
        }
    }
}

impl Filter for Overlay {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = format!("overlay=x={}:y={}", self.x.quoted(), self.y.quoted());
        if let Some(enable) = &self.enable {
            expr.push(':');
            expr.push_str(&enable.render());
        }
        FilterOutput::video(expr)
    }
}

/// Which input decides the mixed stream's length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixDuration {
    First,
    #[default]
    Longest,
    Shortest,
}

impl MixDuration {
    pub fn as_str(self) -> &'static str {
        match self {
            MixDuration::First => "first",
            MixDuration::Longest => "longest",
            MixDuration::Shortest => "shortest",
        }
    }
}

/// Mix a second source's audio into the current audio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioMix {
    pub duration: MixDuration,
    /// Relative weights of the current and the added stream.
    pub weights: Option<[f64; 2]>,
}

impl Filter for AudioMix {
    fn name(&self) -> &'static str {
        "amix"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        if let Some(weights) = self.weights {
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ReelcutError::validation(
                    self.name(),
                    "weights must be non-negative numbers",
                ));
            }
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = format!("amix=inputs=2:duration={}", self.duration.as_str());
        if let Some([current, added]) = self.weights {
            expr.push_str(&format!(":weights='{} {}'", fmt_num(current), fmt_num(added)));
        }
        FilterOutput::audio(expr)
    }
}
