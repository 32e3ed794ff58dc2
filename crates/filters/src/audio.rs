//! Audio-only filters: gain, loudness normalization, pitch, channel panning.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{check_range, fmt_num, join_options, require_any, Param};

/// Sample rate assumed when the source does not report one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// When the volume expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeEval {
    Once,
    Frame,
}

/// Gain as a factor (`0.5`), a decibel string (`"-6dB"`), or an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume: Param,
    #[serde(default)]
    pub eval: Option<VolumeEval>,
}

impl Volume {
    pub fn new(volume: impl Into<Param>) -> Self {
        Self {
            volume: volume.into(),
            eval: None,
        }
    }
}

impl Filter for Volume {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        match &self.volume {
            Param::Num(value) if !value.is_finite() || *value < 0.0 => Err(
                ReelcutError::validation(self.name(), "volume factor must be a non-negative number"),
            ),
            Param::Expr(expr) if expr.trim().is_empty() => Err(ReelcutError::validation(
                self.name(),
                "volume expression must not be empty",
            )),
            _ => Ok(()),
        }
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = format!("volume={}", self.volume.quoted());
        match self.eval {
            Some(VolumeEval::Once) => expr.push_str(":eval=once"),
            Some(VolumeEval::Frame) => expr.push_str(":eval=frame"),
            None => {}
        }
        FilterOutput::audio(expr)
    }
}

/// EBU R128 loudness normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Loudnorm {
    /// Integrated loudness target (LUFS).
    pub integrated: f64,
    /// Loudness range target (LU).
    pub range: f64,
    /// Maximum true peak (dBTP).
    pub true_peak: f64,
    pub linear: bool,
}

impl Default for Loudnorm {
    fn default() -> Self {
        Self {
            integrated: -23.0,
            range: 9.0,
            true_peak: -1.0,
            linear: false,
        }
    }
}

impl Filter for Loudnorm {
    fn name(&self) -> &'static str {
        "loudnorm"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_range(self.name(), "integrated", self.integrated, -70.0, -5.0)?;
        check_range(self.name(), "range", self.range, 1.0, 50.0)?;
        check_range(self.name(), "truePeak", self.true_peak, -9.0, 0.0)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = format!(
            "loudnorm=I={}:LRA={}:TP={}",
            fmt_num(self.integrated),
            fmt_num(self.range),
            fmt_num(self.true_peak)
        );
        if self.linear {
            expr.push_str(":linear=true");
        }
        FilterOutput::audio(expr)
    }
}

/// Dynamic audio normalizer. Unset fields keep the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dynaudnorm {
    /// Frame length in milliseconds.
    pub frame_length: Option<u32>,
    /// Gaussian window size in frames; must be odd.
    pub gauss_size: Option<u32>,
    pub peak: Option<f64>,
    pub max_gain: Option<f64>,
    pub target_rms: Option<f64>,
    pub compress: Option<f64>,
    pub threshold: Option<f64>,
}

impl Filter for Dynaudnorm {
    fn name(&self) -> &'static str {
        "dynaudnorm"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        require_any(
            name,
            &[
                self.frame_length.is_some(),
                self.gauss_size.is_some(),
                self.peak.is_some(),
                self.max_gain.is_some(),
                self.target_rms.is_some(),
                self.compress.is_some(),
                self.threshold.is_some(),
            ],
            "frameLength, gaussSize, peak, maxGain, targetRms, compress, threshold",
        )?;
        if let Some(frame_length) = self.frame_length {
            check_range(name, "frameLength", f64::from(frame_length), 10.0, 8000.0)?;
        }
        if let Some(gauss) = self.gauss_size {
            check_range(name, "gaussSize", f64::from(gauss), 3.0, 301.0)?;
            if gauss % 2 == 0 {
                return Err(ReelcutError::validation(
                    name,
                    format!("gaussSize must be odd (got {gauss})"),
                ));
            }
        }
        if let Some(peak) = self.peak {
            check_range(name, "peak", peak, 0.0, 1.0)?;
        }
        if let Some(max_gain) = self.max_gain {
            check_range(name, "maxGain", max_gain, 1.0, 100.0)?;
        }
        if let Some(rms) = self.target_rms {
            check_range(name, "targetRms", rms, 0.0, 1.0)?;
        }
        if let Some(compress) = self.compress {
            check_range(name, "compress", compress, 1.0, 30.0)?;
        }
        if let Some(threshold) = self.threshold {
            check_range(name, "threshold", threshold, 0.0, 1.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let params = join_options(&[
            ("f", self.frame_length.map(|v| v.to_string())),
            ("g", self.gauss_size.map(|v| v.to_string())),
            ("p", self.peak.map(fmt_num)),
            ("m", self.max_gain.map(fmt_num)),
            ("r", self.target_rms.map(fmt_num)),
            ("s", self.compress.map(fmt_num)),
            ("t", self.threshold.map(fmt_num)),
        ]);
        FilterOutput::audio(format!("dynaudnorm={params}"))
    }
}

/// Pitch shift that keeps the playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub factor: f64,
}

impl Filter for Pitch {
    fn name(&self) -> &'static str {
        "pitch"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_range(self.name(), "factor", self.factor, 0.125, 8.0)
    }

    fn build(&self, source: &StreamSummary) -> FilterOutput {
        let rate = source.audio_sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        FilterOutput::audio(format!(
            "asetrate={rate}*{},aresample={rate},atempo={}",
            fmt_num(self.factor),
            fmt_num(1.0 / self.factor)
        ))
    }
}

/// Output channel layout for `pan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    #[serde(rename = "mono")]
    Mono,
    #[serde(rename = "stereo")]
    Stereo,
    #[serde(rename = "5.1")]
    Surround51,
    #[serde(rename = "7.1")]
    Surround71,
}

impl ChannelLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelLayout::Mono => "mono",
            ChannelLayout::Stereo => "stereo",
            ChannelLayout::Surround51 => "5.1",
            ChannelLayout::Surround71 => "7.1",
        }
    }

    pub fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
            ChannelLayout::Surround51 => 6,
            ChannelLayout::Surround71 => 8,
        }
    }
}

/// Remix channels. A numeric entry scales the same input channel; an
/// expression entry is used verbatim (`0.5*c0+0.5*c1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub layout: ChannelLayout,
    pub channels: Vec<Param>,
}

impl Filter for Pan {
    fn name(&self) -> &'static str {
        "pan"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Audio
    }

    fn validate(&self) -> ReelcutResult<()> {
        if self.channels.is_empty() {
            return Err(ReelcutError::validation(
                self.name(),
                "at least one channel gain must be given",
            ));
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = format!("pan={}", self.layout.as_str());
        for (index, channel) in self
            .channels
            .iter()
            .take(self.layout.channel_count())
            .enumerate()
        {
            match channel {
                Param::Num(gain) => {
                    expr.push_str(&format!("|c{index}='{}*c{index}'", fmt_num(*gain)))
                }
                Param::Expr(mix) => expr.push_str(&format!("|c{index}='{mix}'")),
            }
        }
        FilterOutput::audio(expr)
    }
}
