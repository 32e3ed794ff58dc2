//! Time-domain filters: trim, fade, speed, reverse, delay.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget, StreamSelect};
use crate::param::{check_above, check_min, check_range, exclusive, fmt_num, quote_str, require_any, Param};

/// Cut a time range. Numbers are seconds; strings are engine timestamps
/// (`00:01:30.5`). `end` and `duration` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trim {
    pub start: Option<Param>,
    pub end: Option<Param>,
    pub duration: Option<Param>,
    pub stream: Option<StreamSelect>,
}

impl Trim {
    pub fn between(start: impl Into<Param>, end: impl Into<Param>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn starting_for(start: impl Into<Param>, duration: impl Into<Param>) -> Self {
        Self {
            start: Some(start.into()),
            duration: Some(duration.into()),
            ..Self::default()
        }
    }

    fn params(&self) -> String {
        let mut params = Vec::new();
        if let Some(start) = &self.start {
            params.push(format!("start={}", start.quoted()));
        }
        if let Some(end) = &self.end {
            params.push(format!("end={}", end.quoted()));
        }
        if let Some(duration) = &self.duration {
            params.push(format!("duration={}", duration.quoted()));
        }
        params.join(":")
    }
}

impl Filter for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn bounds_timeline(&self) -> bool {
        true
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Each(self.stream)
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        require_any(
            name,
            &[
                self.start.is_some(),
                self.end.is_some(),
                self.duration.is_some(),
            ],
            "start, end, duration",
        )?;
        exclusive(
            name,
            ("end", self.end.is_some()),
            ("duration", self.duration.is_some()),
        )?;
        if let Some(start) = self.start.as_ref().and_then(Param::as_num) {
            check_min(name, "start", start, 0.0)?;
        }
        if let Some(end) = self.end.as_ref().and_then(Param::as_num) {
            check_above(name, "end", end, 0.0)?;
            if let Some(start) = self.start.as_ref().and_then(Param::as_num) {
                if end <= start {
                    return Err(ReelcutError::validation(
                        name,
                        format!("end ({}) must be after start ({})", fmt_num(end), fmt_num(start)),
                    ));
                }
            }
        }
        if let Some(duration) = self.duration.as_ref().and_then(Param::as_num) {
            check_above(name, "duration", duration, 0.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let params = self.params();
        FilterOutput::both(
            format!("atrim={params},asetpts=PTS-STARTPTS"),
            format!("trim={params},setpts=PTS-STARTPTS"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeKind {
    In,
    Out,
}

impl FadeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FadeKind::In => "in",
            FadeKind::Out => "out",
        }
    }
}

/// Audio fade curve names accepted by `afade`.
pub const FADE_CURVES: &[&str] = &[
    "tri", "qsin", "hsin", "esin", "log", "ipar", "qua", "cub", "squ", "cbr", "par", "exp",
    "iqsin", "ihsin", "dese", "desi", "losi", "sinc", "isinc", "quat", "quatr", "qsin2", "hsin2",
    "nofade",
];

/// Fade in or out. Video fades to transparency unless a color is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fade {
    #[serde(rename = "type")]
    pub kind: FadeKind,
    pub duration: f64,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub curve: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stream: Option<StreamSelect>,
}

impl Fade {
    pub fn new(kind: FadeKind, start: f64, duration: f64) -> Self {
        Self {
            kind,
            duration,
            start,
            curve: None,
            color: None,
            stream: None,
        }
    }
}

impl Filter for Fade {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Each(self.stream)
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_min(self.name(), "duration", self.duration, 0.1)?;
        check_min(self.name(), "start", self.start, 0.0)?;
        if let Some(curve) = &self.curve {
            if !FADE_CURVES.contains(&curve.as_str()) {
                return Err(ReelcutError::validation(
                    self.name(),
                    format!("unknown fade curve {curve:?}"),
                ));
            }
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let timing = format!(
            "t={}:st={}:d={}",
            self.kind.as_str(),
            fmt_num(self.start),
            fmt_num(self.duration)
        );

        let mut audio = format!("afade={timing}");
        if let Some(curve) = &self.curve {
            audio.push_str(&format!(":curve={curve}"));
        }

        let mut video = format!("format=yuva420p,fade={timing}");
        match &self.color {
            Some(color) => video.push_str(&format!(":c={}", quote_str(color))),
            None => video.push_str(":alpha=1"),
        }

        FilterOutput::both(audio, video)
    }
}

/// Playback speed factor. Negative factors also play backwards; a factor
/// of exactly 1 or -1 leaves the speed untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub factor: f64,
}

impl Filter for Speed {
    fn name(&self) -> &'static str {
        "speed"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Each(None)
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_range(self.name(), "|factor|", self.factor.abs(), 0.1, 100.0)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let factor = self.factor.abs();
        let mut audio = Vec::new();
        let mut video = Vec::new();

        if self.factor < 0.0 {
            audio.push("areverse".to_string());
            video.push("reverse".to_string());
        }
        if factor != 1.0 {
            audio.push(atempo_chain(factor));
            video.push(format!("setpts=PTS/{}", fmt_num(factor)));
        }

        if video.is_empty() {
            return FilterOutput::default();
        }
        FilterOutput::both(audio.join(","), video.join(","))
    }
}

/// Decompose a tempo factor into `atempo` steps, each within [0.5, 2].
fn atempo_chain(factor: f64) -> String {
    if (0.5..=2.0).contains(&factor) {
        return format!("atempo={}", fmt_num(factor));
    }

    let mut steps = Vec::new();
    let mut rest = factor;
    while rest > 2.0 {
        steps.push("atempo=2".to_string());
        rest /= 2.0;
    }
    while rest < 0.5 {
        steps.push("atempo=0.5".to_string());
        rest *= 2.0;
    }
    let rest = (rest * 100.0).round() / 100.0;
    steps.push(format!("atempo={}", fmt_num(rest)));
    steps.join(",")
}

/// Play backwards. Buffers the whole stream in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reverse {
    pub stream: Option<StreamSelect>,
}

impl Filter for Reverse {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Each(self.stream)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::both("areverse", "reverse")
    }
}

/// Shift the start by padding silence and transparent frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub seconds: f64,
    #[serde(default)]
    pub stream: Option<StreamSelect>,
}

impl Filter for Delay {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Each(self.stream)
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_above(self.name(), "seconds", self.seconds, 0.0)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let secs = fmt_num(self.seconds);
        FilterOutput::both(
            format!("adelay=delays={secs}s:all=1"),
            format!("tpad=start_duration={secs}:color=0x00000000"),
        )
    }
}
