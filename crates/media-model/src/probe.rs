//! ffprobe JSON report (`-print_format json -show_format -show_streams`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::media::StreamSummary;

/// Top-level ffprobe output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: ProbeFormat,
}

/// One entry of `streams`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub codec_type: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub pix_fmt: Option<String>,
    #[serde(default)]
    pub r_frame_rate: Option<String>,
    #[serde(default)]
    pub display_aspect_ratio: Option<String>,

    #[serde(default)]
    pub sample_rate: Option<String>,
    #[serde(default)]
    pub channels: Option<u32>,

    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub nb_frames: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// The `format` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub nb_streams: u32,
    #[serde(default)]
    pub format_name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ProbeReport {
    /// Parse raw ffprobe JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|stream| stream.codec_type.as_deref() == Some(codec_type))
    }

    /// Reduce the report to the fields the editor needs.
    pub fn summary(&self) -> StreamSummary {
        let video = self.first_stream("video");
        let audio = self.first_stream("audio");

        StreamSummary {
            has_audio: audio.is_some(),
            has_video: video.is_some(),
            duration: self.format.duration.as_deref().and_then(parse_seconds),
            size: self.format.size.as_deref().and_then(parse_integer),
            bit_rate: self.format.bit_rate.as_deref().and_then(parse_integer),
            width: video.and_then(|v| v.width),
            height: video.and_then(|v| v.height),
            aspect_ratio: video.and_then(|v| v.display_aspect_ratio.clone()),
            frame_count: video
                .and_then(|v| v.nb_frames.as_deref())
                .and_then(parse_integer),
            frame_rate: video
                .and_then(|v| v.r_frame_rate.as_deref())
                .and_then(parse_frame_rate),
            audio_channels: audio.and_then(|a| a.channels),
            audio_sample_rate: audio
                .and_then(|a| a.sample_rate.as_deref())
                .and_then(parse_integer)
                .and_then(|rate| u32::try_from(rate).ok()),
            format_name: self.format.format_name.clone(),
            tags: self.format.tags.clone(),
        }
    }
}

/// Parse the leading integer of a numeric string (`"1234.56"` -> 1234).
fn parse_integer(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|secs| secs.is_finite())
}

/// Parse an ffprobe rational like `30000/1001`.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 1920, "height": 1080,
             "r_frame_rate": "30000/1001", "display_aspect_ratio": "16:9", "nb_frames": "300"},
            {"index": 1, "codec_name": "aac", "codec_type": "audio", "sample_rate": "48000", "channels": 2}
        ],
        "format": {"filename": "clip.mp4", "nb_streams": 2, "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                   "duration": "10.010000", "size": "1048576", "bit_rate": "838860",
                   "tags": {"encoder": "Lavf60.3.100"}}
    }"#;

    #[test]
    fn test_summary_from_full_report() {
        let report = ProbeReport::from_json(SAMPLE).unwrap();
        let summary = report.summary();

        assert!(summary.has_audio);
        assert!(summary.has_video);
        assert_eq!(summary.width, Some(1920));
        assert_eq!(summary.height, Some(1080));
        assert_eq!(summary.frame_count, Some(300));
        assert_eq!(summary.audio_sample_rate, Some(48_000));
        assert_eq!(summary.size, Some(1_048_576));
        assert!((summary.duration.unwrap() - 10.01).abs() < 1e-9);
        assert!((summary.frame_rate.unwrap() - 29.97).abs() < 0.01);
        assert_eq!(summary.tags.get("encoder").map(String::as_str), Some("Lavf60.3.100"));
    }

    #[test]
    fn test_still_image_report_has_no_duration() {
        let report = ProbeReport::from_json(
            r#"{"streams":[{"codec_type":"video","width":800,"height":600,"r_frame_rate":"25/1"}],
                "format":{"filename":"a.png","format_name":"png_pipe"}}"#,
        )
        .unwrap();
        let summary = report.summary();
        assert!(summary.has_video);
        assert!(!summary.has_audio);
        assert_eq!(summary.duration, None);
        assert_eq!(summary.frame_count, None);
    }

    #[test]
    fn test_frame_rate_rejects_zero_denominator() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("25"), None);
        assert_eq!(parse_frame_rate("24/1"), Some(24.0));
    }
}
