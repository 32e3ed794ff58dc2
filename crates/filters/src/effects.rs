//! Blur, denoise and stabilization.

use reelcut_common::error::ReelcutResult;
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{check_range, fmt_num, join_options};

/// Gaussian blur radius used when none is given.
pub const DEFAULT_BLUR_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blur {
    pub radius: f64,
}

impl Default for Blur {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

impl Filter for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_range(self.name(), "radius", self.radius, 0.1, 50.0)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video(format!("gblur=sigma={}", fmt_num(self.radius)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenoiseMethod {
    /// High-quality 3D video denoiser.
    Hqdn3d,
    /// Non-local means; slow but strong.
    Nlmeans,
    /// Adaptive temporal averaging.
    Atadenoise,
    /// FFT audio denoiser.
    Afftdn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denoise {
    pub method: DenoiseMethod,
}

impl Filter for Denoise {
    fn name(&self) -> &'static str {
        "denoise"
    }

    fn target(&self) -> FilterTarget {
        match self.method {
            DenoiseMethod::Afftdn => FilterTarget::Audio,
            _ => FilterTarget::Video,
        }
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        match self.method {
            DenoiseMethod::Hqdn3d => FilterOutput::video("hqdn3d=4:3:6:4.5"),
            DenoiseMethod::Nlmeans => FilterOutput::video("nlmeans=s=7:p=9:pc=5"),
            DenoiseMethod::Atadenoise => FilterOutput::video("atadenoise=0.5"),
            DenoiseMethod::Afftdn => FilterOutput::audio("afftdn=nt=w:tn=1"),
        }
    }
}

/// How `deshake` fills the border exposed by motion compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeshakeEdge {
    Blank,
    Original,
    Clamp,
    Mirror,
}

impl DeshakeEdge {
    pub fn as_str(self) -> &'static str {
        match self {
            DeshakeEdge::Blank => "blank",
            DeshakeEdge::Original => "original",
            DeshakeEdge::Clamp => "clamp",
            DeshakeEdge::Mirror => "mirror",
        }
    }
}

/// Single-pass stabilization. With no options the engine defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deshake {
    /// Search rectangle; -1 means the whole frame.
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub motion_range_x: Option<u8>,
    pub motion_range_y: Option<u8>,
    pub edge: Option<DeshakeEdge>,
    pub blocksize: Option<u8>,
    pub contrast: Option<u16>,
}

impl Filter for Deshake {
    fn name(&self) -> &'static str {
        "deshake"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        for (field, value) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if let Some(value) = value {
                check_range(name, field, f64::from(value), -1.0, f64::from(i32::MAX))?;
            }
        }
        for (field, value) in [
            ("motionRangeX", self.motion_range_x),
            ("motionRangeY", self.motion_range_y),
        ] {
            if let Some(value) = value {
                check_range(name, field, f64::from(value), 0.0, 64.0)?;
            }
        }
        if let Some(blocksize) = self.blocksize {
            check_range(name, "blocksize", f64::from(blocksize), 4.0, 128.0)?;
        }
        if let Some(contrast) = self.contrast {
            check_range(name, "contrast", f64::from(contrast), 1.0, 255.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let params = join_options(&[
            ("x", self.x.map(|v| v.to_string())),
            ("y", self.y.map(|v| v.to_string())),
            ("w", self.width.map(|v| v.to_string())),
            ("h", self.height.map(|v| v.to_string())),
            ("rx", self.motion_range_x.map(|v| v.to_string())),
            ("ry", self.motion_range_y.map(|v| v.to_string())),
            ("edge", self.edge.map(|e| e.as_str().to_string())),
            ("blocksize", self.blocksize.map(|v| v.to_string())),
            ("contrast", self.contrast.map(|v| v.to_string())),
        ]);
        if params.is_empty() {
            FilterOutput::video("deshake")
        } else {
            FilterOutput::video(format!("deshake={params}"))
        }
    }
}
