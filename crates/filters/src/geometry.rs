//! Geometry filters: crop, scale, rotate, pad, flip.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{check_above, check_min, check_range, exclusive, fmt_num, require_any, Param};

/// Crop to an explicit region, or to the largest centered region with the
/// given aspect ratio (`"16:9"`). The two forms are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Crop {
    pub width: Option<Param>,
    pub height: Option<Param>,
    pub aspect_ratio: Option<String>,
    pub x: Option<Param>,
    pub y: Option<Param>,
}

impl Crop {
    pub fn region(width: impl Into<Param>, height: impl Into<Param>) -> Self {
        Self {
            width: Some(width.into()),
            height: Some(height.into()),
            ..Self::default()
        }
    }

    pub fn aspect(ratio: impl Into<String>) -> Self {
        Self {
            aspect_ratio: Some(ratio.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: impl Into<Param>, y: impl Into<Param>) -> Self {
        self.x = Some(x.into());
        self.y = Some(y.into());
        self
    }

    fn coords(&self) -> String {
        let mut coords = String::new();
        if let Some(x) = &self.x {
            coords.push_str(&format!(":x={x}"));
        }
        if let Some(y) = &self.y {
            coords.push_str(&format!(":y={y}"));
        }
        coords
    }
}

/// Parse `"N:M"` into its positive width and height terms.
pub fn parse_aspect_ratio(raw: &str) -> Option<(f64, f64)> {
    let (w, h) = raw.split_once(':')?;
    if w.is_empty() || h.is_empty() || !w.chars().chain(h.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let w: f64 = w.parse().ok()?;
    let h: f64 = h.parse().ok()?;
    (w > 0.0 && h > 0.0).then_some((w, h))
}

impl Filter for Crop {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        exclusive(
            name,
            ("aspectRatio", self.aspect_ratio.is_some()),
            ("width/height", self.width.is_some() || self.height.is_some()),
        )?;
        if let Some(ratio) = &self.aspect_ratio {
            if parse_aspect_ratio(ratio).is_none() {
                return Err(ReelcutError::validation(
                    name,
                    format!("invalid aspect ratio {ratio:?}, expected N:M"),
                ));
            }
        }
        if let Some(width) = self.width.as_ref().and_then(Param::as_num) {
            check_above(name, "width", width, 10.0)?;
        }
        if let Some(height) = self.height.as_ref().and_then(Param::as_num) {
            check_above(name, "height", height, 10.0)?;
        }
        Ok(())
    }

    fn build(&self, source: &StreamSummary) -> FilterOutput {
        let coords = self.coords();
        let Some((aw, ah)) = self.aspect_ratio.as_deref().and_then(parse_aspect_ratio) else {
            let width = self.width.clone().unwrap_or_else(|| Param::from("iw"));
            let height = self.height.clone().unwrap_or_else(|| Param::from("ih"));
            return FilterOutput::video(format!("crop=w={width}:h={height}{coords}"));
        };

        let ratio = aw / ah;
        let r = fmt_num(ratio);
        let inv = fmt_num(ah / aw);
        let expr = match (source.width, source.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                if f64::from(w) / f64::from(h) >= ratio {
                    format!("crop=w=ih*{r}:h=ih{coords}")
                } else {
                    format!("crop=w=iw:h=iw*{inv}{coords}")
                }
            }
            _ => format!("crop=w=min(iw\\,ih*{r}):h=min(ih\\,iw*{inv}){coords}"),
        };
        FilterOutput::video(expr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceAspectRatio {
    Increase,
    Decrease,
    Disable,
}

impl ForceAspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            ForceAspectRatio::Increase => "increase",
            ForceAspectRatio::Decrease => "decrease",
            ForceAspectRatio::Disable => "disable",
        }
    }
}

/// Scaling algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFlags {
    FastBilinear,
    Bilinear,
    Bicubic,
    Experimental,
    Neighbor,
    Area,
    Bicublin,
    Gauss,
    Sinc,
    Lanczos,
    Spline,
}

impl ScaleFlags {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleFlags::FastBilinear => "fast_bilinear",
            ScaleFlags::Bilinear => "bilinear",
            ScaleFlags::Bicubic => "bicubic",
            ScaleFlags::Experimental => "experimental",
            ScaleFlags::Neighbor => "neighbor",
            ScaleFlags::Area => "area",
            ScaleFlags::Bicublin => "bicublin",
            ScaleFlags::Gauss => "gauss",
            ScaleFlags::Sinc => "sinc",
            ScaleFlags::Lanczos => "lanczos",
            ScaleFlags::Spline => "spline",
        }
    }
}

/// Resize by percentage or to a width and/or height. Numeric sizes are
/// rounded up to even values; a missing side keeps the aspect ratio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scale {
    pub percentage: Option<f64>,
    pub width: Option<Param>,
    pub height: Option<Param>,
    pub force_aspect_ratio: Option<ForceAspectRatio>,
    pub flags: Option<ScaleFlags>,
}

impl Scale {
    pub fn percent(percentage: f64) -> Self {
        Self {
            percentage: Some(percentage),
            ..Self::default()
        }
    }

    pub fn size(width: Option<Param>, height: Option<Param>) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

fn even_side(side: &Param) -> String {
    match side {
        Param::Num(value) => fmt_num((value / 2.0).ceil() * 2.0),
        Param::Expr(expr) => expr.clone(),
    }
}

impl Filter for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        let sized = self.width.is_some() || self.height.is_some();
        require_any(
            name,
            &[self.percentage.is_some(), sized],
            "percentage, width, height",
        )?;
        exclusive(
            name,
            ("percentage", self.percentage.is_some()),
            ("width/height", sized),
        )?;
        if let Some(percentage) = self.percentage {
            check_range(name, "percentage", percentage, 10.0, 200.0)?;
        }
        if let Some(width) = self.width.as_ref().and_then(Param::as_num) {
            check_above(name, "width", width, 10.0)?;
        }
        if let Some(height) = self.height.as_ref().and_then(Param::as_num) {
            check_above(name, "height", height, 10.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut expr = match (self.percentage, &self.width, &self.height) {
            (Some(percentage), _, _) => {
                let half = fmt_num(percentage / 200.0);
                format!("scale=ceil(iw*{half})*2:ceil(ih*{half})*2")
            }
            (None, Some(w), Some(h)) => format!("scale={}:{}", even_side(w), even_side(h)),
            (None, Some(w), None) => format!("scale={}:-2", even_side(w)),
            (None, None, Some(h)) => format!("scale=-2:{}", even_side(h)),
            (None, None, None) => "scale=iw:ih".to_string(),
        };

        if self.percentage.is_none() {
            if let Some(force) = self.force_aspect_ratio {
                if force != ForceAspectRatio::Disable {
                    expr.push_str(&format!(
                        ":force_original_aspect_ratio={}:force_divisible_by=2",
                        force.as_str()
                    ));
                }
            }
        }
        if let Some(flags) = self.flags {
            expr.push_str(&format!(":flags={}", flags.as_str()));
        }
        FilterOutput::video(expr)
    }
}

/// Rotate by degrees or by a time-varying angle expression (radians).
/// The output canvas grows to fit the rotated frame unless sized explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rotate {
    pub degrees: Option<f64>,
    pub expression: Option<String>,
    pub output_width: Option<Param>,
    pub output_height: Option<Param>,
    /// Fill for uncovered areas; transparent black when unset.
    pub empty_area_color: Option<String>,
}

impl Rotate {
    pub fn degrees(degrees: f64) -> Self {
        Self {
            degrees: Some(degrees),
            ..Self::default()
        }
    }

    pub fn expression(expr: impl Into<String>) -> Self {
        Self {
            expression: Some(expr.into()),
            ..Self::default()
        }
    }

    fn angle(&self) -> String {
        match (&self.expression, self.degrees) {
            (Some(expr), _) => expr.clone(),
            (None, Some(degrees)) => format!("{}*PI/180", fmt_num(degrees)),
            (None, None) => "0".to_string(),
        }
    }
}

impl Filter for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        require_any(
            name,
            &[self.degrees.is_some(), self.expression.is_some()],
            "degrees, expression",
        )?;
        exclusive(
            name,
            ("degrees", self.degrees.is_some()),
            ("expression", self.expression.is_some()),
        )?;
        if let Some(degrees) = self.degrees {
            check_range(name, "degrees", degrees, -360.0, 360.0)?;
        }
        if let Some(width) = self.output_width.as_ref().and_then(Param::as_num) {
            check_above(name, "outputWidth", width, 0.0)?;
        }
        if let Some(height) = self.output_height.as_ref().and_then(Param::as_num) {
            check_above(name, "outputHeight", height, 0.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let angle = self.angle();
        let color = self.empty_area_color.as_deref().unwrap_or("black@0");
        let ow = self
            .output_width
            .as_ref()
            .map_or_else(|| format!("rotw({angle})"), Param::to_string);
        let oh = self
            .output_height
            .as_ref()
            .map_or_else(|| format!("roth({angle})"), Param::to_string);
        FilterOutput::video(format!(
            "format=yuva420p,rotate='{angle}':c='{color}':ow='{ow}':oh='{oh}'"
        ))
    }
}

/// Place the frame on a larger canvas. Centered when no offset is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pad {
    pub width: Param,
    pub height: Param,
    #[serde(default)]
    pub x: Option<Param>,
    #[serde(default)]
    pub y: Option<Param>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Pad {
    pub fn new(width: impl Into<Param>, height: impl Into<Param>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
            x: None,
            y: None,
            color: None,
        }
    }
}

impl Filter for Pad {
    fn name(&self) -> &'static str {
        "pad"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        if let Some(width) = self.width.as_num() {
            check_above(name, "width", width, 0.0)?;
        }
        if let Some(height) = self.height.as_num() {
            check_above(name, "height", height, 0.0)?;
        }
        if let Some(x) = self.x.as_ref().and_then(Param::as_num) {
            check_min(name, "x", x, 0.0)?;
        }
        if let Some(y) = self.y.as_ref().and_then(Param::as_num) {
            check_min(name, "y", y, 0.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let x = self
            .x
            .as_ref()
            .map_or_else(|| "(ow-iw)/2".to_string(), Param::to_string);
        let y = self
            .y
            .as_ref()
            .map_or_else(|| "(oh-ih)/2".to_string(), Param::to_string);
        let color = self.color.as_deref().unwrap_or("black");
        FilterOutput::video(format!("pad={}:{}:{x}:{y}:{color}", self.width, self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub axis: FlipAxis,
}

impl Filter for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video(match self.axis {
            FlipAxis::Horizontal => "hflip",
            FlipAxis::Vertical => "vflip",
            FlipAxis::Both => "hflip,vflip",
        })
    }
}
