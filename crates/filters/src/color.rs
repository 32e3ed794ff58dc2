//! Color filters: eq, hue, balance, channel mixing, lookup presets, alpha.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{check_param_range, check_range, exclusive, fmt_num, join_options, require_any, Param};

/// Brightness, contrast, saturation and gamma through `eq`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Brightness {
    pub brightness: Option<Param>,
    pub contrast: Option<Param>,
    pub saturation: Option<Param>,
    pub gamma: Option<Param>,
}

impl Filter for Brightness {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        require_any(
            name,
            &[
                self.brightness.is_some(),
                self.contrast.is_some(),
                self.saturation.is_some(),
                self.gamma.is_some(),
            ],
            "brightness, contrast, saturation, gamma",
        )?;
        if let Some(value) = &self.brightness {
            check_param_range(name, "brightness", value, -1.0, 1.0)?;
        }
        if let Some(value) = &self.contrast {
            check_param_range(name, "contrast", value, -1000.0, 1000.0)?;
        }
        if let Some(value) = &self.saturation {
            check_param_range(name, "saturation", value, 0.0, 3.0)?;
        }
        if let Some(value) = &self.gamma {
            check_param_range(name, "gamma", value, 0.1, 10.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let params = join_options(&[
            ("brightness", self.brightness.as_ref().map(Param::quoted)),
            ("contrast", self.contrast.as_ref().map(Param::quoted)),
            ("saturation", self.saturation.as_ref().map(Param::quoted)),
            ("gamma", self.gamma.as_ref().map(Param::quoted)),
        ]);
        FilterOutput::video(format!("eq={params}"))
    }
}

/// Hue rotation in degrees, or a radian expression such as `2*PI*t`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hue {
    pub degrees: Option<f64>,
    pub expression: Option<String>,
    pub saturation: Option<Param>,
    pub brightness: Option<Param>,
}

impl Filter for Hue {
    fn name(&self) -> &'static str {
        "hue"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        require_any(
            name,
            &[
                self.degrees.is_some(),
                self.expression.is_some(),
                self.saturation.is_some(),
                self.brightness.is_some(),
            ],
            "degrees, expression, saturation, brightness",
        )?;
        exclusive(
            name,
            ("degrees", self.degrees.is_some()),
            ("expression", self.expression.is_some()),
        )?;
        if let Some(degrees) = self.degrees {
            check_range(name, "degrees", degrees, -360.0, 360.0)?;
        }
        if let Some(saturation) = &self.saturation {
            check_param_range(name, "saturation", saturation, -10.0, 10.0)?;
        }
        if let Some(brightness) = &self.brightness {
            check_param_range(name, "brightness", brightness, -10.0, 10.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut params = Vec::new();
        match (&self.expression, self.degrees) {
            (Some(expr), _) => params.push(format!("H='{expr}'")),
            (None, Some(degrees)) => params.push(format!("h={}", fmt_num(degrees))),
            (None, None) => {}
        }
        if let Some(saturation) = &self.saturation {
            params.push(format!("s={}", saturation.quoted()));
        }
        if let Some(brightness) = &self.brightness {
            params.push(format!("b={}", brightness.quoted()));
        }
        FilterOutput::video(format!("hue={}", params.join(":")))
    }
}

/// Per-range color balance, each adjustment in [-1, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorBalance {
    pub red_shadows: Option<f64>,
    pub green_shadows: Option<f64>,
    pub blue_shadows: Option<f64>,
    pub red_midtones: Option<f64>,
    pub green_midtones: Option<f64>,
    pub blue_midtones: Option<f64>,
    pub red_highlights: Option<f64>,
    pub green_highlights: Option<f64>,
    pub blue_highlights: Option<f64>,
    pub preserve_lightness: Option<bool>,
}

impl ColorBalance {
    fn adjustments(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("rs", self.red_shadows),
            ("gs", self.green_shadows),
            ("bs", self.blue_shadows),
            ("rm", self.red_midtones),
            ("gm", self.green_midtones),
            ("bm", self.blue_midtones),
            ("rh", self.red_highlights),
            ("gh", self.green_highlights),
            ("bh", self.blue_highlights),
        ]
    }
}

impl Filter for ColorBalance {
    fn name(&self) -> &'static str {
        "colorbalance"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let adjustments = self.adjustments();
        let mut present: Vec<bool> = adjustments.iter().map(|(_, v)| v.is_some()).collect();
        present.push(self.preserve_lightness.is_some());
        require_any(self.name(), &present, "a shadow, midtone or highlight adjustment")?;
        for (key, value) in adjustments {
            if let Some(value) = value {
                check_range(self.name(), key, value, -1.0, 1.0)?;
            }
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut pairs: Vec<(&str, Option<String>)> = self
            .adjustments()
            .into_iter()
            .map(|(key, value)| (key, value.map(fmt_num)))
            .collect();
        pairs.push((
            "pl",
            self.preserve_lightness.map(|pl| u8::from(pl).to_string()),
        ));
        FilterOutput::video(format!("colorbalance={}", join_options(&pairs)))
    }
}

/// How `colorchannelmixer` preserves color after mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreserveColorMode {
    None,
    Lum,
    Max,
    Avg,
    Sum,
    Nrm,
    Pwr,
}

impl PreserveColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PreserveColorMode::None => "none",
            PreserveColorMode::Lum => "lum",
            PreserveColorMode::Max => "max",
            PreserveColorMode::Avg => "avg",
            PreserveColorMode::Sum => "sum",
            PreserveColorMode::Nrm => "nrm",
            PreserveColorMode::Pwr => "pwr",
        }
    }
}

/// Channel mixing matrix. `red_in_green` is how much of the input red
/// channel ends up in the output green channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorMixer {
    pub red_in_red: Option<f64>,
    pub red_in_green: Option<f64>,
    pub red_in_blue: Option<f64>,
    pub red_in_alpha: Option<f64>,
    pub green_in_red: Option<f64>,
    pub green_in_green: Option<f64>,
    pub green_in_blue: Option<f64>,
    pub green_in_alpha: Option<f64>,
    pub blue_in_red: Option<f64>,
    pub blue_in_green: Option<f64>,
    pub blue_in_blue: Option<f64>,
    pub blue_in_alpha: Option<f64>,
    pub alpha_in_red: Option<f64>,
    pub alpha_in_green: Option<f64>,
    pub alpha_in_blue: Option<f64>,
    pub alpha_in_alpha: Option<f64>,
    pub preserve_color_mode: Option<PreserveColorMode>,
    pub preserve_color_amount: Option<f64>,
}

impl ColorMixer {
    fn matrix(&self) -> [(&'static str, Option<f64>); 16] {
        [
            ("rr", self.red_in_red),
            ("gr", self.red_in_green),
            ("br", self.red_in_blue),
            ("ar", self.red_in_alpha),
            ("rg", self.green_in_red),
            ("gg", self.green_in_green),
            ("bg", self.green_in_blue),
            ("ag", self.green_in_alpha),
            ("rb", self.blue_in_red),
            ("gb", self.blue_in_green),
            ("bb", self.blue_in_blue),
            ("ab", self.blue_in_alpha),
            ("ra", self.alpha_in_red),
            ("ga", self.alpha_in_green),
            ("ba", self.alpha_in_blue),
            ("aa", self.alpha_in_alpha),
        ]
    }
}

impl Filter for ColorMixer {
    fn name(&self) -> &'static str {
        "colorchannelmixer"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let matrix = self.matrix();
        let mut present: Vec<bool> = matrix.iter().map(|(_, v)| v.is_some()).collect();
        present.push(self.preserve_color_mode.is_some());
        present.push(self.preserve_color_amount.is_some());
        require_any(self.name(), &present, "a mixer coefficient")?;
        for (key, value) in matrix {
            if let Some(value) = value {
                check_range(self.name(), key, value, -2.0, 2.0)?;
            }
        }
        if let Some(amount) = self.preserve_color_amount {
            check_range(self.name(), "preserveColorAmount", amount, 0.0, 1.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut pairs: Vec<(&str, Option<String>)> = self
            .matrix()
            .into_iter()
            .map(|(key, value)| (key, value.map(fmt_num)))
            .collect();
        pairs.push((
            "pc",
            self.preserve_color_mode.map(|mode| mode.as_str().to_string()),
        ));
        pairs.push(("pa", self.preserve_color_amount.map(fmt_num)));
        FilterOutput::video(format!("colorchannelmixer={}", join_options(&pairs)))
    }
}

/// Named color looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LutPreset {
    #[serde(rename = "sepia")]
    Sepia,
    #[serde(rename = "golden hour")]
    GoldenHour,
    #[serde(rename = "purple noir")]
    PurpleNoir,
    #[serde(rename = "grayscale")]
    Grayscale,
    #[serde(rename = "moonlight")]
    Moonlight,
    #[serde(rename = "teal & orange")]
    TealOrange,
    #[serde(rename = "vibrant")]
    Vibrant,
    #[serde(rename = "desaturated")]
    Desaturated,
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "matrix code green")]
    MatrixCodeGreen,
    #[serde(rename = "cyberpunk")]
    Cyberpunk,
    #[serde(rename = "vintage film")]
    VintageFilm,
}

impl LutPreset {
    pub fn expression(self) -> &'static str {
        match self {
            LutPreset::Sepia => "lutrgb=r=val*1.2:g=val*1.1:b=val*0.9",
            LutPreset::GoldenHour => "lutrgb=r=1.2*val:g=1.1*val:b=0.8*val",
            LutPreset::PurpleNoir => "lutrgb=r=0.8*val:g=0.7*val:b=1.2*val",
            LutPreset::Grayscale => "lutyuv=y=val:u=128:v=128",
            LutPreset::Moonlight => {
                "lutrgb=r='clipval*0.85':g='clipval*0.95':b='min(maxval,clipval*1.1)'"
            }
            LutPreset::TealOrange => {
                "lutrgb=r='min(maxval,clipval*1.08)':g='clipval*0.97':b='clipval*0.9'"
            }
            LutPreset::Vibrant => "lutrgb=r=1.2*val:g=1.2*val:b=1.2*val",
            LutPreset::Desaturated => "lutrgb=r=0.8*val:g=0.8*val:b=0.8*val",
            LutPreset::Negative => "lutrgb=r=negval:g=negval:b=negval",
            LutPreset::MatrixCodeGreen => "lutrgb=r=val*0.5:g=val*1.5:b=val*0.5",
            LutPreset::Cyberpunk => "lutrgb=r=val*0.7:g=val*0.3:b=val*1.4",
            LutPreset::VintageFilm => "curves=preset=vintage",
        }
    }
}

impl TryFrom<&str> for LutPreset {
    type Error = ReelcutError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|_| ReelcutError::validation("colorpreset", format!("unknown preset {name:?}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPreset {
    pub preset: LutPreset,
}

impl Filter for ColorPreset {
    fn name(&self) -> &'static str {
        "colorpreset"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video(self.preset.expression())
    }
}

/// Scale individual channels; touching alpha switches to an RGBA layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMultiplier {
    pub red: Option<Param>,
    pub green: Option<Param>,
    pub blue: Option<Param>,
    pub alpha: Option<Param>,
}

fn scaled(param: &Param) -> String {
    match param {
        Param::Num(value) => format!("val*{}", fmt_num(*value)),
        Param::Expr(expr) => format!("'val*({expr})'"),
    }
}

impl Filter for ColorMultiplier {
    fn name(&self) -> &'static str {
        "colormultiplier"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        let channels = [
            ("red", &self.red),
            ("green", &self.green),
            ("blue", &self.blue),
            ("alpha", &self.alpha),
        ];
        require_any(
            name,
            &channels.map(|(_, value)| value.is_some()),
            "red, green, blue, alpha",
        )?;
        for (field, value) in channels {
            if let Some(value) = value {
                check_param_range(name, field, value, 0.0, 10.0)?;
            }
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let params = join_options(&[
            ("r", self.red.as_ref().map(scaled)),
            ("g", self.green.as_ref().map(scaled)),
            ("b", self.blue.as_ref().map(scaled)),
            ("a", self.alpha.as_ref().map(scaled)),
        ]);
        let lut = format!("lutrgb={params}");
        if self.alpha.is_some() {
            FilterOutput::video(format!("format=rgba,{lut}"))
        } else {
            FilterOutput::video(lut)
        }
    }
}

/// Zero out whole color channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveColor {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Filter for RemoveColor {
    fn name(&self) -> &'static str {
        "removecolor"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        require_any(self.name(), &[self.red, self.green, self.blue], "red, green, blue")
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let zero = || "0".to_string();
        let params = join_options(&[
            ("r", self.red.then(zero)),
            ("g", self.green.then(zero)),
            ("b", self.blue.then(zero)),
        ]);
        FilterOutput::video(format!("lutrgb={params}"))
    }
}

/// Invert colors, optionally the alpha channel too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Negate {
    pub alpha: bool,
}

impl Filter for Negate {
    fn name(&self) -> &'static str {
        "negate"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video(format!("negate=negate_alpha={}", u8::from(self.alpha)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grayscale;

impl Filter for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video("format=gray")
    }
}

/// Uniform opacity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alpha {
    pub value: f64,
}

impl Filter for Alpha {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        check_range(self.name(), "value", self.value, 0.0, 1.0)
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        FilterOutput::video(format!(
            "format=rgba,colorchannelmixer=aa={}",
            fmt_num(self.value)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StreamSummary {
        StreamSummary::image(800, 600)
    }

    #[test]
    fn test_eq_parameters() {
        let eq = Brightness {
            brightness: Some(Param::from(0.1)),
            gamma: Some(Param::from(1.5)),
            ..Default::default()
        };
        assert!(eq.validate().is_ok());
        assert_eq!(eq.build(&source()).video.as_deref(), Some("eq=brightness=0.1:gamma=1.5"));

        assert!(Brightness::default().validate().is_err());
        let too_bright = Brightness {
            brightness: Some(Param::from(2.0)),
            ..Default::default()
        };
        assert!(too_bright.validate().is_err());
    }

    #[test]
    fn test_hue_degrees_or_expression() {
        let hue = Hue {
            degrees: Some(90.0),
            saturation: Some(Param::from(2.0)),
            ..Default::default()
        };
        assert_eq!(hue.build(&source()).video.as_deref(), Some("hue=h=90:s=2"));

        let animated = Hue {
            expression: Some("2*PI*t".into()),
            ..Default::default()
        };
        assert_eq!(animated.build(&source()).video.as_deref(), Some("hue=H='2*PI*t'"));

        let both = Hue {
            degrees: Some(10.0),
            expression: Some("t".into()),
            ..Default::default()
        };
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_colorbalance() {
        let balance = ColorBalance {
            red_shadows: Some(0.3),
            blue_highlights: Some(-0.2),
            preserve_lightness: Some(true),
            ..Default::default()
        };
        assert!(balance.validate().is_ok());
        assert_eq!(
            balance.build(&source()).video.as_deref(),
            Some("colorbalance=rs=0.3:bh=-0.2:pl=1")
        );
        let out_of_range = ColorBalance {
            green_midtones: Some(1.5),
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_colorchannelmixer_keys() {
        let sepia = ColorMixer {
            red_in_red: Some(0.393),
            green_in_red: Some(0.769),
            preserve_color_mode: Some(PreserveColorMode::Lum),
            ..Default::default()
        };
        assert_eq!(
            sepia.build(&source()).video.as_deref(),
            Some("colorchannelmixer=rr=0.393:rg=0.769:pc=lum")
        );
        assert!(ColorMixer::default().validate().is_err());
    }

    #[test]
    fn test_presets() {
        let preset = LutPreset::try_from("teal & orange").unwrap();
        assert_eq!(preset, LutPreset::TealOrange);
        assert!(ColorPreset { preset }
            .build(&source())
            .video
            .unwrap()
            .starts_with("lutrgb="));
        assert!(LutPreset::try_from("sparkle").is_err());
    }

    #[test]
    fn test_multiplier_alpha_switches_to_rgba() {
        let tint = ColorMultiplier {
            red: Some(Param::from(1.5)),
            alpha: Some(Param::from(0.5)),
            ..Default::default()
        };
        assert_eq!(
            tint.build(&source()).video.as_deref(),
            Some("format=rgba,lutrgb=r=val*1.5:a=val*0.5")
        );
        let too_much = ColorMultiplier {
            blue: Some(Param::from(11.0)),
            ..Default::default()
        };
        assert!(too_much.validate().is_err());
    }

    #[test]
    fn test_remove_color() {
        let no_green = RemoveColor {
            green: true,
            ..Default::default()
        };
        assert_eq!(no_green.build(&source()).video.as_deref(), Some("lutrgb=g=0"));
        assert!(RemoveColor::default().validate().is_err());
    }

    #[test]
    fn test_simple_color_filters() {
        assert_eq!(
            Negate { alpha: true }.build(&source()).video.as_deref(),
            Some("negate=negate_alpha=1")
        );
        assert_eq!(Grayscale.build(&source()).video.as_deref(), Some("format=gray"));
        assert_eq!(
            Alpha { value: 0.4 }.build(&source()).video.as_deref(),
            Some("format=rgba,colorchannelmixer=aa=0.4")
        );
        assert!(Alpha { value: 1.2 }.validate().is_err());
    }
}
