//! Text and box drawing.

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::StreamSummary;
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOutput, FilterTarget};
use crate::param::{check_above, check_min, fmt_num, quote_str, require_any, Param};

/// Timeline gate for drawing filters: always on/off, or an expression such
/// as `between(t,2,5)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Enable {
    Flag(bool),
    Expr(String),
}

impl Enable {
    pub fn render(&self) -> String {
        match self {
            Enable::Flag(on) => format!("enable={}", u8::from(*on)),
            Enable::Expr(expr) => format!("enable='{expr}'"),
        }
    }
}

/// Numbers bare, expressions always single-quoted.
fn position(param: &Param) -> String {
    match param {
        Param::Num(value) => fmt_num(*value),
        Param::Expr(expr) => format!("'{expr}'"),
    }
}

fn backslash_escape(text: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape literal text for drawtext inside `-filter_complex`.
///
/// Three parsers see the value in turn: the graph parser, the filter option
/// parser, then drawtext's `%{...}` expansion. Each layer is escaped for the
/// one that reads it, innermost first.
pub fn escape_text(text: &str) -> String {
    let expansion = backslash_escape(text, &['\\', '%']);
    let option = backslash_escape(&expansion, &['\\', '\'', ':']);
    backslash_escape(&option, &['\\', '\'', '[', ']', ',', ';'])
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawText {
    pub text: String,
    /// Alignment flags, e.g. `C` or `M+C`.
    pub text_align: Option<String>,
    pub line_spacing: Option<f64>,
    pub font_file: Option<String>,
    pub font_size: Option<u32>,
    pub font_color: Option<String>,
    pub x: Option<Param>,
    pub y: Option<Param>,
    pub border_width: Option<f64>,
    pub border_color: Option<String>,
    pub shadow_x: Option<i32>,
    pub shadow_y: Option<i32>,
    pub shadow_color: Option<String>,
    #[serde(rename = "box")]
    pub boxed: Option<bool>,
    pub box_color: Option<String>,
    /// One to four border widths (top, right, bottom, left).
    pub box_border_width: Vec<f64>,
    pub enable: Option<Enable>,
}

impl DrawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: impl Into<Param>, y: impl Into<Param>) -> Self {
        self.x = Some(x.into());
        self.y = Some(y.into());
        self
    }
}

impl Filter for DrawText {
    fn name(&self) -> &'static str {
        "drawtext"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        let name = self.name();
        if self.text.is_empty() {
            return Err(ReelcutError::validation(name, "text must not be empty"));
        }
        if let Some(align) = &self.text_align {
            if align.is_empty() || !align.chars().all(|c| "LCRTMB+|".contains(c)) {
                return Err(ReelcutError::validation(
                    name,
                    format!("invalid textAlign {align:?}"),
                ));
            }
        }
        if let Some(spacing) = self.line_spacing {
            check_min(name, "lineSpacing", spacing, 0.0)?;
        }
        if let Some(size) = self.font_size {
            check_above(name, "fontSize", f64::from(size), 0.0)?;
        }
        if let Some(width) = self.border_width {
            check_min(name, "borderWidth", width, 0.0)?;
        }
        if self.box_border_width.len() > 4 {
            return Err(ReelcutError::validation(
                name,
                "boxBorderWidth takes at most four values",
            ));
        }
        for width in &self.box_border_width {
            check_min(name, "boxBorderWidth", *width, 0.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let mut params = vec![format!("text={}", escape_text(&self.text))];
        if let Some(font) = &self.font_file {
            params.push(format!("fontfile='{font}'"));
        }
        if let Some(size) = self.font_size {
            params.push(format!("fontsize={size}"));
        }
        if let Some(color) = &self.font_color {
            params.push(format!("fontcolor={}", quote_str(color)));
        }
        if let Some(x) = &self.x {
            params.push(format!("x={}", position(x)));
        }
        if let Some(y) = &self.y {
            params.push(format!("y={}", position(y)));
        }
        if let Some(width) = self.border_width {
            params.push(format!("borderw={}", fmt_num(width)));
        }
        if let Some(color) = &self.border_color {
            params.push(format!("bordercolor={}", quote_str(color)));
        }
        if let Some(dx) = self.shadow_x {
            params.push(format!("shadowx={dx}"));
        }
        if let Some(dy) = self.shadow_y {
            params.push(format!("shadowy={dy}"));
        }
        if let Some(color) = &self.shadow_color {
            params.push(format!("shadowcolor={}", quote_str(color)));
        }
        if let Some(boxed) = self.boxed {
            params.push(format!("box={}", u8::from(boxed)));
        }
        if let Some(color) = &self.box_color {
            params.push(format!("boxcolor={}", quote_str(color)));
        }
        if !self.box_border_width.is_empty() {
            let widths: Vec<String> = self.box_border_width.iter().map(|w| fmt_num(*w)).collect();
            params.push(format!("boxborderw={}", widths.join("|")));
        }
        if let Some(align) = &self.text_align {
            params.push(format!("text_align={align}"));
        }
        if let Some(spacing) = self.line_spacing {
            params.push(format!("line_spacing={}", fmt_num(spacing)));
        }
        if let Some(enable) = &self.enable {
            params.push(enable.render());
        }
        FilterOutput::video(format!("drawtext={}", params.join(":")))
    }
}

/// A rectangle, filled and/or outlined. Both parts are emitted as separate
/// `drawbox` steps when both are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawBox {
    pub x: Param,
    pub y: Param,
    pub width: Param,
    pub height: Param,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub enable: Option<Enable>,
}

impl DrawBox {
    pub fn new(
        x: impl Into<Param>,
        y: impl Into<Param>,
        width: impl Into<Param>,
        height: impl Into<Param>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
            fill_color: None,
            border_color: None,
            thickness: None,
            enable: None,
        }
    }

    fn geometry(&self) -> String {
        let mut params = vec![
            format!("x={}", position(&self.x)),
            format!("y={}", position(&self.y)),
            format!("w={}", position(&self.width)),
            format!("h={}", position(&self.height)),
        ];
        if let Some(enable) = &self.enable {
            params.push(enable.render());
        }
        params.join(":")
    }
}

impl Filter for DrawBox {
    fn name(&self) -> &'static str {
        "drawbox"
    }

    fn target(&self) -> FilterTarget {
        FilterTarget::Video
    }

    fn validate(&self) -> ReelcutResult<()> {
        require_any(
            self.name(),
            &[
                self.fill_color.is_some(),
                self.border_color.is_some(),
                self.thickness.is_some(),
            ],
            "fillColor, borderColor, thickness",
        )?;
        if let Some(thickness) = self.thickness {
            check_above(self.name(), "thickness", thickness, 0.0)?;
        }
        Ok(())
    }

    fn build(&self, _source: &StreamSummary) -> FilterOutput {
        let geometry = self.geometry();
        let mut steps = Vec::new();
        if let Some(fill) = &self.fill_color {
            steps.push(format!("drawbox={geometry}:t=fill:color={}", quote_str(fill)));
        }
        if self.border_color.is_some() || self.thickness.is_some() {
            let color = self.border_color.as_deref().unwrap_or("gray@1");
            let mut border = format!("drawbox={geometry}:color={}", quote_str(color));
            if let Some(thickness) = self.thickness {
                border.push_str(&format!(":t={}", fmt_num(thickness)));
            }
            steps.push(border);
        }
        FilterOutput::video(steps.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StreamSummary {
        StreamSummary::video(1280, 720, 5.0, 25.0, false)
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Title"), "Title");
        assert_eq!(escape_text("Hello, world: 100%"), r"Hello\, world\\: 100\\\\%");
        assert_eq!(escape_text("it's"), r"it\\\'s");
        assert_eq!(escape_text("[live]; a=b"), r"\[live\]\; a=b");
    }

    #[test]
    fn test_drawtext_parameters() {
        let text = DrawText {
            font_size: Some(48),
            font_color: Some("white".into()),
            box_color: Some("#000000".into()),
            enable: Some(Enable::Expr("between(t,1,3)".into())),
            ..DrawText::new("Title").at("(w-text_w)/2", 40)
        };
        assert!(text.validate().is_ok());
        assert_eq!(
            text.build(&source()).video.as_deref(),
            Some(
                "drawtext=text=Title:fontsize=48:fontcolor=white:x='(w-text_w)/2':y=40:\
                 boxcolor='#000000':enable='between(t,1,3)'"
            )
        );
    }

    #[test]
    fn test_drawtext_separators_survive_the_graph_parser() {
        let text = DrawText::new("Q&A: live, now");
        assert_eq!(
            text.build(&source()).video.as_deref(),
            Some(r"drawtext=text=Q&A\\: live\, now")
        );
    }

    #[test]
    fn test_drawtext_validation() {
        assert!(DrawText::new("").validate().is_err());
        let bad_align = DrawText {
            text_align: Some("Z".into()),
            ..DrawText::new("x")
        };
        assert!(bad_align.validate().is_err());
    }

    #[test]
    fn test_drawbox_fill_and_border() {
        let both = DrawBox {
            fill_color: Some("red@0.5".into()),
            thickness: Some(4.0),
            enable: Some(Enable::Flag(true)),
            ..DrawBox::new(10, 20, 200, 100)
        };
        assert_eq!(
            both.build(&source()).video.as_deref(),
            Some(
                "drawbox=x=10:y=20:w=200:h=100:enable=1:t=fill:color=red@0.5,\
                 drawbox=x=10:y=20:w=200:h=100:enable=1:color=gray@1:t=4"
            )
        );
        assert!(DrawBox::new(0, 0, 10, 10).validate().is_err());
    }

    #[test]
    fn test_enable_json_forms() {
        let flag: Enable = serde_json::from_str("false").unwrap();
        assert_eq!(flag.render(), "enable=0");
        let expr: Enable = serde_json::from_str(r#""gte(t,2)""#).unwrap();
        assert_eq!(expr.render(), "enable='gte(t,2)'");
    }
}
