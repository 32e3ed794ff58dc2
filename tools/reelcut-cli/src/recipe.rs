//! Edit recipes: a source, an output, and an ordered list of operations.

use std::path::{Path, PathBuf};

use reelcut_common::error::ReelcutResult;
use reelcut_filters::*;
use reelcut_media_model::OutputOptions;
use reelcut_render_engine::{join_output_path, MediaEditor};
use serde::{Deserialize, Serialize};

/// Output given as one path or as segments joined in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputPath {
    Path(PathBuf),
    Segments(Vec<PathBuf>),
}

impl OutputPath {
    pub fn resolve(&self) -> ReelcutResult<PathBuf> {
        match self {
            OutputPath::Path(path) => join_output_path([path]),
            OutputPath::Segments(segments) => join_output_path(segments),
        }
    }
}

/// One editor call. `op` names the call; the other fields are its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Volume(Volume),
    Loudnorm(Loudnorm),
    Dynaudnorm(Dynaudnorm),
    Pitch(Pitch),
    Pan(Pan),
    Trim(Trim),
    Fade(Fade),
    Speed(Speed),
    Reverse(Reverse),
    Delay(Delay),
    Crop(Crop),
    Scale(Scale),
    Rotate(Rotate),
    Pad(Pad),
    Flip(Flip),
    Brightness(Brightness),
    Hue(Hue),
    ColorBalance(ColorBalance),
    ColorMixer(ColorMixer),
    ColorPreset(ColorPreset),
    ColorMultiplier(ColorMultiplier),
    RemoveColor(RemoveColor),
    Negate(Negate),
    Grayscale,
    Alpha(Alpha),
    Blur(Blur),
    Denoise(Denoise),
    Deshake(Deshake),
    DrawText(DrawText),
    DrawBox(DrawBox),
    Overlay {
        path: PathBuf,
        #[serde(flatten)]
        options: Overlay,
    },
    MixAudio {
        path: PathBuf,
        #[serde(flatten)]
        options: AudioMix,
    },
    Mute,
    Blind,
}

impl Operation {
    pub fn apply(&self, editor: &mut MediaEditor) -> ReelcutResult<()> {
        match self {
            Operation::Volume(o) => editor.volume(o)?,
            Operation::Loudnorm(o) => editor.loudnorm(o)?,
            Operation::Dynaudnorm(o) => editor.dynaudnorm(o)?,
            Operation::Pitch(o) => editor.pitch(o)?,
            Operation::Pan(o) => editor.pan(o)?,
            Operation::Trim(o) => editor.trim(o)?,
            Operation::Fade(o) => editor.fade(o)?,
            Operation::Speed(o) => editor.speed(o)?,
            Operation::Reverse(o) => editor.reverse(o)?,
            Operation::Delay(o) => editor.delay(o)?,
            Operation::Crop(o) => editor.crop(o)?,
            Operation::Scale(o) => editor.scale(o)?,
            Operation::Rotate(o) => editor.rotate(o)?,
            Operation::Pad(o) => editor.pad(o)?,
            Operation::Flip(o) => editor.flip(o)?,
            Operation::Brightness(o) => editor.brightness(o)?,
            Operation::Hue(o) => editor.hue(o)?,
            Operation::ColorBalance(o) => editor.color_balance(o)?,
            Operation::ColorMixer(o) => editor.color_mixer(o)?,
            Operation::ColorPreset(o) => editor.color_preset(o)?,
            Operation::ColorMultiplier(o) => editor.color_multiplier(o)?,
            Operation::RemoveColor(o) => editor.remove_color(o)?,
            Operation::Negate(o) => editor.negate(o)?,
            Operation::Grayscale => editor.grayscale(&Grayscale)?,
            Operation::Alpha(o) => editor.alpha(o)?,
            Operation::Blur(o) => editor.blur(o)?,
            Operation::Denoise(o) => editor.denoise(o)?,
            Operation::Deshake(o) => editor.deshake(o)?,
            Operation::DrawText(o) => editor.draw_text(o)?,
            Operation::DrawBox(o) => editor.draw_box(o)?,
            Operation::Overlay { path, options } => editor.overlay(path, options)?,
            Operation::MixAudio { path, options } => editor.mix_audio(path, options)?,
            Operation::Mute => editor.mute(),
            Operation::Blind => editor.blind(),
        };
        Ok(())
    }

    /// Source path this operation pulls in, if any.
    fn path_mut(&mut self) -> Option<&mut PathBuf> {
        match self {
            Operation::Overlay { path, .. } | Operation::MixAudio { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub input: PathBuf,
    pub output: OutputPath,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub options: Option<OutputOptions>,
}

impl Recipe {
    /// Load a recipe. Relative paths inside it are taken relative to the
    /// recipe file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read recipe {}: {e}", path.display()))?;
        let mut recipe: Recipe = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid recipe {}: {e}", path.display()))?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            recipe.rebase(base);
        }
        Ok(recipe)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        join(&mut self.input);
        match &mut self.output {
            OutputPath::Path(path) => join(path),
            OutputPath::Segments(segments) => {
                if let Some(first) = segments.first_mut() {
                    join(first);
                }
            }
        }
        for op in &mut self.operations {
            if let Some(path) = op.path_mut() {
                join(path);
            }
        }
    }

    /// Apply every operation in order.
    pub fn apply(&self, editor: &mut MediaEditor) -> ReelcutResult<()> {
        for (index, op) in self.operations.iter().enumerate() {
            tracing::debug!(index, op = ?op, "Applying operation");
            op.apply(editor)?;
        }
        Ok(())
    }
}
