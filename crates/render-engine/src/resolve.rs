//! Input declaration and owner-to-index resolution.

use reelcut_common::error::ReelcutResult;
use reelcut_media_model::TargetKind;

use crate::graph::{Channel, Materialized, PadRef};
use crate::registry::InputRegistry;

/// Filtergraph and input arguments with every owner replaced by its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedGraph {
    pub input_args: Vec<String>,
    /// `None` when no filters were applied.
    pub filter_complex: Option<String>,
    pub audio_tag: Option<String>,
    pub video_tag: Option<String>,
}

/// Which channels survive into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask {
    pub audio: bool,
    pub video: bool,
}

impl ChannelMask {
    pub const ALL: ChannelMask = ChannelMask {
        audio: true,
        video: true,
    };

    pub fn keeps(self, channel: Channel) -> bool {
        match channel {
            Channel::Audio => self.audio,
            Channel::Video => self.video,
        }
    }
}

/// `-y`/`-n`, then one `-i` per registered source in order. Still images
/// loop when the output has a time axis.
pub fn input_args(registry: &InputRegistry, target: TargetKind, overwrite: bool) -> Vec<String> {
    let mut args = vec![if overwrite { "-y" } else { "-n" }.to_string()];
    for (_, input) in registry.iter() {
        if input.is_image() && target != TargetKind::StillImage {
            args.push("-loop".to_string());
            args.push("1".to_string());
        }
        args.push("-i".to_string());
        args.push(input.path.to_string_lossy().into_owned());
    }
    args
}

/// Resolve the materialized graph against the registry. Fragments on a
/// masked-out channel are dropped so no labeled pad is left dangling.
pub fn resolve(
    graph: &Materialized,
    registry: &InputRegistry,
    target: TargetKind,
    overwrite: bool,
    mask: ChannelMask,
) -> ReelcutResult<ResolvedGraph> {
    let indices = registry.indices();

    let mut clauses = Vec::new();
    for fragment in graph
        .fragments
        .iter()
        .filter(|fragment| mask.keeps(fragment.channel()))
    {
        clauses.push(fragment.resolve(&indices)?);
    }

    let tag = |pad: &Option<PadRef>, channel: Channel| -> ReelcutResult<Option<String>> {
        match pad {
            Some(pad) if mask.keeps(channel) => pad.resolve(&indices).map(Some),
            _ => Ok(None),
        }
    };
    let audio_tag = tag(&graph.audio_out, Channel::Audio)?;
    let video_tag = tag(&graph.video_out, Channel::Video)?;

    tracing::debug!(
        inputs = registry.len(),
        clauses = clauses.len(),
        audio_tag = ?audio_tag,
        video_tag = ?video_tag,
        "Resolved input indices"
    );

    Ok(ResolvedGraph {
        input_args: input_args(registry, target, overwrite),
        filter_complex: (!clauses.is_empty()).then(|| clauses.join(";")),
        audio_tag,
        video_tag,
    })
}
