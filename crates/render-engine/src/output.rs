//! Output option resolution: stream mapping, codec defaults, duration.
//!
//! Every product-level default comes from [`OutputPolicy`]; nothing here
//! touches graph construction.

use reelcut_common::config::OutputPolicy;
use reelcut_media_model::{OutputOptions, TargetFormat, TargetKind};

use crate::registry::InputRegistry;

/// Everything the resolver looks at.
#[derive(Debug, Clone, Copy)]
pub struct OutputRequest<'a> {
    pub registry: &'a InputRegistry,
    pub audio_tag: Option<&'a str>,
    pub video_tag: Option<&'a str>,
    pub target: TargetFormat,
    pub options: &'a OutputOptions,
    /// Whether a trim was applied anywhere in the graph.
    pub trimmed: bool,
}

/// How a channel ends up in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRoute {
    /// Not present in the output.
    Omitted,
    /// Taken from the last pad of the filter graph.
    Graph(String),
    /// Taken straight from an input (`N:a?`).
    Input(String),
}

impl StreamRoute {
    pub fn map_arg(&self) -> Option<&str> {
        match self {
            StreamRoute::Omitted => None,
            StreamRoute::Graph(tag) | StreamRoute::Input(tag) => Some(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    pub output_args: Vec<String>,
    pub audio: StreamRoute,
    pub video: StreamRoute,
    /// The `-t` value, explicit or synthesized.
    pub duration: Option<f64>,
}

impl OutputPlan {
    pub fn map_audio(&self) -> Option<String> {
        self.audio.map_arg().map(str::to_string)
    }

    pub fn map_video(&self) -> Option<String> {
        self.video.map_arg().map(str::to_string)
    }
}

fn push(args: &mut Vec<String>, flag: &str, value: impl ToString) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

fn audio_encoding(args: &mut Vec<String>, options: &OutputOptions, policy: &OutputPolicy, kind: TargetKind) {
    if let Some(codec) = &options.audio_codec {
        push(args, "-c:a", codec);
    }
    if options.audio_codec.as_deref() == Some("copy") {
        return;
    }
    let bitrate = options
        .audio_bitrate
        .clone()
        .or_else(|| kind.is_container().then(|| policy.audio_bitrate.clone()));
    if let Some(bitrate) = bitrate {
        push(args, "-b:a", bitrate);
    }
    if let Some(channels) = options.channels {
        push(args, "-ac", channels);
    }
}

fn wants_video_encoding(options: &OutputOptions) -> bool {
    options.video_codec.is_some()
        || options.video_bitrate.is_some()
        || options.crf.is_some()
        || options.preset.is_some()
        || options.fps.is_some()
        || options.pixel_format.is_some()
}

fn video_encoding(args: &mut Vec<String>, options: &OutputOptions, policy: &OutputPolicy, kind: TargetKind) {
    if let Some(codec) = &options.video_codec {
        push(args, "-c:v", codec);
    }
    if options.video_codec.as_deref() == Some("copy") {
        return;
    }
    let bitrate = options.video_bitrate.clone().or_else(|| {
        (kind.is_container() && options.crf.is_none()).then(|| policy.video_bitrate.clone())
    });
    if let Some(bitrate) = bitrate {
        push(args, "-b:v", bitrate);
    }
    if let Some(fps) = options.fps {
        push(args, "-r", fps);
    }
    if let Some(crf) = options.crf {
        push(args, "-crf", crf);
    }
    if let Some(preset) = options.preset {
        push(args, "-preset", preset.as_str());
    }

    let default_codec = options
        .video_codec
        .as_deref()
        .map_or(true, |codec| codec == policy.default_video_codec);
    let pixel_format = options.pixel_format.clone().or_else(|| {
        (kind == TargetKind::Video && default_codec).then(|| policy.pixel_format.clone())
    });
    if let Some(format) = pixel_format {
        push(args, "-pix_fmt", format);
    }
}

/// Decide mapping and output flags for one render.
pub fn resolve_output(request: &OutputRequest<'_>, policy: &OutputPolicy) -> OutputPlan {
    let OutputRequest {
        registry,
        options,
        target,
        ..
    } = *request;
    let kind = target.kind;
    let mut args = Vec::new();

    let any_audio = registry.iter().any(|(_, input)| input.metadata.has_audio);
    let any_video = registry.iter().any(|(_, input)| input.metadata.has_video);

    let audio = if !kind.carries_audio() || options.excludes_audio() {
        if any_audio {
            args.push("-an".to_string());
        }
        StreamRoute::Omitted
    } else if let Some(tag) = request.audio_tag {
        audio_encoding(&mut args, options, policy, kind);
        StreamRoute::Graph(tag.to_string())
    } else if let Some(index) = registry
        .iter()
        .position(|(_, input)| input.metadata.has_audio)
    {
        let copy = options.audio_codec.is_none()
            && options.audio_bitrate.is_none()
            && options.channels.is_none()
            && kind.is_container();
        if copy {
            push(&mut args, "-c:a", "copy");
        } else {
            audio_encoding(&mut args, options, policy, kind);
        }
        StreamRoute::Input(format!("{index}:a?"))
    } else {
        StreamRoute::Omitted
    };

    let video = if !kind.carries_video() || options.excludes_video() {
        if any_video {
            args.push("-vn".to_string());
        }
        StreamRoute::Omitted
    } else if let Some(tag) = request.video_tag {
        video_encoding(&mut args, options, policy, kind);
        StreamRoute::Graph(tag.to_string())
    } else if let Some((index, (_, input))) = registry
        .iter()
        .enumerate()
        .find(|(_, (_, input))| input.metadata.has_video)
    {
        let copy = !wants_video_encoding(options) && kind.is_container() && !input.is_image();
        if copy {
            push(&mut args, "-c:v", "copy");
        } else {
            video_encoding(&mut args, options, policy, kind);
        }
        StreamRoute::Input(format!("{index}:v?"))
    } else {
        StreamRoute::Omitted
    };

    match kind {
        TargetKind::AnimatedImage => push(&mut args, "-loop", 0),
        TargetKind::StillImage if video != StreamRoute::Omitted => {
            push(&mut args, "-frames:v", 1)
        }
        _ => {}
    }

    let duration = options.duration.or_else(|| {
        (registry.all_images() && !request.trimmed && kind.is_motion()).then(|| {
            tracing::debug!(
                secs = policy.still_image_duration_secs,
                "Synthesized duration for still-image export"
            );
            policy.still_image_duration_secs
        })
    });
    if let Some(secs) = duration {
        push(&mut args, "-t", secs);
    }

    if options.wants_shortest() {
        args.push("-shortest".to_string());
    }

    tracing::debug!(
        target = target.extension,
        audio = ?audio,
        video = ?video,
        args = ?args,
        "Resolved output options"
    );

    OutputPlan {
        output_args: args,
        audio,
        video,
        duration,
    }
}
