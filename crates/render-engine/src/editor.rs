//! The fluent editing surface.
//!
//! A [`MediaEditor`] wraps one primary source. Every filter method validates
//! its options, checks that the streams it needs exist, and buffers the
//! formatted expression on the matching channel. Nothing is resolved until
//! [`MediaEditor::plan`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelcut_common::config::{AppConfig, OutputPolicy};
use reelcut_common::error::{ReelcutError, ReelcutResult, StreamKind};
use reelcut_filters::*;
use reelcut_media_model::{MediaInput, OutputOptions, StreamSummary, TargetFormat};
use serde::Serialize;

use crate::command::FfmpegCommand;
use crate::graph::{Channel, FilterGraph, OwnerId, PadRef};
use crate::output::{resolve_output, OutputRequest};
use crate::probe::Prober;
use crate::registry::InputRegistry;
use crate::resolve::{resolve, ChannelMask};
use crate::runner::{FfmpegRunner, Runner};

/// Structural state with owner placeholders, for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandData {
    /// Fragments rendered with `{owner}` placeholders.
    pub fragments: Vec<String>,
    pub audio_out: Option<String>,
    pub video_out: Option<String>,
    /// Registered sources in input order.
    pub inputs: Vec<(OwnerId, MediaInput)>,
}

/// Builder for one render of a primary source.
pub struct MediaEditor {
    prober: Arc<dyn Prober>,
    registry: InputRegistry,
    source: StreamSummary,
    graph: FilterGraph,
    defaults: OutputOptions,
    policy: Option<OutputPolicy>,
    trimmed: bool,
}

impl std::fmt::Debug for MediaEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaEditor")
            .field("primary", self.graph.owner())
            .field("inputs", &self.registry.len())
            .field("defaults", &self.defaults)
            .field("trimmed", &self.trimmed)
            .finish()
    }
}

macro_rules! filter_methods {
    ($($(#[$doc:meta])* $method:ident => $filter:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, options: &$filter) -> ReelcutResult<&mut Self> {
                self.apply(options)
            }
        )*
    };
}

impl MediaEditor {
    /// Probe `path` and start editing it.
    pub fn open(path: impl AsRef<Path>, prober: Arc<dyn Prober>) -> ReelcutResult<Self> {
        let path = path.as_ref();
        let summary = prober.probe(path)?;
        let input = MediaInput::from_summary(path, summary)?;
        tracing::info!(
            path = %path.display(),
            media_type = input.media_type.as_str(),
            "Opened source"
        );

        let source = input.metadata.clone();
        let mut registry = InputRegistry::new();
        let owner = registry.register(input);
        Ok(Self {
            prober,
            registry,
            source,
            graph: FilterGraph::new(owner),
            defaults: OutputOptions::default(),
            policy: None,
            trimmed: false,
        })
    }

    /// Replace the product defaults used by the output resolver. An explicit
    /// policy takes precedence over the one `render` reads from the config.
    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Summary of the primary source.
    pub fn metadata(&self) -> &StreamSummary {
        &self.source
    }

    fn has_channel(&self, channel: Channel) -> bool {
        let raw = match channel {
            Channel::Audio => self.source.has_audio,
            Channel::Video => self.source.has_video,
        };
        raw || self.graph.output(channel).is_some() || !self.graph.pending(channel).is_empty()
    }

    /// Validate, check streams, and buffer a single-source filter.
    pub fn apply<F: Filter>(&mut self, filter: &F) -> ReelcutResult<&mut Self> {
        filter.validate()?;

        let target = filter.target();
        let audio = target.wants_audio() && self.has_channel(Channel::Audio);
        let video = target.wants_video() && self.has_channel(Channel::Video);
        let satisfied = match target.required_stream() {
            StreamKind::Audio => audio,
            StreamKind::Video => video,
            StreamKind::Any => audio || video,
        };
        if !satisfied {
            return Err(ReelcutError::missing_stream(
                target.required_stream(),
                filter.name(),
            ));
        }

        let output = filter.build(&self.source);
        let mut buffered = false;
        if let Some(expr) = output.audio.filter(|_| audio) {
            self.graph.append_audio(expr);
            buffered = true;
        }
        if let Some(expr) = output.video.filter(|_| video) {
            self.graph.append_video(expr);
            buffered = true;
        }
        if buffered && filter.bounds_timeline() {
            self.trimmed = true;
        }
        tracing::debug!(filter = filter.name(), audio, video, "Buffered filter");
        Ok(self)
    }

    filter_methods! {
        /// Scale the audio volume.
        volume => Volume;
        /// EBU R128 loudness normalization.
        loudnorm => Loudnorm;
        dynaudnorm => Dynaudnorm;
        /// Shift pitch without changing tempo.
        pitch => Pitch;
        pan => Pan;
        /// Cut a time range. Disables the synthesized still-image duration.
        trim => Trim;
        fade => Fade;
        speed => Speed;
        reverse => Reverse;
        /// Pad the start with silence and transparent frames.
        delay => Delay;
        crop => Crop;
        scale => Scale;
        rotate => Rotate;
        pad => Pad;
        flip => Flip;
        brightness => Brightness;
        hue => Hue;
        color_balance => ColorBalance;
        color_mixer => ColorMixer;
        color_preset => ColorPreset;
        color_multiplier => ColorMultiplier;
        remove_color => RemoveColor;
        negate => Negate;
        grayscale => Grayscale;
        alpha => Alpha;
        blur => Blur;
        denoise => Denoise;
        deshake => Deshake;
        draw_text => DrawText;
        draw_box => DrawBox;
    }

    /// Drop audio from every output of this editor.
    pub fn mute(&mut self) -> &mut Self {
        self.defaults.audio_none = Some(true);
        self
    }

    /// Drop video from every output of this editor.
    pub fn blind(&mut self) -> &mut Self {
        self.defaults.video_none = Some(true);
        self
    }

    /// Draw `path`'s video over the current video.
    pub fn overlay(&mut self, path: impl AsRef<Path>, options: &Overlay) -> ReelcutResult<&mut Self> {
        self.join(path.as_ref(), Channel::Video, options)
    }

    /// Mix `path`'s audio into the current audio.
    pub fn mix_audio(&mut self, path: impl AsRef<Path>, options: &AudioMix) -> ReelcutResult<&mut Self> {
        self.join(path.as_ref(), Channel::Audio, options)
    }

    fn join<F: Filter>(&mut self, path: &Path, channel: Channel, filter: &F) -> ReelcutResult<&mut Self> {
        filter.validate()?;
        let stream = match channel {
            Channel::Audio => StreamKind::Audio,
            Channel::Video => StreamKind::Video,
        };
        if !self.has_channel(channel) {
            return Err(ReelcutError::missing_stream(stream, filter.name()));
        }

        let summary = self.prober.probe(path)?;
        let present = match channel {
            Channel::Audio => summary.has_audio,
            Channel::Video => summary.has_video,
        };
        if !present {
            return Err(ReelcutError::missing_stream(stream, filter.name()));
        }

        let output = filter.build(&summary);
        let expr = match channel {
            Channel::Audio => output.audio,
            Channel::Video => output.video,
        }
        .ok_or_else(|| ReelcutError::internal(format!("{} produced no expression", filter.name())))?;

        let owner = self.registry.register(MediaInput::from_summary(path, summary)?);
        tracing::debug!(filter = filter.name(), owner = %owner, path = %path.display(), "Joined source");
        self.graph
            .push_joined(channel, vec![PadRef::raw(owner, channel)], expr);
        Ok(self)
    }

    /// Materialize and return the graph with placeholders.
    pub fn command_data(&mut self) -> CommandData {
        let state = self.graph.materialize();
        CommandData {
            fragments: state.fragments.iter().map(|f| f.placeholder()).collect(),
            audio_out: state.audio_out.as_ref().map(PadRef::placeholder),
            video_out: state.video_out.as_ref().map(PadRef::placeholder),
            inputs: self
                .registry
                .iter()
                .map(|(owner, input)| (owner.clone(), input.clone()))
                .collect(),
        }
    }

    /// Resolve everything into a command for `output` without running it.
    /// Creates the output directory when missing.
    pub fn plan(
        &mut self,
        output: impl AsRef<Path>,
        options: Option<&OutputOptions>,
    ) -> ReelcutResult<FfmpegCommand> {
        let output = output.as_ref();
        if output.as_os_str().is_empty() || output == Path::new(".") {
            return Err(ReelcutError::invalid_output_path(format!(
                "{:?} does not name a file",
                output.display().to_string()
            )));
        }
        let target = TargetFormat::from_path(output)?;

        let options = options
            .map(|explicit| explicit.merged_over(&self.defaults))
            .unwrap_or_else(|| self.defaults.clone());
        options.validate()?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let state = self.graph.materialize();
        let mask = ChannelMask {
            audio: target.kind.carries_audio() && !options.excludes_audio(),
            video: target.kind.carries_video() && !options.excludes_video(),
        };
        let resolved = resolve(
            &state,
            &self.registry,
            target.kind,
            options.wants_overwrite(),
            mask,
        )?;

        let policy = self.policy.clone().unwrap_or_default();
        let plan = resolve_output(
            &OutputRequest {
                registry: &self.registry,
                audio_tag: resolved.audio_tag.as_deref(),
                video_tag: resolved.video_tag.as_deref(),
                target,
                options: &options,
                trimmed: self.trimmed,
            },
            &policy,
        );

        let command = FfmpegCommand {
            input_args: resolved.input_args,
            filter_complex: resolved.filter_complex,
            map_audio: plan.map_audio(),
            map_video: plan.map_video(),
            output_args: plan.output_args,
            output: output.to_path_buf(),
            duration: plan.duration,
        };
        tracing::info!(command = %command, "Planned command");
        Ok(command)
    }

    /// Plan and execute through `runner`. Returns the command line.
    pub fn run(
        &mut self,
        output: impl AsRef<Path>,
        options: Option<&OutputOptions>,
        runner: &dyn Runner,
    ) -> ReelcutResult<String> {
        let command = self.plan(output, options)?;
        runner.run(&command)?;
        Ok(command.to_string())
    }

    /// Run on a blocking worker with the ffmpeg binary from `config`. The
    /// config policy applies unless [`MediaEditor::with_policy`] set one.
    pub async fn render(
        mut self,
        output: impl Into<PathBuf>,
        options: Option<OutputOptions>,
        config: &AppConfig,
    ) -> ReelcutResult<String> {
        let output = output.into();
        let runner = FfmpegRunner::new(config.engine.ffmpeg.clone());
        self.policy
            .get_or_insert_with(|| config.defaults.clone());

        tokio::task::spawn_blocking(move || self.run(&output, options.as_ref(), &runner))
            .await
            .map_err(|e| ReelcutError::internal(format!("Render task failed: {e}")))?
    }
}

/// Join path segments in order into one output path.
pub fn join_output_path<I, S>(segments: I) -> ReelcutResult<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let path: PathBuf = segments.into_iter().collect();
    if path.as_os_str().is_empty() {
        return Err(ReelcutError::invalid_output_path("no path segments given"));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StaticProber;

    fn prober() -> Arc<dyn Prober> {
        Arc::new(
            StaticProber::new()
                .with("clip.mp4", StreamSummary::video(1920, 1080, 10.0, 30.0, true))
                .with("silent.mp4", StreamSummary::video(1280, 720, 10.0, 30.0, false))
                .with("song.mp3", StreamSummary::audio(30.0, 44_100))
                .with("logo.png", StreamSummary::image(200, 100)),
        )
    }

    fn out(name: &str) -> PathBuf {
        std::env::temp_dir().join("reelcut_editor_tests").join(name)
    }

    #[test]
    fn test_open_unknown_source_fails() {
        let err = MediaEditor::open("missing.mp4", prober()).unwrap_err();
        assert!(matches!(err, ReelcutError::FileNotFound { .. }));
    }

    #[test]
    fn test_chained_filters_share_one_fragment_per_channel() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        editor
            .volume(&Volume::new(0.5))
            .unwrap()
            .flip(&Flip {
                axis: FlipAxis::Horizontal,
            })
            .unwrap()
            .grayscale(&Grayscale)
            .unwrap();

        let command = editor.plan(out("chain.mp4"), None).unwrap();
        assert_eq!(
            command.filter_complex.as_deref(),
            Some("[0:a]volume=0.5[0_0:a];[0:v]hflip,format=gray[0_1:v]")
        );
        assert_eq!(command.map_audio.as_deref(), Some("[0_0:a]"));
        assert_eq!(command.map_video.as_deref(), Some("[0_1:v]"));
    }

    #[test]
    fn test_video_filter_on_audio_source_is_missing_stream() {
        let mut editor = MediaEditor::open("song.mp3", prober()).unwrap();
        let err = editor.crop(&Crop::region(100, 100)).unwrap_err();
        assert!(matches!(
            err,
            ReelcutError::MissingStream { stream: StreamKind::Video, ref filter } if filter == "crop"
        ));
    }

    #[test]
    fn test_dual_filter_applies_to_present_streams_only() {
        let mut editor = MediaEditor::open("silent.mp4", prober()).unwrap();
        editor.reverse(&Reverse::default()).unwrap();
        let data = editor.command_data();
        assert_eq!(data.fragments.len(), 1);
        assert!(data.audio_out.is_none());
        let owner = &data.inputs[0].0;
        assert_eq!(data.fragments[0], format!("[{{{owner}}}:v]reverse[{{{owner}}}_0:v]"));
    }

    #[test]
    fn test_invalid_options_fail_at_the_call() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        let err = editor.blur(&Blur { radius: 99.0 }).unwrap_err();
        assert!(matches!(err, ReelcutError::Validation { .. }));
        assert!(editor.command_data().fragments.is_empty());
    }

    #[test]
    fn test_overlay_registers_second_input() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        editor
            .scale(&Scale::percent(50.0))
            .unwrap()
            .overlay("logo.png", &Overlay::at(10, 10))
            .unwrap();

        let command = editor.plan(out("overlay.mp4"), None).unwrap();
        assert_eq!(
            command.input_args,
            vec!["-y", "-i", "clip.mp4", "-loop", "1", "-i", "logo.png"]
        );
        assert_eq!(
            command.filter_complex.as_deref(),
            Some("[0:v]scale=ceil(iw*0.25)*2:ceil(ih*0.25)*2[0_0:v];[0_0:v][1:v]overlay=x=10:y=10[0_1:v]")
        );
        assert_eq!(command.map_video.as_deref(), Some("[0_1:v]"));
        assert_eq!(command.map_audio.as_deref(), Some("0:a?"));
    }

    #[test]
    fn test_mix_audio_needs_audio_in_both_sources() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        let err = editor.mix_audio("logo.png", &AudioMix::default()).unwrap_err();
        assert!(matches!(err, ReelcutError::MissingStream { stream: StreamKind::Audio, .. }));

        editor.mix_audio("song.mp3", &AudioMix::default()).unwrap();
        let command = editor.plan(out("mix.mp4"), None).unwrap();
        assert_eq!(
            command.filter_complex.as_deref(),
            Some("[0:a][1:a]amix=inputs=2:duration=longest[0_0:a]")
        );
    }

    #[test]
    fn test_mute_drops_audio_fragments() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        editor.volume(&Volume::new(2)).unwrap().negate(&Negate::default()).unwrap();
        editor.mute();

        let command = editor.plan(out("muted.mp4"), None).unwrap();
        let graph = command.filter_complex.clone().unwrap();
        assert!(!graph.contains("volume"));
        assert!(command.map_audio.is_none());
        assert!(command.output_args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_bad_output_paths() {
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        assert!(matches!(
            editor.plan("", None),
            Err(ReelcutError::InvalidOutputPath { .. })
        ));
        assert!(matches!(
            editor.plan(".", None),
            Err(ReelcutError::InvalidOutputPath { .. })
        ));
        assert!(matches!(
            editor.plan(out("noext"), None),
            Err(ReelcutError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_plan_creates_output_directory() {
        let dir = std::env::temp_dir().join("reelcut_editor_mkdir").join("nested");
        let _ = std::fs::remove_dir_all(&dir);
        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        editor.plan(dir.join("out.mp4"), None).unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test]
    async fn test_render_reports_the_failed_command() {
        let mut config = AppConfig::default();
        config.engine.ffmpeg = PathBuf::from("/nonexistent/ffmpeg");

        let mut editor = MediaEditor::open("clip.mp4", prober()).unwrap();
        editor.grayscale(&Grayscale).unwrap();
        let err = editor
            .render(out("render.mp4"), None, &config)
            .await
            .unwrap_err();
        match err {
            ReelcutError::Command { command, .. } => {
                assert!(command.starts_with("/nonexistent/ffmpeg -y -i clip.mp4"));
                assert!(command.contains("format=gray"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_render_keeps_an_explicit_policy() {
        let mut config = AppConfig::default();
        config.engine.ffmpeg = PathBuf::from("/nonexistent/ffmpeg");
        config.defaults.video_bitrate = "2M".to_string();

        let policy = OutputPolicy {
            video_bitrate: "7M".to_string(),
            ..OutputPolicy::default()
        };
        let mut editor = MediaEditor::open("clip.mp4", prober())
            .unwrap()
            .with_policy(policy);
        editor.grayscale(&Grayscale).unwrap();
        let err = editor
            .render(out("policy.mp4"), None, &config)
            .await
            .unwrap_err();
        match err {
            ReelcutError::Command { command, .. } => {
                assert!(command.contains("-b:v 7M"));
                assert!(!command.contains("-b:v 2M"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trim_through_apply_suppresses_still_duration() {
        let mut editor = MediaEditor::open("logo.png", prober()).unwrap();
        editor.apply(&Trim::starting_for(0, 2)).unwrap();

        let command = editor.plan(out("trimmed-logo.mp4"), None).unwrap();
        assert_eq!(
            command.filter_complex.as_deref(),
            Some("[0:v]trim=start=0:duration=2,setpts=PTS-STARTPTS[0_0:v]")
        );
        assert_eq!(command.duration, None);
        assert!(!command.output_args.contains(&"-t".to_string()));
    }

    #[test]
    fn test_untrimmed_still_gets_default_duration() {
        let mut editor = MediaEditor::open("logo.png", prober()).unwrap();
        editor.apply(&Grayscale).unwrap();

        let command = editor.plan(out("gray-logo.mp4"), None).unwrap();
        assert_eq!(command.duration, Some(5.0));
    }

    #[test]
    fn test_join_output_path() {
        assert_eq!(
            join_output_path(["renders", "2024", "final.mp4"]).unwrap(),
            PathBuf::from("renders/2024/final.mp4")
        );
        assert!(join_output_path(Vec::<&str>::new()).is_err());
    }
}
