//! End-to-end planning against recorded ffprobe reports.

use std::path::PathBuf;
use std::sync::Arc;

use reelcut_common::error::{ReelcutError, StreamKind};
use reelcut_filters::{Crop, Fade, FadeKind, Overlay, Trim, Volume};
use reelcut_media_model::{OutputOptions, ProbeReport};
use reelcut_render_engine::{MediaEditor, Prober, StaticProber};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("probe")
        .join(name)
}

fn recorded(name: &str) -> reelcut_media_model::StreamSummary {
    let raw = std::fs::read_to_string(fixture(name)).expect("fixture should be readable");
    ProbeReport::from_json(&raw).expect("fixture should parse").summary()
}

fn prober() -> Arc<dyn Prober> {
    reelcut_common::logging::init_default_logging();
    Arc::new(
        StaticProber::new()
            .with("interview.mp4", recorded("interview.json"))
            .with("slide-1.png", recorded("slide.json"))
            .with("slide-2.png", recorded("slide.json"))
            .with("narration.mp3", recorded("narration.json"))
            .with("screencast.webm", recorded("screencast.json")),
    )
}

fn output(name: &str) -> PathBuf {
    std::env::temp_dir().join("reelcut_scenarios").join(name)
}

#[test]
fn two_images_into_gif_loop_for_default_duration() {
    let mut editor = MediaEditor::open("slide-1.png", prober()).unwrap();
    editor.overlay("slide-2.png", &Overlay::default()).unwrap();

    let command = editor.plan(output("slides.gif"), None).unwrap();
    let args = command.args();

    assert_eq!(args.iter().filter(|a| *a == "-loop").count(), 3);
    assert_eq!(
        command.input_args,
        vec!["-y", "-loop", "1", "-i", "slide-1.png", "-loop", "1", "-i", "slide-2.png"]
    );
    assert_eq!(
        command.filter_complex.as_deref(),
        Some("[0:v][1:v]overlay=x=0:y=0[0_0:v]")
    );
    assert!(command.map_audio.is_none());
    assert_eq!(command.map_video.as_deref(), Some("[0_0:v]"));
    assert_eq!(
        command.output_args,
        vec!["-loop", "0", "-t", "5", "-shortest"]
    );
    assert_eq!(command.duration, Some(5.0));
}

#[test]
fn volume_and_crop_on_video_map_both_tags() {
    let mut editor = MediaEditor::open("interview.mp4", prober()).unwrap();
    editor
        .volume(&Volume::new(0.5))
        .unwrap()
        .crop(&Crop::region(640, 360))
        .unwrap();

    let command = editor.plan(output("interview-crop.mp4"), None).unwrap();
    assert_eq!(
        command.filter_complex.as_deref(),
        Some("[0:a]volume=0.5[0_0:a];[0:v]crop=w=640:h=360[0_1:v]")
    );
    assert_eq!(command.map_audio.as_deref(), Some("[0_0:a]"));
    assert_eq!(command.map_video.as_deref(), Some("[0_1:v]"));
    assert!(command.to_string().starts_with(
        "ffmpeg -y -i interview.mp4 -filter_complex \"[0:a]volume=0.5[0_0:a];[0:v]crop=w=640:h=360[0_1:v]\" \
         -map '[0_0:a]' -map '[0_1:v]' -b:a 96k -b:v 1M -pix_fmt yuv420p -shortest "
    ));
}

#[test]
fn video_filter_on_audio_only_source_names_the_filter() {
    let mut editor = MediaEditor::open("narration.mp3", prober()).unwrap();
    let err = editor.crop(&Crop::aspect("16:9")).unwrap_err();
    assert!(matches!(
        err,
        ReelcutError::MissingStream { stream: StreamKind::Video, ref filter } if filter == "crop"
    ));
    assert_eq!(err.to_string(), "Missing video stream for filter \"crop\"");
}

#[test]
fn explicit_duration_overrides_still_image_default() {
    let mut editor = MediaEditor::open("slide-1.png", prober()).unwrap();
    editor
        .fade(&Fade::new(FadeKind::In, 0.0, 1.0))
        .unwrap();

    let options = OutputOptions::new().duration(3.0);
    let command = editor.plan(output("slide.mp4"), Some(&options)).unwrap();
    assert_eq!(command.duration, Some(3.0));
    let args = command.args();
    let t = args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(args[t + 1], "3");
    assert_eq!(args.iter().filter(|a| *a == "-t").count(), 1);
}

#[test]
fn trimmed_stills_get_no_synthesized_duration() {
    let mut editor = MediaEditor::open("slide-1.png", prober()).unwrap();
    editor.trim(&Trim::starting_for(0, 2)).unwrap();

    let command = editor.plan(output("trimmed-slide.mp4"), None).unwrap();
    assert_eq!(command.duration, None);
    assert!(!command.args().contains(&"-t".to_string()));
}

#[test]
fn audio_target_from_video_drops_video_fragments() {
    let mut editor = MediaEditor::open("interview.mp4", prober()).unwrap();
    editor
        .trim(&Trim::starting_for(2, 5))
        .unwrap()
        .crop(&Crop::region(640, 360))
        .unwrap();

    let command = editor.plan(output("interview.m4a"), None).unwrap();
    assert_eq!(
        command.filter_complex.as_deref(),
        Some("[0:a]atrim=start=2:duration=5,asetpts=PTS-STARTPTS[0_0:a]")
    );
    assert!(command.map_video.is_none());
    assert!(command.output_args.contains(&"-vn".to_string()));
}

#[test]
fn overwrite_disabled_uses_no_clobber_flag() {
    let mut editor = MediaEditor::open("interview.mp4", prober()).unwrap();
    let options = OutputOptions::new().overwrite(false);
    let command = editor.plan(output("keep.mkv"), Some(&options)).unwrap();
    assert_eq!(command.input_args[0], "-n");
}

#[test]
fn webm_source_is_stream_copied_without_still_handling() {
    let mut editor = MediaEditor::open("screencast.webm", prober()).unwrap();
    let command = editor.plan(output("screencast.mkv"), None).unwrap();

    assert_eq!(command.input_args, vec!["-y", "-i", "screencast.webm"]);
    assert_eq!(command.map_audio.as_deref(), Some("0:a?"));
    assert_eq!(command.map_video.as_deref(), Some("0:v?"));
    assert_eq!(command.output_args, vec!["-c:a", "copy", "-c:v", "copy", "-shortest"]);
    assert_eq!(command.duration, None);
}
