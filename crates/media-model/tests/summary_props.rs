use std::path::PathBuf;

use proptest::prelude::*;

use reelcut_media_model::{MediaType, MediaInput, ProbeReport, StreamSummary};

fn recorded(name: &str) -> ProbeReport {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("probe")
        .join(name);
    let raw = std::fs::read_to_string(path).expect("fixture should be readable");
    ProbeReport::from_json(&raw).expect("fixture should parse")
}

#[test]
fn webm_without_frame_count_is_video() {
    let summary = recorded("screencast.json").summary();
    assert_eq!(summary.frame_count, None);
    assert_eq!(summary.duration, Some(120.5));
    assert_eq!(summary.frame_rate, Some(30.0));

    let input = MediaInput::from_summary("screencast.webm", summary).unwrap();
    assert_eq!(input.media_type, MediaType::Video);
}

#[test]
fn png_probe_is_image() {
    let input = MediaInput::from_summary("slide.png", recorded("slide.json").summary()).unwrap();
    assert!(input.is_image());
}

proptest! {
    #[test]
    fn classification_never_panics_and_respects_streams(
        has_audio in any::<bool>(),
        has_video in any::<bool>(),
        frames in proptest::option::of(0u64..10_000),
        duration in proptest::option::of(0.0f64..3600.0),
    ) {
        let summary = StreamSummary {
            has_audio,
            has_video,
            frame_count: frames,
            duration,
            ..StreamSummary::default()
        };

        match MediaType::from_summary(&summary) {
            Ok(MediaType::Audio) => prop_assert!(has_audio && !has_video),
            Ok(MediaType::Image) | Ok(MediaType::Video) => prop_assert!(has_video),
            Err(_) => prop_assert!(!has_audio && !has_video),
        }
    }

    #[test]
    fn timed_streams_with_a_rate_are_video(
        secs in 1.0f64..7200.0,
        rate in 1.0f64..120.0,
    ) {
        let summary = StreamSummary {
            has_video: true,
            duration: Some(secs),
            frame_rate: Some(rate),
            ..StreamSummary::default()
        };
        prop_assert_eq!(MediaType::from_summary(&summary).unwrap(), MediaType::Video);
    }

    #[test]
    fn frame_rate_parses_any_positive_rational(num in 1u32..240_000, den in 1u32..10_000) {
        let raw = format!(
            r#"{{"streams":[{{"codec_type":"video","r_frame_rate":"{num}/{den}"}}],"format":{{}}}}"#
        );
        let summary = ProbeReport::from_json(&raw).unwrap().summary();
        let expected = num as f64 / den as f64;
        prop_assert!((summary.frame_rate.unwrap() - expected).abs() < 1e-9);
    }
}
