//! Property tests over the stateless formatters.

use proptest::prelude::*;
use reelcut_filters::{Crop, Filter, Param, Scale, Speed, Trim};
use reelcut_media_model::StreamSummary;

fn atempo_factors(chain: &str) -> Vec<f64> {
    chain
        .split(',')
        .filter_map(|step| step.strip_prefix("atempo="))
        .map(|value| value.parse::<f64>().unwrap())
        .collect()
}

proptest! {
    #[test]
    fn speed_atempo_steps_stay_in_range(factor in 0.1f64..100.0) {
        let speed = Speed { factor };
        prop_assert!(speed.validate().is_ok());

        let out = speed.build(&StreamSummary::default());
        if factor == 1.0 {
            prop_assert!(out.is_empty());
        } else {
            let steps = atempo_factors(out.audio.as_deref().unwrap());
            prop_assert!(!steps.is_empty());
            for step in &steps {
                prop_assert!((0.5..=2.0).contains(step), "step {} out of range", step);
            }
            let product: f64 = steps.iter().product();
            prop_assert!((product - factor).abs() / factor < 0.02,
                "product {} vs factor {}", product, factor);
        }
    }

    #[test]
    fn scale_numeric_sides_are_even(width in 11u32..8000, height in 11u32..8000) {
        let scale = Scale::size(Some(Param::from(width)), Some(Param::from(height)));
        prop_assert!(scale.validate().is_ok());

        let video = scale.build(&StreamSummary::default()).video.unwrap();
        let dims = video.strip_prefix("scale=").unwrap();
        let (w, h) = dims.split_once(':').unwrap();
        let (w, h): (u32, u32) = (w.parse().unwrap(), h.parse().unwrap());
        prop_assert_eq!(w % 2, 0);
        prop_assert_eq!(h % 2, 0);
        prop_assert!(w >= width && w - width <= 1);
        prop_assert!(h >= height && h - height <= 1);
    }

    #[test]
    fn trim_pairs_video_and_audio(start in 0.0f64..100.0, len in 0.1f64..100.0) {
        let trim = Trim::starting_for(start, len);
        prop_assert!(trim.validate().is_ok());

        let out = trim.build(&StreamSummary::default());
        let audio = out.audio.unwrap();
        let video = out.video.unwrap();
        prop_assert!(video.ends_with(",setpts=PTS-STARTPTS"));
        prop_assert!(audio.ends_with(",asetpts=PTS-STARTPTS"));
        prop_assert_eq!(audio, format!("a{}", video.replace(",setpts", ",asetpts")));
    }

    #[test]
    fn crop_aspect_fits_inside_source(w in 16u32..4000, h in 16u32..4000, aw in 1u32..32, ah in 1u32..32) {
        let crop = Crop::aspect(format!("{aw}:{ah}"));
        prop_assert!(crop.validate().is_ok());

        let source = StreamSummary::video(w, h, 1.0, 25.0, false);
        let video = crop.build(&source).video.unwrap();
        let landscape_enough = f64::from(w) / f64::from(h) >= f64::from(aw) / f64::from(ah);
        if landscape_enough {
            prop_assert!(video.starts_with("crop=w=ih*"));
        } else {
            prop_assert!(video.starts_with("crop=w=iw:h=iw*"));
        }
    }
}

#[test]
fn options_deserialize_from_camel_case_json() {
    let crop: Crop = serde_json::from_str(r#"{"aspectRatio":"9:16","x":0}"#).unwrap();
    assert!(crop.validate().is_ok());
    assert_eq!(crop.aspect_ratio.as_deref(), Some("9:16"));

    let trim: Trim = serde_json::from_str(r#"{"start":"00:00:02","end":8,"stream":"video"}"#).unwrap();
    assert!(trim.validate().is_ok());
    assert_eq!(trim.end, Some(Param::Num(8.0)));
}
