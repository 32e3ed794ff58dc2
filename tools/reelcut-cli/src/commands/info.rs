//! Probe a source and print its stream summary.

use std::path::PathBuf;

use reelcut_common::config::AppConfig;
use reelcut_media_model::MediaType;
use reelcut_render_engine::{FfprobeProber, Prober};

pub fn run(config: &AppConfig, path: PathBuf, json: bool) -> anyhow::Result<()> {
    let prober = FfprobeProber::new(config.engine.ffprobe.clone());
    let summary = prober
        .probe(&path)
        .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let media_type = MediaType::from_summary(&summary)
        .map(MediaType::as_str)
        .unwrap_or("unknown");

    println!("Source: {}", path.display());
    println!("  Type: {media_type}");
    if let Some(format) = &summary.format_name {
        println!("  Container: {format}");
    }
    if let Some(duration) = summary.duration {
        println!("  Duration: {duration:.2}s");
    }
    if let Some(size) = summary.size {
        println!("  Size: {size} bytes");
    }
    println!();

    if summary.has_video {
        println!("Video:");
        if let (Some(w), Some(h)) = (summary.width, summary.height) {
            println!("  Resolution: {w}x{h}");
        }
        if let Some(ratio) = &summary.aspect_ratio {
            println!("  Aspect ratio: {ratio}");
        }
        if let Some(fps) = summary.frame_rate {
            println!("  Frame rate: {fps:.3}");
        }
        if let Some(frames) = summary.frame_count {
            println!("  Frames: {frames}");
        }
    }
    if summary.has_audio {
        println!("Audio:");
        if let Some(channels) = summary.audio_channels {
            println!("  Channels: {channels}");
        }
        if let Some(rate) = summary.audio_sample_rate {
            println!("  Sample rate: {rate} Hz");
        }
    }

    if !summary.tags.is_empty() {
        println!();
        println!("Tags:");
        for (key, value) in &summary.tags {
            println!("  {key}: {value}");
        }
    }

    Ok(())
}
