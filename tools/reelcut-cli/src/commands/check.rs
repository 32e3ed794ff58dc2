//! Check that the configured engine binaries are available.

use reelcut_common::config::{config_file_path, AppConfig};
use reelcut_render_engine::{FfmpegRunner, FfprobeProber, Runner};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Reelcut System Check");
    println!("{}", "=".repeat(50));
    println!("Config: {}", config_file_path().display());
    println!();

    let ffmpeg = FfmpegRunner::new(config.engine.ffmpeg.clone());
    let ffmpeg_ok = ffmpeg.is_available();
    report(ffmpeg.name(), &config.engine.ffmpeg.display().to_string(), ffmpeg_ok);

    let ffprobe_ok = FfprobeProber::new(config.engine.ffprobe.clone()).is_available();
    report("ffprobe", &config.engine.ffprobe.display().to_string(), ffprobe_ok);

    println!();
    println!("Output defaults:");
    println!("  Still-image duration: {}s", config.defaults.still_image_duration_secs);
    println!("  Audio bitrate: {}", config.defaults.audio_bitrate);
    println!("  Video bitrate: {}", config.defaults.video_bitrate);
    println!(
        "  Pixel format: {} (with {})",
        config.defaults.pixel_format, config.defaults.default_video_codec
    );

    println!();
    if ffmpeg_ok && ffprobe_ok {
        println!("All required tools are available. Reelcut is ready.");
        Ok(())
    } else {
        anyhow::bail!("Some required tools are missing. See above for details.")
    }
}

fn report(name: &str, binary: &str, available: bool) {
    if available {
        println!("[OK] {name}: {binary}");
    } else {
        println!("[MISSING] {name}: {binary}");
    }
}
