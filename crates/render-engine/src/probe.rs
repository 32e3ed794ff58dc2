//! Source metadata providers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_media_model::{ProbeReport, StreamSummary};

/// Something that can describe the streams of a media file.
pub trait Prober: Send + Sync {
    fn probe(&self, path: &Path) -> ReelcutResult<StreamSummary>;
}

/// Runs `ffprobe` and reduces its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl FfprobeProber {
    pub fn is_available(&self) -> bool {
        crate::runner::binary_available(&self.binary)
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> ReelcutResult<StreamSummary> {
        if !path.exists() {
            return Err(ReelcutError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(binary = %self.binary.display(), path = %path.display(), "Probing source");
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| ReelcutError::metadata(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(ReelcutError::metadata(format!(
                "ffprobe exited with {} for {}: {}",
                output.status,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let report = ProbeReport::from_json(&raw)
            .map_err(|e| ReelcutError::metadata(format!("Unreadable ffprobe report: {e}")))?;
        Ok(report.summary())
    }
}

/// Fixed summaries keyed by path.
#[derive(Debug, Clone, Default)]
pub struct StaticProber {
    summaries: HashMap<PathBuf, StreamSummary>,
}

impl StaticProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, summary: StreamSummary) -> Self {
        self.insert(path, summary);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, summary: StreamSummary) {
        self.summaries.insert(path.into(), summary);
    }
}

impl Prober for StaticProber {
    fn probe(&self, path: &Path) -> ReelcutResult<StreamSummary> {
        self.summaries
            .get(path)
            .cloned()
            .ok_or_else(|| ReelcutError::FileNotFound {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_prober_lookup() {
        let prober = StaticProber::new().with("a.png", StreamSummary::image(10, 10));
        assert_eq!(prober.probe(Path::new("a.png")).unwrap().width, Some(10));
        assert!(matches!(
            prober.probe(Path::new("b.png")),
            Err(ReelcutError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_ffprobe_missing_file_fails_before_spawning() {
        let prober = FfprobeProber::new("/nonexistent/ffprobe");
        assert!(!prober.is_available());
        let err = prober
            .probe(Path::new("/nonexistent/reelcut-input.mp4"))
            .unwrap_err();
        assert!(matches!(err, ReelcutError::FileNotFound { .. }));
    }
}
