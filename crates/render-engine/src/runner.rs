//! Executes an assembled command.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::SystemTime;

use reelcut_common::error::{ReelcutError, ReelcutResult};

use crate::command::FfmpegCommand;

/// Progress reported while a render runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    /// Output timestamp reached so far.
    pub out_time_secs: f64,
    /// 0.0..=1.0 when the expected duration is known.
    pub fraction: Option<f64>,
    pub complete: bool,
}

/// Progress callback type.
pub type ProgressCallback = Arc<dyn Fn(RenderProgress) + Send + Sync>;

/// Something that can execute an [`FfmpegCommand`].
pub trait Runner: Send + Sync {
    fn run(&self, command: &FfmpegCommand) -> ReelcutResult<()>;

    /// Check if the underlying engine is present on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Runs the ffmpeg binary.
#[derive(Clone)]
pub struct FfmpegRunner {
    binary: PathBuf,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for FfmpegRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FfmpegRunner")
            .field("binary", &self.binary)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            progress: None,
        }
    }

    /// Report progress through `callback` (adds `-progress pipe:1 -nostats`).
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn program(&self) -> String {
        self.binary.to_string_lossy().into_owned()
    }
}

impl Runner for FfmpegRunner {
    fn run(&self, command: &FfmpegCommand) -> ReelcutResult<()> {
        let shell = command.shell_line(&self.program());
        let failure = |stderr: String| ReelcutError::Command {
            command: shell.clone(),
            stderr,
        };

        let mut args = Vec::new();
        if self.progress.is_some() {
            args.extend(["-progress", "pipe:1", "-nostats"].map(String::from));
        }
        args.extend(command.args());

        let before = modified_at(&command.output);
        tracing::debug!(args = ?args, "Running ffmpeg");

        let start = std::time::Instant::now();
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("<failed to start {}: {e}>", self.program())))?;

        tracing::info!(
            pid = child.id(),
            output = %command.output.display(),
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelcutError::internal("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelcutError::internal("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut state = ProgressState::default();
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            state.update(key, value);
            if key == "progress" {
                if let Some(callback) = &self.progress {
                    callback(state.report(command.duration));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| failure(format!("<failed to wait on ffmpeg: {e}>")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            tracing::error!(
                status = %status,
                elapsed_secs = start.elapsed().as_secs_f64(),
                "ffmpeg failed"
            );
            remove_partial_output(&command.output, before);
            return Err(failure(stderr_output.trim().to_string()));
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            output = %command.output.display(),
            "ffmpeg finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        binary_available(&self.binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Whether `binary` is an existing file (when given as a path) or resolves
/// through `PATH` (when given as a bare name).
pub fn binary_available(binary: &Path) -> bool {
    if binary.components().count() > 1 {
        return binary.is_file();
    }
    command_exists(&binary.to_string_lossy())
}

/// Whether `binary` resolves through `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Delete the output if this run created or touched it.
fn remove_partial_output(path: &Path, before: Option<SystemTime>) {
    let after = modified_at(path);
    if after.is_none() || after == before {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => tracing::warn!(path = %path.display(), "Removed partial output"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    fn report(&self, duration: Option<f64>) -> RenderProgress {
        let fraction = duration.filter(|secs| *secs > 0.0).map(|secs| {
            if self.complete {
                1.0
            } else {
                (self.out_time_secs / secs).clamp(0.0, 1.0)
            }
        });
        RenderProgress {
            out_time_secs: self.out_time_secs,
            fraction,
            complete: self.complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_for(output: PathBuf) -> FfmpegCommand {
        FfmpegCommand {
            input_args: vec!["-y".into(), "-i".into(), "in.mp4".into()],
            filter_complex: None,
            map_audio: None,
            map_video: None,
            output_args: Vec::new(),
            output,
            duration: None,
        }
    }

    #[test]
    fn test_progress_state_parsing() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        state.update("progress", "continue");
        let report = state.report(Some(10.0));
        assert_eq!(report.out_time_secs, 2.5);
        assert_eq!(report.fraction, Some(0.25));
        assert!(!report.complete);

        state.update("progress", "end");
        assert_eq!(state.report(Some(10.0)).fraction, Some(1.0));
        assert_eq!(state.report(None).fraction, None);
    }

    #[test]
    fn test_missing_binary_is_a_command_error() {
        let runner = FfmpegRunner::new("/nonexistent/ffmpeg");
        assert!(!runner.is_available());
        let output = std::env::temp_dir().join("reelcut_runner_missing.mp4");
        let err = runner.run(&command_for(output)).unwrap_err();
        match err {
            ReelcutError::Command { command, .. } => {
                assert!(command.starts_with("/nonexistent/ffmpeg -y -i in.mp4"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_removes_partial_output() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join("reelcut_runner_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let script = dir.join("fake-ffmpeg.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\necho partial > \"$last\"\necho 'encoder exploded' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = dir.join("out.mp4");
        let _ = std::fs::remove_file(&output);

        let runner = FfmpegRunner::new(&script);
        assert!(runner.is_available());
        let err = runner.run(&command_for(output.clone())).unwrap_err();
        assert!(matches!(
            err,
            ReelcutError::Command { ref stderr, .. } if stderr == "encoder exploded"
        ));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
