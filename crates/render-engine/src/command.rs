//! The assembled ffmpeg invocation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A fully resolved command: owners are input indices, every default applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FfmpegCommand {
    pub input_args: Vec<String>,
    pub filter_complex: Option<String>,
    pub map_audio: Option<String>,
    pub map_video: Option<String>,
    pub output_args: Vec<String>,
    pub output: PathBuf,
    /// Expected output length, when known. Used for progress reporting.
    pub duration: Option<f64>,
}

impl FfmpegCommand {
    /// The argv list, without the program name. The filtergraph is one argument.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.input_args.clone();
        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }
        for tag in [&self.map_audio, &self.map_video].into_iter().flatten() {
            args.push("-map".to_string());
            args.push(tag.clone());
        }
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }

    /// Shell form with a custom program name.
    pub fn shell_line(&self, program: &str) -> String {
        let mut line = shell_quote(program);
        let mut args = self.args().into_iter().peekable();
        while let Some(arg) = args.next() {
            line.push(' ');
            if arg == "-filter_complex" {
                if let Some(graph) = args.next() {
                    line.push_str(&format!("-filter_complex \"{}\"", double_quote_escape(&graph)));
                    continue;
                }
            }
            line.push_str(&shell_quote(&arg));
        }
        line
    }
}

impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shell_line("ffmpeg"))
    }
}

/// Escape the characters sh still interprets inside double quotes.
fn double_quote_escape(arg: &str) -> String {
    let mut escaped = String::with_capacity(arg.len());
    for c in arg.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> FfmpegCommand {
        FfmpegCommand {
            input_args: vec!["-y".into(), "-i".into(), "in put.mp4".into()],
            filter_complex: Some("[0:v]hflip[0_0:v]".into()),
            map_audio: Some("0:a?".into()),
            map_video: Some("[0_0:v]".into()),
            output_args: vec!["-c:a".into(), "copy".into()],
            output: PathBuf::from("out/final.mp4"),
            duration: None,
        }
    }

    #[test]
    fn test_args_keep_graph_as_single_argument() {
        assert_eq!(
            command().args(),
            vec![
                "-y",
                "-i",
                "in put.mp4",
                "-filter_complex",
                "[0:v]hflip[0_0:v]",
                "-map",
                "0:a?",
                "-map",
                "[0_0:v]",
                "-c:a",
                "copy",
                "out/final.mp4"
            ]
        );
    }

    #[test]
    fn test_display_quotes_for_the_shell() {
        assert_eq!(
            command().to_string(),
            "ffmpeg -y -i 'in put.mp4' -filter_complex \"[0:v]hflip[0_0:v]\" -map '0:a?' -map '[0_0:v]' -c:a copy out/final.mp4"
        );
    }

    #[test]
    fn test_display_keeps_graph_backslashes() {
        let escaped = FfmpegCommand {
            filter_complex: Some(r"[0:v]drawtext=text=a\\: $5[0_0:v]".into()),
            ..command()
        };
        assert!(escaped
            .to_string()
            .contains(r#"-filter_complex "[0:v]drawtext=text=a\\\\: \$5[0_0:v]""#));
    }

    #[test]
    fn test_no_graph_no_maps() {
        let bare = FfmpegCommand {
            filter_complex: None,
            map_audio: None,
            map_video: None,
            ..command()
        };
        assert_eq!(bare.args(), vec!["-y", "-i", "in put.mp4", "-c:a", "copy", "out/final.mp4"]);
    }

    #[test]
    fn test_serializes_for_inspection() {
        let value = serde_json::to_value(command()).unwrap();
        assert_eq!(value["map_video"], "[0_0:v]");
        assert_eq!(value["output"], "out/final.mp4");
        assert!(value["duration"].is_null());
    }
}
