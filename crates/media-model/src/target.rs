//! Output container lookup from a file extension.

use std::path::Path;

use reelcut_common::error::{ReelcutError, ReelcutResult};
use serde::{Deserialize, Serialize};

/// Broad category of an output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Single still frame (png, jpg, ...).
    StillImage,
    /// Motion without audio (gif).
    AnimatedImage,
    Video,
    Audio,
}

impl TargetKind {
    /// Whether the output has a time axis.
    pub fn is_motion(self) -> bool {
        matches!(self, TargetKind::AnimatedImage | TargetKind::Video)
    }

    /// Whether the container can carry an audio stream.
    pub fn carries_audio(self) -> bool {
        matches!(self, TargetKind::Video | TargetKind::Audio)
    }

    /// Whether the container can carry a visual stream.
    pub fn carries_video(self) -> bool {
        !matches!(self, TargetKind::Audio)
    }

    /// Whether sources are muxed into a real container, where stream copy applies.
    pub fn is_container(self) -> bool {
        matches!(self, TargetKind::Video | TargetKind::Audio)
    }
}

/// Resolved output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    pub extension: &'static str,
    pub mime: &'static str,
    pub kind: TargetKind,
}

const FORMATS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("flv", "video/x-flv"),
    ("wmv", "video/x-ms-wmv"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("ts", "video/mp2t"),
    ("m2ts", "video/mp2t"),
    ("3gp", "video/3gpp"),
    ("ogv", "video/ogg"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("weba", "audio/webm"),
    ("gif", "image/gif"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("avif", "image/avif"),
];

impl TargetFormat {
    /// Look up a lowercase extension without the leading dot.
    pub fn from_extension(extension: &str) -> ReelcutResult<Self> {
        let lower = extension.to_ascii_lowercase();
        let (ext, mime) = FORMATS
            .iter()
            .find(|(ext, _)| *ext == lower)
            .copied()
            .ok_or_else(|| ReelcutError::UnknownFormat {
                extension: extension.to_string(),
            })?;
        Ok(Self {
            extension: ext,
            mime,
            kind: kind_for_mime(mime),
        })
    }

    /// Resolve the format of an output path.
    pub fn from_path(path: &Path) -> ReelcutResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| ReelcutError::InvalidExtension {
                extension: String::new(),
            })?;
        Self::from_extension(extension)
    }
}

fn kind_for_mime(mime: &str) -> TargetKind {
    if mime == "image/gif" {
        TargetKind::AnimatedImage
    } else if mime.starts_with("image/") {
        TargetKind::StillImage
    } else if mime.starts_with("audio/") {
        TargetKind::Audio
    } else {
        TargetKind::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(TargetFormat::from_extension("mp4").unwrap().kind, TargetKind::Video);
        assert_eq!(TargetFormat::from_extension("GIF").unwrap().kind, TargetKind::AnimatedImage);
        assert_eq!(TargetFormat::from_extension("png").unwrap().kind, TargetKind::StillImage);
        assert_eq!(TargetFormat::from_extension("flac").unwrap().kind, TargetKind::Audio);
    }

    #[test]
    fn test_gif_is_motion_without_audio() {
        let gif = TargetKind::AnimatedImage;
        assert!(gif.is_motion());
        assert!(!gif.carries_audio());
        assert!(gif.carries_video());
        assert!(!gif.is_container());
    }

    #[test]
    fn test_missing_extension() {
        let err = TargetFormat::from_path(Path::new("out/video")).unwrap_err();
        assert!(matches!(err, ReelcutError::InvalidExtension { .. }));
    }

    #[test]
    fn test_unknown_extension() {
        let err = TargetFormat::from_path(Path::new("out/video.xyz")).unwrap_err();
        assert!(matches!(err, ReelcutError::UnknownFormat { extension } if extension == "xyz"));
    }
}
