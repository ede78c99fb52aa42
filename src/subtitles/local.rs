//! Local subtitle file source implementation.

use super::SubtitleSource;
use crate::error::{DistillError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Supported subtitle/transcript file extensions.
const SUBTITLE_EXTENSIONS: &[&str] = &["vtt", "srt", "txt"];

/// Local file source for subtitle and transcript files.
pub struct LocalSubtitles;

impl LocalSubtitles {
    pub fn new() -> Self {
        Self
    }

    /// Check if path is a supported subtitle file.
    fn is_subtitle_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl Default for LocalSubtitles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubtitleSource for LocalSubtitles {
    fn can_handle(&self, input: &str) -> bool {
        let path = Path::new(input);
        Self::is_subtitle_file(path) && path.exists()
    }

    async fn acquire(&self, input: &str) -> Result<String> {
        let path = Path::new(input);

        if !path.exists() {
            return Err(DistillError::Acquisition(format!(
                "File not found: {}",
                input
            )));
        }

        if !Self::is_subtitle_file(path) {
            return Err(DistillError::InvalidInput(format!(
                "Not a recognized subtitle or transcript file: {}",
                input
            )));
        }

        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_subtitle_file() {
        assert!(LocalSubtitles::is_subtitle_file(Path::new("track.vtt")));
        assert!(LocalSubtitles::is_subtitle_file(Path::new("track.SRT")));
        assert!(LocalSubtitles::is_subtitle_file(Path::new("/path/to/notes.txt")));
        assert!(!LocalSubtitles::is_subtitle_file(Path::new("video.mp4")));
        assert!(!LocalSubtitles::is_subtitle_file(Path::new("document.pdf")));
    }

    #[tokio::test]
    async fn test_acquire_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.vtt");
        std::fs::write(&path, "WEBVTT\n\nsome subtitle text").unwrap();

        let source = LocalSubtitles::new();
        let input = path.to_string_lossy().to_string();

        assert!(source.can_handle(&input));
        let content = source.acquire(&input).await.unwrap();
        assert!(content.contains("some subtitle text"));
    }

    #[tokio::test]
    async fn test_acquire_missing_file_fails() {
        let source = LocalSubtitles::new();
        let err = source.acquire("/nonexistent/talk.vtt").await.unwrap_err();
        assert!(matches!(err, DistillError::Acquisition(_)));
    }
}
