//! YouTube subtitle source implementation.

use super::SubtitleSource;
use crate::error::{DistillError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, info};

/// Fetches subtitle tracks from YouTube using yt-dlp.
///
/// Prefers uploaded subtitles, falls back to auto-generated captions within
/// the same yt-dlp invocation. No transcription fallback: a video without a
/// subtitle track in the requested languages is an acquisition failure.
pub struct YoutubeSubtitles {
    video_id_regex: Regex,
    languages: Vec<String>,
    temp_dir: PathBuf,
}

impl YoutubeSubtitles {
    pub fn new(languages: Vec<String>, temp_dir: PathBuf) -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            video_id_regex,
            languages,
            temp_dir,
        }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Fetch the subtitle track for a video ID via yt-dlp.
    async fn fetch_subtitles(&self, video_id: &str) -> Result<String> {
        std::fs::create_dir_all(&self.temp_dir)?;
        self.remove_leftovers(video_id);

        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = self.temp_dir.join(format!("subs_{}.%(id)s", video_id));
        let languages = self.languages.join(",");

        info!("Fetching subtitles for {} (languages: {})", video_id, languages);

        let result = tokio::process::Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-lang").arg(&languages)
            .arg("--sub-format").arg("vtt")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--output").arg(template.to_str().unwrap_or_default())
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DistillError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(DistillError::Acquisition(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DistillError::Acquisition(format!("yt-dlp failed: {stderr}")));
        }

        let subtitle_path = self.find_subtitle_file(video_id)?;
        debug!("Reading subtitle file {:?}", subtitle_path);

        let content = std::fs::read_to_string(&subtitle_path)?;
        let _ = std::fs::remove_file(&subtitle_path);

        Ok(content)
    }

    /// Locate the .vtt file yt-dlp produced for this video.
    fn find_subtitle_file(&self, video_id: &str) -> Result<PathBuf> {
        let prefix = format!("subs_{}", video_id);

        let entries = std::fs::read_dir(&self.temp_dir)
            .map_err(|e| DistillError::Acquisition(format!("Cannot read temp directory: {e}")))?;

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(".vtt") {
                return Ok(entry.path());
            }
        }

        Err(DistillError::Acquisition(format!(
            "No subtitle track found for video {} (languages: {})",
            video_id,
            self.languages.join(",")
        )))
    }

    /// Drop subtitle files left over from a previous run of this video.
    fn remove_leftovers(&self, video_id: &str) {
        let prefix = format!("subs_{}", video_id);
        if let Ok(entries) = std::fs::read_dir(&self.temp_dir) {
            for entry in entries.flatten() {
                if entry.file_name().to_string_lossy().starts_with(&prefix) {
                    let _ = std::fs::remove_file(entry.path());
                }
            }
        }
    }
}

#[async_trait]
impl SubtitleSource for YoutubeSubtitles {
    fn can_handle(&self, input: &str) -> bool {
        self.extract_video_id(input).is_some()
    }

    async fn acquire(&self, input: &str) -> Result<String> {
        let video_id = self.extract_video_id(input).ok_or_else(|| {
            DistillError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })?;

        self.fetch_subtitles(&video_id).await
    }
}
