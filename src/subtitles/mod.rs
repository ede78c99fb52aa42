//! Subtitle acquisition for Destil.
//!
//! Provides a trait-based interface for turning an identifier (YouTube URL,
//! video ID, or local file path) into raw subtitle text.

mod local;
mod youtube;

pub use local::LocalSubtitles;
pub use youtube::YoutubeSubtitles;

use crate::config::Settings;
use crate::error::{DistillError, Result};
use async_trait::async_trait;

/// Trait for subtitle source providers.
#[async_trait]
pub trait SubtitleSource: Send + Sync {
    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Fetch raw subtitle text for the given identifier.
    async fn acquire(&self, input: &str) -> Result<String>;
}

/// Source that dispatches to the first implementation able to handle the input.
pub struct AutoSource {
    sources: Vec<Box<dyn SubtitleSource>>,
}

impl AutoSource {
    /// Build the default source chain from settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            sources: vec![
                Box::new(YoutubeSubtitles::new(
                    settings.subtitles.languages.clone(),
                    settings.temp_dir(),
                )),
                Box::new(LocalSubtitles::new()),
            ],
        }
    }
}

#[async_trait]
impl SubtitleSource for AutoSource {
    fn can_handle(&self, input: &str) -> bool {
        self.sources.iter().any(|s| s.can_handle(input))
    }

    async fn acquire(&self, input: &str) -> Result<String> {
        let source = self
            .sources
            .iter()
            .find(|s| s.can_handle(input))
            .ok_or_else(|| {
                DistillError::InvalidInput(format!(
                    "Could not parse input as a video URL/ID or subtitle file: {}",
                    input
                ))
            })?;

        source.acquire(input).await
    }
}
