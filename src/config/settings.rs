//! Configuration settings for Destil.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub subtitles: SubtitleSettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (downloaded subtitle tracks).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.destil".to_string(),
            temp_dir: "/tmp/destil".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Model gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Override for the API base URL. None uses the hosted OpenAI API;
    /// set to e.g. "http://localhost:1234/v1" for LM Studio or Ollama.
    pub base_url: Option<String>,
    /// Model name to request.
    pub model: String,
    /// Per-request timeout. Local models can be slow, so this is long but finite.
    pub timeout_seconds: u64,
    /// Per-stage sampling temperatures.
    pub temperature: StageTemperatures,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 600,
            temperature: StageTemperatures::default(),
        }
    }
}

impl ModelSettings {
    /// Whether the hosted OpenAI API is in use (requires an API key).
    pub fn uses_hosted_api(&self) -> bool {
        self.base_url.is_none()
    }
}

/// Sampling temperature per pipeline stage.
///
/// Classification, extraction and audit favor consistent parseable output;
/// synthesis trades determinism for fluency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTemperatures {
    pub classify: f32,
    pub extract: f32,
    pub synthesize: f32,
    pub audit: f32,
}

impl Default for StageTemperatures {
    fn default() -> Self {
        Self {
            classify: 0.1,
            extract: 0.1,
            synthesize: 0.4,
            audit: 0.1,
        }
    }
}

/// Subtitle acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Preferred subtitle languages, in order (passed to yt-dlp).
    pub languages: Vec<String>,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

/// Pipeline tuning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Minimum cleaned-text length; shorter content fails before any model call.
    pub min_content_chars: usize,
    /// How much of the cleaned text the classifier sees.
    pub classify_sample_chars: usize,
    /// Directory where knowledge documents are written.
    pub output_dir: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_content_chars: 50,
            classify_sample_chars: 2000,
            output_dir: "~/.destil/output".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DistillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("destil")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.pipeline.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.min_content_chars, 50);
        assert_eq!(settings.pipeline.classify_sample_chars, 2000);
        assert_eq!(settings.model.temperature.classify, 0.1);
        assert_eq!(settings.model.temperature.synthesize, 0.4);
        assert!(settings.model.uses_hosted_api());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            base_url = "http://localhost:1234/v1"
            model = "local-model"
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.model, "local-model");
        assert!(!settings.model.uses_hosted_api());
        assert_eq!(settings.model.timeout_seconds, 600);
        assert_eq!(settings.subtitles.languages, vec!["en".to_string()]);
    }
}
