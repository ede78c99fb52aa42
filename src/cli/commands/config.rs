//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::DistillError;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            apply_setting(&mut settings, key, value)?;
            settings.save()?;

            Output::success(&format!("Set {} = {}", key, value));
            Output::kv(
                "Config file",
                &Settings::default_config_path().display().to_string(),
            );
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings.
///
/// Optional fields (model.base_url, prompts.custom_dir) are cleared by
/// setting an empty value; subtitles.languages takes a comma-separated list.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> crate::error::Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.temp_dir" => settings.general.temp_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),

        "model.base_url" => settings.model.base_url = optional(value),
        "model.model" => settings.model.model = value.to_string(),
        "model.timeout_seconds" => settings.model.timeout_seconds = parse_number(key, value)?,
        "model.temperature.classify" => {
            settings.model.temperature.classify = parse_temperature(key, value)?
        }
        "model.temperature.extract" => {
            settings.model.temperature.extract = parse_temperature(key, value)?
        }
        "model.temperature.synthesize" => {
            settings.model.temperature.synthesize = parse_temperature(key, value)?
        }
        "model.temperature.audit" => {
            settings.model.temperature.audit = parse_temperature(key, value)?
        }

        "subtitles.languages" => {
            let languages: Vec<String> = value
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if languages.is_empty() {
                return Err(DistillError::Config(format!(
                    "{} expects a comma-separated list of language codes, got '{}'",
                    key, value
                )));
            }
            settings.subtitles.languages = languages;
        }

        "pipeline.min_content_chars" => {
            settings.pipeline.min_content_chars = parse_number(key, value)?
        }
        "pipeline.classify_sample_chars" => {
            settings.pipeline.classify_sample_chars = parse_number(key, value)?
        }
        "pipeline.output_dir" => settings.pipeline.output_dir = value.to_string(),

        "prompts.custom_dir" => settings.prompts.custom_dir = optional(value),

        other => {
            return Err(DistillError::Config(format!(
                "Unknown configuration key: {}. Run 'destil config show' to see the available structure.",
                other
            )));
        }
    }

    Ok(())
}

/// Treat an empty value as clearing an optional field.
fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a numeric setting value.
fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> crate::error::Result<T> {
    value.parse().map_err(|_| {
        DistillError::Config(format!("{} expects a number, got '{}'", key, value))
    })
}

/// Parse a sampling temperature, bounded to [0, 1].
fn parse_temperature(key: &str, value: &str) -> crate::error::Result<f32> {
    let temperature: f32 = parse_number(key, value)?;
    if !(0.0..=1.0).contains(&temperature) {
        return Err(DistillError::Config(format!(
            "{} must be between 0.0 and 1.0, got {}",
            key, temperature
        )));
    }
    Ok(temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_string_value() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, "model.model", "gpt-4.1").unwrap();
        assert_eq!(settings.model.model, "gpt-4.1");
    }

    #[test]
    fn test_set_base_url_and_clear_it() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "model.base_url", "http://localhost:1234/v1").unwrap();
        assert_eq!(
            settings.model.base_url.as_deref(),
            Some("http://localhost:1234/v1")
        );
        assert!(!settings.model.uses_hosted_api());

        apply_setting(&mut settings, "model.base_url", "").unwrap();
        assert!(settings.model.uses_hosted_api());
    }

    #[test]
    fn test_set_numeric_values() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "pipeline.min_content_chars", "100").unwrap();
        assert_eq!(settings.pipeline.min_content_chars, 100);

        apply_setting(&mut settings, "model.timeout_seconds", "120").unwrap();
        assert_eq!(settings.model.timeout_seconds, 120);

        let err = apply_setting(&mut settings, "pipeline.min_content_chars", "lots").unwrap_err();
        assert!(matches!(err, DistillError::Config(_)));
    }

    #[test]
    fn test_set_temperature_is_bounded() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "model.temperature.synthesize", "0.7").unwrap();
        assert_eq!(settings.model.temperature.synthesize, 0.7);

        assert!(apply_setting(&mut settings, "model.temperature.audit", "1.5").is_err());
        assert!(apply_setting(&mut settings, "model.temperature.audit", "-0.1").is_err());
    }

    #[test]
    fn test_set_languages_splits_commas() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "subtitles.languages", "en, pt,es").unwrap();
        assert_eq!(
            settings.subtitles.languages,
            vec!["en".to_string(), "pt".to_string(), "es".to_string()]
        );

        assert!(apply_setting(&mut settings, "subtitles.languages", " , ").is_err());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut settings = Settings::default();
        let err = apply_setting(&mut settings, "model.flavor", "spicy").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }
}
