//! Distill command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Distiller;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

/// Run the distill command.
pub async fn run_distill(
    input: &str,
    output: Option<String>,
    language: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(lang) = language {
        settings.subtitles.languages = vec![lang];
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Distill, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'destil doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let distiller = Distiller::new(settings.clone())?;

    Output::info(&format!("Distilling {}", input));
    let start = Instant::now();

    match distiller.run(input).await {
        Ok(document) => {
            let path = resolve_output_path(output, &settings)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, &document)?;

            Output::success(&format!(
                "Distillation complete in {:.1}s",
                start.elapsed().as_secs_f64()
            ));
            Output::kv("Saved to", &path.display().to_string());
        }
        Err(e) => {
            Output::error(&format!("Pipeline failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Pick the output file path: explicit flag, or a timestamped file in the
/// configured output directory.
fn resolve_output_path(output: Option<String>, settings: &Settings) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(PathBuf::from(path)),
        None => {
            let dir = settings.output_dir();
            std::fs::create_dir_all(&dir)?;
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            Ok(dir.join(format!("knowledge_{}.md", timestamp)))
        }
    }
}
