//! Error types for Destil.

use crate::pipeline::Stage;
use thiserror::Error;

/// Library-level error type for Destil operations.
#[derive(Error, Debug)]
pub enum DistillError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subtitle acquisition failed: {0}")]
    Acquisition(String),

    #[error("Sanitization failed: {0}")]
    Sanitization(String),

    #[error("Cleaned text too short ({length} chars, minimum {minimum})")]
    InsufficientContent { length: usize, minimum: usize },

    #[error("Classifier returned unparseable context: {message} | raw response: {raw}")]
    ContextParse { message: String, raw: String },

    #[error("Model call failed: {0}")]
    Model(String),

    #[error("Model returned a structurally empty response: {0}")]
    EmptyResponse(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<DistillError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DistillError {
    /// Wrap an error with the pipeline stage it occurred in.
    pub fn at_stage(stage: Stage, source: DistillError) -> Self {
        DistillError::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// The stage this error is tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DistillError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for Destil operations.
pub type Result<T> = std::result::Result<T, DistillError>;
