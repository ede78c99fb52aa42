//! Configuration module for Destil.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AuditPrompts, ClassifyPrompts, ExtractPrompts, Prompts, SynthesizePrompts};
pub use settings::{
    GeneralSettings, ModelSettings, PipelineSettings, PromptSettings, Settings, StageTemperatures,
    SubtitleSettings,
};
