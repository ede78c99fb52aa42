//! CLI module for Destil.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Destil - Transcript Distillation with Dynamic Expert Agents
///
/// A CLI tool that distills video transcripts into knowledge documents by
/// routing them through a chain of role-specialized LLM calls whose personas
/// are decided from the content itself.
#[derive(Parser, Debug)]
#[command(name = "destil")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Destil and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Distill a video transcript into a knowledge document
    Distill {
        /// YouTube URL/ID, or local subtitle/transcript file path
        input: String,

        /// Write the document to this path instead of the output directory
        #[arg(short, long)]
        output: Option<String>,

        /// Subtitle language to fetch (overrides configuration)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "model.base_url", "subtitles.languages")
        key: String,
        /// Configuration value (empty clears optional keys)
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
