//! Destil - Transcript Distillation with Dynamic Expert Agents
//!
//! A CLI tool that turns long-form video transcripts into polished knowledge
//! documents by routing them through a chain of role-specialized LLM calls.
//!
//! The expert personas are not fixed at build time: a classification agent
//! first reads a sample of the content and decides which three specialists
//! (an extractor, a writer, and an auditor) the content needs. The remaining
//! stages then run with those personas.
//!
//! # Overview
//!
//! Destil allows you to:
//! - Fetch subtitles for YouTube videos (or read local subtitle files)
//! - Clean raw subtitle text into deduplicated plain text
//! - Distill the content into a Markdown knowledge document via four
//!   sequential agent calls (classify, extract, synthesize, audit)
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt template management
//! - `subtitles` - Subtitle acquisition (YouTube via yt-dlp, local files)
//! - `sanitize` - Raw subtitle cleanup
//! - `context` - The dynamic routing decision produced by the classifier
//! - `model` - The LLM gateway abstraction
//! - `pipeline` - The multi-agent orchestrator
//!
//! # Example
//!
//! ```rust,no_run
//! use destil::config::Settings;
//! use destil::pipeline::Distiller;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let distiller = Distiller::new(settings)?;
//!
//!     // Distill a YouTube video into a knowledge document
//!     let document = distiller.run("dQw4w9WgXcQ").await?;
//!     println!("{}", document);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod openai;
pub mod pipeline;
pub mod sanitize;
pub mod subtitles;

pub use error::{DistillError, Result};
