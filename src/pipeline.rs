//! The multi-agent distillation pipeline.
//!
//! Coordinates the entire process from subtitle acquisition to the final
//! knowledge document. The pipeline is strictly linear and fail-fast:
//! acquire, sanitize, classify, extract, synthesize, audit. The classify
//! stage decides which expert personas the remaining stages run with, so
//! everything after it is configured by data produced mid-run.

use crate::config::{Prompts, Settings};
use crate::context::DynamicContext;
use crate::error::{DistillError, Result};
use crate::model::{AgentRequest, ModelGateway, OpenAiGateway};
use crate::sanitize::{RegexSanitizer, Sanitizer};
use crate::subtitles::{AutoSource, SubtitleSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One ordered step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Sanitize,
    Classify,
    Extract,
    Synthesize,
    Audit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Acquire => write!(f, "acquire"),
            Stage::Sanitize => write!(f, "sanitize"),
            Stage::Classify => write!(f, "classify"),
            Stage::Extract => write!(f, "extract"),
            Stage::Synthesize => write!(f, "synthesize"),
            Stage::Audit => write!(f, "audit"),
        }
    }
}

/// The main orchestrator for the Destil pipeline.
pub struct Distiller {
    settings: Settings,
    prompts: Prompts,
    source: Arc<dyn SubtitleSource>,
    sanitizer: Arc<dyn Sanitizer>,
    gateway: Arc<dyn ModelGateway>,
}

impl Distiller {
    /// Create a new distiller with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source = Arc::new(AutoSource::new(&settings));
        let sanitizer = Arc::new(RegexSanitizer::new());
        let gateway = Arc::new(OpenAiGateway::new(&settings.model));

        Ok(Self {
            settings,
            prompts,
            source,
            sanitizer,
            gateway,
        })
    }

    /// Create a distiller with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        source: Arc<dyn SubtitleSource>,
        sanitizer: Arc<dyn Sanitizer>,
        gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        Self {
            settings,
            prompts,
            source,
            sanitizer,
            gateway,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full pipeline for one identifier and return the final document.
    ///
    /// Any stage failure aborts the run immediately with a stage-tagged
    /// error; no partial output is returned and nothing is retried.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn run(&self, input: &str) -> Result<String> {
        info!("Acquiring subtitles for {}", input);
        eprintln!("  Fetching subtitles...");
        let raw_text = self
            .source
            .acquire(input)
            .await
            .map_err(|e| DistillError::at_stage(Stage::Acquire, e))?;

        eprintln!("  Sanitizing transcript...");
        let clean_text = self
            .sanitizer
            .sanitize(&raw_text)
            .map_err(|e| DistillError::at_stage(Stage::Sanitize, e))?;

        // Every model call is billed and slow; refuse trivial content before
        // the first one.
        let length = clean_text.chars().count();
        let minimum = self.settings.pipeline.min_content_chars;
        if length < minimum {
            return Err(DistillError::InsufficientContent { length, minimum });
        }

        info!("Classifying content ({} chars)", length);
        eprintln!("  Identifying context and specialists...");
        let context = self
            .classify(&clean_text)
            .await
            .map_err(|e| DistillError::at_stage(Stage::Classify, e))?;

        info!(
            subject = %context.main_subject,
            level = %context.complexity_level,
            "Context identified"
        );
        eprintln!(
            "  Context: {} | Level: {}",
            context.main_subject, context.complexity_level
        );
        eprintln!(
            "  Expert team: [1] {} [2] {} [3] {}",
            context.expert_role_1, context.expert_role_2, context.expert_role_3
        );

        eprintln!("  {}: Extracting structure...", context.expert_role_1);
        let extraction = self
            .extract(&clean_text, &context)
            .await
            .map_err(|e| DistillError::at_stage(Stage::Extract, e))?;

        eprintln!("  {}: Writing draft...", context.expert_role_2);
        let draft = self
            .synthesize(&clean_text, &extraction, &context)
            .await
            .map_err(|e| DistillError::at_stage(Stage::Synthesize, e))?;

        eprintln!("  {}: Validating and refining...", context.expert_role_3);
        let final_document = self
            .audit(&draft, &clean_text, &context)
            .await
            .map_err(|e| DistillError::at_stage(Stage::Audit, e))?;

        Ok(final_document)
    }

    /// Agent 0: classify the content and decide the expert personas.
    ///
    /// The only stage with a static persona. Sees a bounded prefix of the
    /// cleaned text to keep classification cheap and fast.
    async fn classify(&self, clean_text: &str) -> Result<DynamicContext> {
        let sample = sample_text(clean_text, self.settings.pipeline.classify_sample_chars);

        let request = AgentRequest {
            role: self.prompts.classify.role.clone(),
            instruction: self.prompts.classify.instruction.clone(),
            input_data: sample,
            temperature: self.settings.model.temperature.classify,
        };

        let response = self.gateway.call(&request).await?;
        let context = DynamicContext::parse(&response)?;

        if !context.is_complete() {
            warn!("Classifier returned an incomplete context; downstream prompts will degrade");
        }

        Ok(context)
    }

    /// Agent 1: extract the structural "truth" of the content.
    ///
    /// Output is opaque text by design; whatever comes back is forwarded.
    async fn extract(&self, clean_text: &str, context: &DynamicContext) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("role".to_string(), context.expert_role_1.clone());
        vars.insert("subject".to_string(), context.main_subject.clone());

        let request = AgentRequest {
            role: context.expert_role_1.clone(),
            instruction: self
                .prompts
                .render_with_custom(&self.prompts.extract.instruction, &vars),
            input_data: clean_text.to_string(),
            temperature: self.settings.model.temperature.extract,
        };

        self.gateway.call(&request).await
    }

    /// Agent 2: write the draft document.
    ///
    /// Receives the structured data and the full original text so nuance
    /// survives the extraction.
    async fn synthesize(
        &self,
        clean_text: &str,
        extraction: &str,
        context: &DynamicContext,
    ) -> Result<String> {
        let input_data = format!(
            "--- STRUCTURED DATA ---\n{}\n\n--- ORIGINAL TEXT ---\n{}",
            extraction, clean_text
        );

        let mut vars = HashMap::new();
        vars.insert("role".to_string(), context.expert_role_2.clone());
        vars.insert("audience".to_string(), context.target_audience.clone());
        vars.insert("subject".to_string(), context.main_subject.clone());

        let request = AgentRequest {
            role: context.expert_role_2.clone(),
            instruction: self
                .prompts
                .render_with_custom(&self.prompts.synthesize.instruction, &vars),
            input_data,
            temperature: self.settings.model.temperature.synthesize,
        };

        self.gateway.call(&request).await
    }

    /// Agent 3: audit the draft against the original text.
    async fn audit(
        &self,
        draft: &str,
        clean_text: &str,
        context: &DynamicContext,
    ) -> Result<String> {
        let input_data = format!(
            "--- DRAFT ---\n{}\n\n--- ORIGINAL TEXT ---\n{}",
            draft, clean_text
        );

        let mut vars = HashMap::new();
        vars.insert("role".to_string(), context.expert_role_3.clone());
        vars.insert("subject".to_string(), context.main_subject.clone());
        vars.insert("audience".to_string(), context.target_audience.clone());

        let request = AgentRequest {
            role: context.expert_role_3.clone(),
            instruction: self
                .prompts
                .render_with_custom(&self.prompts.audit.instruction, &vars),
            input_data,
            temperature: self.settings.model.temperature.audit,
        };

        self.gateway.call(&request).await
    }
}

/// Truncate text to a character limit, marking truncation with an ellipsis.
fn sample_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CONTEXT_JSON: &str = r#"{"main_subject":"Cooking","complexity_level":"Beginner","expert_role_1":"Chef","expert_role_2":"Editor","expert_role_3":"Critic","target_audience":"Home cooks"}"#;

    const LONG_TEXT: &str = "Today we are going to prepare a classic tomato sauce from scratch, \
        starting with ripe tomatoes, garlic, olive oil and fresh basil leaves.";

    /// Source stub returning fixed text for any identifier.
    struct StaticSource(String);

    #[async_trait]
    impl SubtitleSource for StaticSource {
        fn can_handle(&self, _input: &str) -> bool {
            true
        }

        async fn acquire(&self, _input: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// Source stub that always fails.
    struct FailingSource;

    #[async_trait]
    impl SubtitleSource for FailingSource {
        fn can_handle(&self, _input: &str) -> bool {
            true
        }

        async fn acquire(&self, _input: &str) -> Result<String> {
            Err(DistillError::Acquisition("no subtitle track".to_string()))
        }
    }

    /// Sanitizer stub that forwards input unchanged.
    struct PassthroughSanitizer;

    impl Sanitizer for PassthroughSanitizer {
        fn sanitize(&self, raw: &str) -> Result<String> {
            Ok(raw.to_string())
        }
    }

    /// Gateway stub that replays scripted responses and records every request.
    struct ScriptedGateway {
        responses: Vec<std::result::Result<String, String>>,
        calls: Mutex<Vec<AgentRequest>>,
    }

    impl ScriptedGateway {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: responses.iter().map(|r| Ok(r.to_string())).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn with_failure_at(responses: &[&str], failing_index: usize, message: &str) -> Arc<Self> {
            let mut scripted: Vec<std::result::Result<String, String>> =
                responses.iter().map(|r| Ok(r.to_string())).collect();
            scripted[failing_index] = Err(message.to_string());
            Arc::new(Self {
                responses: scripted,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<AgentRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn call(&self, request: &AgentRequest) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(request.clone());

            match self.responses.get(index) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(message)) => Err(DistillError::Model(message.clone())),
                None => Err(DistillError::Model("script exhausted".to_string())),
            }
        }
    }

    fn distiller(source_text: &str, gateway: Arc<ScriptedGateway>) -> Distiller {
        Distiller::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StaticSource(source_text.to_string())),
            Arc::new(PassthroughSanitizer),
            gateway,
        )
    }

    #[tokio::test]
    async fn test_full_run_invokes_four_agents_in_order() {
        let gateway = ScriptedGateway::new(&[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller(LONG_TEXT, gateway.clone());

        let document = distiller.run("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(document, "FINAL");

        let calls = gateway.calls();
        assert_eq!(calls.len(), 4);

        // Stage 1 uses the static meta-persona; stages 2-4 thread the
        // personas the classifier decided.
        assert_eq!(calls[0].role, "Senior Content Classification Analyst");
        assert_eq!(calls[1].role, "Chef");
        assert_eq!(calls[2].role, "Editor");
        assert_eq!(calls[3].role, "Critic");

        // Temperatures: low for classify/extract/audit, raised for synthesis.
        assert_eq!(calls[0].temperature, 0.1);
        assert_eq!(calls[1].temperature, 0.1);
        assert_eq!(calls[2].temperature, 0.4);
        assert_eq!(calls[3].temperature, 0.1);

        // Context substitutions reach the instructions.
        assert!(calls[1].instruction.contains("Chef"));
        assert!(calls[1].instruction.contains("Cooking"));
        assert!(calls[2].instruction.contains("Home cooks"));
        assert!(calls[3].instruction.contains("Critic"));
    }

    #[tokio::test]
    async fn test_composite_inputs_label_sections() {
        let gateway = ScriptedGateway::new(&[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller(LONG_TEXT, gateway.clone());

        distiller.run("dQw4w9WgXcQ").await.unwrap();
        let calls = gateway.calls();

        // Extraction sees the full cleaned text verbatim.
        assert_eq!(calls[1].input_data, LONG_TEXT);

        // Synthesis sees structured data plus the original text, labeled.
        assert!(calls[2].input_data.contains("--- STRUCTURED DATA ---"));
        assert!(calls[2].input_data.contains("EXTRACTION"));
        assert!(calls[2].input_data.contains("--- ORIGINAL TEXT ---"));
        assert!(calls[2].input_data.contains(LONG_TEXT));

        // Audit sees the draft plus the original text for cross-checking.
        assert!(calls[3].input_data.contains("--- DRAFT ---"));
        assert!(calls[3].input_data.contains("DRAFT"));
        assert!(calls[3].input_data.contains(LONG_TEXT));
    }

    #[tokio::test]
    async fn test_short_content_fails_before_any_model_call() {
        let gateway = ScriptedGateway::new(&[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller("too short", gateway.clone());

        let err = distiller.run("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, DistillError::InsufficientContent { .. }));
        assert_eq!(gateway.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_context_aborts_after_first_call() {
        let gateway = ScriptedGateway::new(&["not json", "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller(LONG_TEXT, gateway.clone());

        let err = distiller.run("dQw4w9WgXcQ").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Classify));

        match err {
            DistillError::Stage { source, .. } => match *source {
                DistillError::ContextParse { raw, .. } => assert_eq!(raw, "not json"),
                other => panic!("unexpected cause: {:?}", other),
            },
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fenced_context_json_is_parsed() {
        let fenced = format!("```json\n{}\n```", CONTEXT_JSON);
        let gateway = ScriptedGateway::new(&[&fenced, "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller(LONG_TEXT, gateway.clone());

        distiller.run("dQw4w9WgXcQ").await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1].role, "Chef");
    }

    #[tokio::test]
    async fn test_acquisition_failure_is_stage_tagged() {
        let gateway = ScriptedGateway::new(&[]);
        let distiller = Distiller::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(FailingSource),
            Arc::new(PassthroughSanitizer),
            gateway.clone(),
        );

        let err = distiller.run("dQw4w9WgXcQ").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Acquire));
        assert_eq!(gateway.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_mid_pipeline_is_stage_tagged() {
        let gateway = ScriptedGateway::with_failure_at(
            &[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"],
            1,
            "connection refused",
        );
        let distiller = distiller(LONG_TEXT, gateway.clone());

        let err = distiller.run("dQw4w9WgXcQ").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Extract));

        // Failed mid-pipeline: classify and the failing extract call only.
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_classifier_sample_is_bounded() {
        let long_text = "x".repeat(5000);
        let gateway = ScriptedGateway::new(&[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"]);
        let distiller = distiller(&long_text, gateway.clone());

        distiller.run("dQw4w9WgXcQ").await.unwrap();

        let calls = gateway.calls();
        let sample = &calls[0].input_data;
        assert_eq!(sample.chars().count(), 2003);
        assert!(sample.ends_with("..."));

        // The extractor still sees everything.
        assert_eq!(calls[1].input_data.chars().count(), 5000);
    }

    #[tokio::test]
    async fn test_deterministic_given_deterministic_gateway() {
        let mut outputs = Vec::new();

        for _ in 0..2 {
            let gateway = ScriptedGateway::new(&[CONTEXT_JSON, "EXTRACTION", "DRAFT", "FINAL"]);
            let distiller = distiller(LONG_TEXT, gateway);
            outputs.push(distiller.run("dQw4w9WgXcQ").await.unwrap());
        }

        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_sample_text_respects_char_boundaries() {
        assert_eq!(sample_text("short", 2000), "short");
        assert_eq!(sample_text("abcdef", 3), "abc...");

        // Multi-byte characters must not be split
        let text = "åéîøü".repeat(10);
        let sample = sample_text(&text, 7);
        assert_eq!(sample.chars().count(), 10);
        assert!(sample.ends_with("..."));
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(Stage::Classify.to_string(), "classify");
        assert_eq!(Stage::Audit.to_string(), "audit");
    }
}
