//! Prompt templates for the four pipeline agents.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory. Stage templates use {{variable}} substitution; the classify
//! instruction is static, the others substitute fields from the dynamic
//! context ({{role}}, {{subject}}, {{audience}}).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub classify: ClassifyPrompts,
    pub extract: ExtractPrompts,
    pub synthesize: SynthesizePrompts,
    pub audit: AuditPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompt for the context classifier (Agent 0).
///
/// The one stage with a static persona; it decides the personas for the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyPrompts {
    pub role: String,
    pub instruction: String,
}

impl Default for ClassifyPrompts {
    fn default() -> Self {
        Self {
            role: "Senior Content Classification Analyst".to_string(),

            instruction: r#"Analyze the provided text. Your goal is to classify the knowledge domain and determine the best expert roles to work on it.

Return ONLY a JSON object with the following structure:
{
    "main_subject": "The main subject (e.g., Quantum Physics, French Cuisine, DevOps)",
    "complexity_level": "Technical level of the text (Beginner, Intermediate, Advanced)",
    "expert_role_1": "Technical role name for data extraction (e.g., Theoretical Physicist, Saucier, SRE Engineer)",
    "expert_role_2": "Role name for writing educational content (e.g., University Professor, Cookbook Editor, Tech Lead)",
    "expert_role_3": "Role name for auditing mistakes (e.g., Scientific Reviewer, Food Critic, Security Auditor)",
    "target_audience": "Ideal target audience for the summary"
}"#.to_string(),
        }
    }
}

/// Prompt for the structural extractor (Agent 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractPrompts {
    pub instruction: String,
}

impl Default for ExtractPrompts {
    fn default() -> Self {
        Self {
            instruction: r#"You are a {{role}}.
Your task is to analyze the raw text and extract the vital technical data about {{subject}}.
Ignore irrelevant conversation. Focus on logical structure, facts, numbers, ingredients or commands.

Return a generic JSON that represents the "truth" of this content.
Example generic structure (adapt to the domain):
{
    "key_concepts": [],
    "procedural_steps": [],
    "required_tools": [],
    "critical_alerts": []
}"#.to_string(),
        }
    }
}

/// Prompt for the synthesizer (Agent 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizePrompts {
    pub instruction: String,
}

impl Default for SynthesizePrompts {
    fn default() -> Self {
        Self {
            instruction: r#"You are a {{role}} writing for {{audience}}.
Use the STRUCTURED DATA as the source of truth and the ORIGINAL TEXT for nuance.

Goal: Produce a final document in Markdown, professional and highly educational about {{subject}}.

Guidelines:
1. Correct incorrect or confusing jargon from the original text.
2. Organize into Title, Summary, Sections and Conclusion.
3. Use rich formatting (bold, lists)."#.to_string(),
        }
    }
}

/// Prompt for the auditor (Agent 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditPrompts {
    pub instruction: String,
}

impl Default for AuditPrompts {
    fn default() -> Self {
        Self {
            instruction: r#"You are a {{role}}. Your role is to ensure technical and logical integrity.
Review the DRAFT below against the ORIGINAL TEXT.

Check:
1. If there are hallucinations (things not present in the original or technically impossible in {{subject}}).
2. If the language is appropriate for {{audience}}.
3. If the step-by-step makes logical/physical sense.

If it's perfect, return the original Draft unchanged.
If there are issues, rewrite the problematic section while keeping Markdown style."#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load classify prompts if file exists
            let classify_path = custom_path.join("classify.toml");
            if classify_path.exists() {
                let content = std::fs::read_to_string(&classify_path)?;
                prompts.classify = toml::from_str(&content)?;
            }

            // Load extract prompts if file exists
            let extract_path = custom_path.join("extract.toml");
            if extract_path.exists() {
                let content = std::fs::read_to_string(&extract_path)?;
                prompts.extract = toml::from_str(&content)?;
            }

            // Load synthesize prompts if file exists
            let synthesize_path = custom_path.join("synthesize.toml");
            if synthesize_path.exists() {
                let content = std::fs::read_to_string(&synthesize_path)?;
                prompts.synthesize = toml::from_str(&content)?;
            }

            // Load audit prompts if file exists
            let audit_path = custom_path.join("audit.toml");
            if audit_path.exists() {
                let content = std::fs::read_to_string(&audit_path)?;
                prompts.audit = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert_eq!(prompts.classify.role, "Senior Content Classification Analyst");
        assert!(prompts.classify.instruction.contains("expert_role_1"));
        assert!(prompts.extract.instruction.contains("{{role}}"));
        assert!(prompts.synthesize.instruction.contains("{{audience}}"));
        assert!(prompts.audit.instruction.contains("{{subject}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "You are a {{role}} writing about {{subject}}.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("role".to_string(), "Saucier".to_string());
        vars.insert("subject".to_string(), "French Cuisine".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "You are a Saucier writing about French Cuisine.");
    }

    #[test]
    fn test_render_with_custom_prefers_provided_vars() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("subject".to_string(), "Generic".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("subject".to_string(), "Kubernetes".to_string());

        let result = prompts.render_with_custom("About {{subject}}.", &vars);
        assert_eq!(result, "About Kubernetes.");
    }
}
