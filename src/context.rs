//! The dynamic routing decision produced once per pipeline run.

use crate::error::{DistillError, Result};
use serde::{Deserialize, Serialize};

/// The classifier's understanding of the content.
///
/// Decides which expert personas the remaining stages run with. Produced
/// once per run and read-only afterwards; every later stage sees the same
/// instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicContext {
    /// Main subject (e.g., "Software Engineering", "Italian Cuisine").
    pub main_subject: String,
    /// Technical level of the text (e.g., "Beginner", "Advanced").
    pub complexity_level: String,
    /// Persona for structural extraction.
    pub expert_role_1: String,
    /// Persona for writing the draft.
    pub expert_role_2: String,
    /// Persona for auditing the draft.
    pub expert_role_3: String,
    /// Who the final document is for.
    pub target_audience: String,
}

impl DynamicContext {
    /// Parse a raw classifier response into a context.
    ///
    /// Strips code-fence wrapping first, then requires a JSON object.
    /// Missing fields deserialize to empty strings (downstream prompts
    /// degrade but the run continues); anything that is not a JSON object
    /// fails with [`DistillError::ContextParse`] retaining the raw response.
    pub fn parse(raw: &str) -> Result<Self> {
        let cleaned = strip_code_fences(raw);
        serde_json::from_str(&cleaned).map_err(|e| DistillError::ContextParse {
            message: e.to_string(),
            raw: raw.to_string(),
        })
    }

    /// Whether every field the downstream prompts substitute is present.
    pub fn is_complete(&self) -> bool {
        !self.main_subject.is_empty()
            && !self.complexity_level.is_empty()
            && !self.expert_role_1.is_empty()
            && !self.expert_role_2.is_empty()
            && !self.expert_role_3.is_empty()
            && !self.target_audience.is_empty()
    }
}

/// Remove code-fence wrapping from a model response.
///
/// Models frequently wrap JSON in triple-backtick fences even when told not
/// to. Only the ```json and ``` markers are stripped; nothing else.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}
