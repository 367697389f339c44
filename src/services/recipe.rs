//! Recipe extraction: free-text recipe → validated draft items.
//!
//! DESIGN
//! ======
//! Sends the recipe to the configured provider with a fixed instruction
//! prompt and an array-of-ingredients schema, then treats the reply as
//! untrusted: it must parse as JSON, the ingredient list must be an array
//! (bare, or under `"ingredients"` for providers that wrap), and each entry
//! must carry string `name` and `quantity`. Malformed entries are dropped
//! without failing the call.
//!
//! One attempt per call; no retry. Provider output is non-deterministic.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmStructured;
use crate::llm::config::DEFAULT_LLM_MAX_TOKENS;
use crate::llm::types::{LlmError, StructuredRequest};
use crate::state::list::{DEFAULT_QUANTITY, DraftItem};

#[cfg(test)]
#[path = "recipe_test.rs"]
mod tests;

/// Key the ingredient array is wrapped under by object-only providers.
pub const INGREDIENTS_KEY: &str = "ingredients";

const SYSTEM_PROMPT: &str = "You are an expert recipe assistant. Extract the ingredients from the user's recipe text.
Each ingredient must have a \"name\" (string) and a \"quantity\" (string) such as \"1 cup\", \"2 tbsp\" or \"a pinch\".
If a quantity isn't specified, use \"1\" as the default.
Only include ingredients; ignore instructions, cooking times, and other non-ingredient text.
Return only the structured ingredient list and nothing else.";

/// JSON Schema for the expected ingredient list.
#[must_use]
pub fn ingredient_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name of the ingredient."
                },
                "quantity": {
                    "type": "string",
                    "description": "The amount of the ingredient, e.g. '1 cup', '2 tbsp', 'a pinch'."
                }
            },
            "required": ["name", "quantity"],
            "additionalProperties": false
        }
    })
}

// =============================================================================
// ERROR
// =============================================================================

/// Why an extraction produced no drafts. Every variant is recoverable.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{var} is not set; add it to the environment or a .env file")]
    MissingCredential { var: String },

    #[error("recipe import is misconfigured: {0}")]
    Config(String),

    #[error("failed to fetch from the AI provider: {message}")]
    Provider { message: String, retryable: bool },

    #[error("received an empty response from the AI")]
    EmptyResponse,

    #[error("failed to parse ingredients from the recipe; check the recipe text and try again")]
    Parse(String),

    #[error("failed to parse ingredients from the recipe: the AI did not return an ingredient list")]
    InvalidShape,
}

impl ErrorCode for ExtractError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "E_MISSING_CREDENTIAL",
            Self::Config(_) => "E_CONFIG",
            Self::Provider { .. } => "E_PROVIDER",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::Parse(_) => "E_PARSE",
            Self::InvalidShape => "E_INVALID_SHAPE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::EmptyResponse => true,
            _ => false,
        }
    }
}

impl From<LlmError> for ExtractError {
    fn from(err: LlmError) -> Self {
        let retryable = err.retryable();
        match err {
            LlmError::MissingApiKey { var } => Self::MissingCredential { var },
            LlmError::ConfigParse(msg) | LlmError::HttpClientBuild(msg) => Self::Config(msg),
            LlmError::ApiRequest(message) => Self::Provider { message, retryable },
            LlmError::ApiResponse { status, message } => {
                Self::Provider { message: format!("{message} (status {status})"), retryable }
            }
            LlmError::ApiParse(msg) => Self::Parse(msg),
        }
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Turns recipe text into draft items through an [`LlmStructured`] provider.
#[derive(Clone)]
pub struct RecipeExtractor {
    llm: Arc<dyn LlmStructured>,
    max_tokens: u32,
}

impl RecipeExtractor {
    pub fn new(llm: Arc<dyn LlmStructured>) -> Self {
        Self { llm, max_tokens: DEFAULT_LLM_MAX_TOKENS }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Extract ingredient drafts from `recipe_text`.
    ///
    /// The caller rejects blank input before calling.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] when the provider call fails, returns no
    /// content, or returns something that is not an ingredient list.
    pub async fn extract(&self, recipe_text: &str) -> Result<Vec<DraftItem>, ExtractError> {
        info!(recipe_len = recipe_text.len(), "recipe: extracting ingredients");
        let schema = ingredient_schema();
        let request = StructuredRequest {
            instructions: SYSTEM_PROMPT,
            input: recipe_text,
            schema_name: INGREDIENTS_KEY,
            schema: &schema,
            max_tokens: self.max_tokens,
        };

        let response = self.llm.generate(&request).await.map_err(|e| {
            warn!(error = %e, code = e.error_code(), "recipe: provider call failed");
            ExtractError::from(e)
        })?;

        let Some(text) = response.text else {
            warn!(finish_reason = %response.finish_reason, model = %response.model, "recipe: empty response");
            return Err(ExtractError::EmptyResponse);
        };

        let drafts = parse_ingredients(&text).inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "recipe: unusable response");
        })?;
        info!(
            count = drafts.len(),
            model = %response.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "recipe: ingredients extracted"
        );
        Ok(drafts)
    }
}

// =============================================================================
// RESPONSE VALIDATION
// =============================================================================

/// Parse and sanitize a provider reply into drafts.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] for invalid JSON and
/// [`ExtractError::InvalidShape`] when no ingredient array is found.
pub fn parse_ingredients(text: &str) -> Result<Vec<DraftItem>, ExtractError> {
    let root: Value = serde_json::from_str(strip_code_fence(text)).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let entries = match root {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove(INGREDIENTS_KEY) {
            Some(Value::Array(entries)) => entries,
            _ => return Err(ExtractError::InvalidShape),
        },
        _ => return Err(ExtractError::InvalidShape),
    };

    let received = entries.len();
    let drafts: Vec<DraftItem> = entries.iter().filter_map(sanitize_entry).collect();
    if drafts.len() < received {
        debug!(dropped = received - drafts.len(), "recipe: dropped malformed ingredients");
    }
    Ok(drafts)
}

fn sanitize_entry(entry: &Value) -> Option<DraftItem> {
    let name = entry.get("name")?.as_str()?.trim();
    let quantity = entry.get("quantity")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let quantity = if quantity.is_empty() { DEFAULT_QUANTITY } else { quantity };
    Some(DraftItem::new(name, quantity))
}

/// Drop a surrounding markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Skip the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with(['[', '{']) => inner.trim(),
        _ => body.trim(),
    }
}
