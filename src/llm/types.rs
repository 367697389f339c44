//! LLM types: provider-neutral structured-output requests and errors.
//!
//! Provider clients translate [`StructuredRequest`] into their own wire
//! format and reduce the reply to a [`StructuredResponse`] carrying the raw
//! generated text. Interpreting that text is the caller's job.

use serde_json::Value;

use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}: {message}")]
    ApiResponse { status: u16, message: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

/// Build an [`LlmError::ApiResponse`] from a non-success reply.
///
/// Both supported providers report failures as `{"error": {"message": …}}`;
/// when that is missing the HTTP reason phrase stands in.
pub(crate) fn response_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|root| {
            root.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });
    LlmError::ApiResponse { status, message }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A single-turn request whose reply must match `schema`.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    /// System-level instructions.
    pub instructions: &'a str,
    /// The user content to operate on.
    pub input: &'a str,
    /// Name of the expected value. Providers that can only return objects
    /// wrap the value under this key.
    pub schema_name: &'a str,
    /// JSON Schema of the expected value.
    pub schema: &'a Value,
    pub max_tokens: u32,
}

/// The generated text plus accounting metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredResponse {
    /// Concatenated generated text, `None` when the provider returned none.
    pub text: Option<String>,
    pub model: String,
    pub finish_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM STRUCTURED TRAIT
// =============================================================================

/// Provider-neutral async trait for structured generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmStructured: Send + Sync {
    /// Send a structured-output request to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response envelope
    /// is malformed.
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<StructuredResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
