//! Gemini `generateContent` client.
//!
//! Uses the native `responseSchema` field, which takes the OpenAPI subset
//! with upper-case type names and no `additionalProperties`. The value comes
//! back unwrapped as the candidate's text.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{LlmError, StructuredRequest, StructuredResponse, response_error};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// malformed response envelope.
    pub async fn generate(&self, model: &str, request: &StructuredRequest<'_>) -> Result<StructuredResponse, LlmError> {
        let body = build_request(request);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(response_error(status, &text));
        }
        parse_response(&text, model)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    max_output_tokens: u32,
}

fn build_request<'a>(request: &StructuredRequest<'a>) -> GenerateRequest<'a> {
    let system_instruction = (!request.instructions.trim().is_empty()).then(|| GeminiContent {
        role: None,
        parts: vec![GeminiPart { text: request.instructions }],
    });
    GenerateRequest {
        system_instruction,
        contents: vec![GeminiContent { role: Some("user"), parts: vec![GeminiPart { text: request.input }] }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: to_gemini_schema(request.schema),
            max_output_tokens: request.max_tokens,
        },
    }
}

/// Convert a JSON Schema into Gemini's schema dialect.
pub(crate) fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" => {}
                    "type" => {
                        let upper = value.as_str().map(str::to_ascii_uppercase);
                        out.insert(key.clone(), upper.map_or_else(|| value.clone(), Value::String));
                    }
                    "properties" => {
                        let props = value
                            .as_object()
                            .map(|props| {
                                props
                                    .iter()
                                    .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                                    .collect::<Map<_, _>>()
                            })
                            .map_or_else(|| value.clone(), Value::Object);
                        out.insert(key.clone(), props);
                    }
                    "items" => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                    _ => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_response(json_text: &str, requested_model: &str) -> Result<StructuredResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    if !root.is_object() {
        return Err(LlmError::ApiParse("generateContent: response is not an object".to_string()));
    }
    let model = root
        .get("modelVersion")
        .and_then(Value::as_str)
        .unwrap_or(requested_model)
        .to_string();
    let usage = root.get("usageMetadata").cloned().unwrap_or_else(|| json!({}));
    let input_tokens = usage
        .get("promptTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = usage
        .get("candidatesTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    // No candidates means the prompt was blocked; report it as an empty reply.
    let Some(candidate) = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        let finish_reason = root
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(Value::as_str)
            .unwrap_or("NO_CANDIDATES")
            .to_string();
        return Ok(StructuredResponse { text: None, model, finish_reason, input_tokens, output_tokens });
    };

    let finish_reason = candidate
        .get("finishReason")
        .and_then(Value::as_str)
        .unwrap_or("STOP")
        .to_string();
    let text: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    let text = Some(text.trim().to_string()).filter(|t| !t.is_empty());

    Ok(StructuredResponse { text, model, finish_reason, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
