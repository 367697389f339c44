//! OpenAI-compatible chat completions client.
//!
//! Uses `/chat/completions` with a strict `json_schema` response format.
//! The API only constrains objects at the top level, so non-object schemas
//! are wrapped as `{ <schema_name>: <schema> }` and the caller unwraps.

use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{LlmError, StructuredRequest, StructuredResponse, response_error};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
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
        let body = build_request(model, request);
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
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
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<CcMessage<'a>>,
    response_format: Value,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Wrap `schema` so the top level is always an object.
fn object_schema(name: &str, schema: &Value) -> Value {
    if schema.get("type").and_then(Value::as_str) == Some("object") {
        return schema.clone();
    }
    let mut properties = serde_json::Map::new();
    properties.insert(name.to_string(), schema.clone());
    json!({
        "type": "object",
        "properties": properties,
        "required": [name],
        "additionalProperties": false,
    })
}

fn build_request<'a>(model: &'a str, request: &StructuredRequest<'a>) -> CcRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !request.instructions.trim().is_empty() {
        messages.push(CcMessage { role: "system", content: request.instructions });
    }
    messages.push(CcMessage { role: "user", content: request.input });

    let response_format = json!({
        "type": "json_schema",
        "json_schema": {
            "name": request.schema_name,
            "strict": true,
            "schema": object_schema(request.schema_name, request.schema),
        }
    });

    CcRequest { model, max_tokens: request.max_tokens, messages, response_format }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_response(json_text: &str) -> Result<StructuredResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let input_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_string();

    // A refusal arrives with null content; callers see it as an empty reply.
    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_owned);

    Ok(StructuredResponse { text, model, finish_reason, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
