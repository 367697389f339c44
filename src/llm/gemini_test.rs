use super::*;

// ===== schema conversion =====

#[test]
fn schema_types_are_uppercased_recursively() {
    let schema = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "ingredient" },
                "quantity": { "type": "string" }
            },
            "required": ["name", "quantity"],
            "additionalProperties": false
        }
    });
    let converted = to_gemini_schema(&schema);
    assert_eq!(converted["type"], "ARRAY");
    assert_eq!(converted["items"]["type"], "OBJECT");
    assert_eq!(converted["items"]["properties"]["name"]["type"], "STRING");
    assert_eq!(converted["items"]["properties"]["name"]["description"], "ingredient");
    assert_eq!(converted["items"]["required"], json!(["name", "quantity"]));
    assert!(converted["items"].get("additionalProperties").is_none());
}

// ===== request building =====

#[test]
fn build_request_sets_schema_and_mime_type() {
    let schema = json!({ "type": "array", "items": { "type": "string" } });
    let request =
        StructuredRequest { instructions: "extract", input: "recipe", schema_name: "x", schema: &schema, max_tokens: 99 };
    let body = serde_json::to_value(build_request(&request)).unwrap();

    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "extract");
    assert!(body["systemInstruction"].get("role").is_none());
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "recipe");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 99);
}

#[test]
fn build_request_omits_blank_instructions() {
    let schema = json!({ "type": "string" });
    let request = StructuredRequest { instructions: " ", input: "r", schema_name: "x", schema: &schema, max_tokens: 1 };
    let body = serde_json::to_value(build_request(&request)).unwrap();
    assert!(body.get("systemInstruction").is_none());
}

// ===== response parsing =====

#[test]
fn parse_joins_candidate_parts() {
    let body = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "[{\"name\":" }, { "text": "\"salt\",\"quantity\":\"1\"}]" }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8 },
        "modelVersion": "gemini-2.5-flash-001"
    })
    .to_string();
    let resp = parse_response(&body, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text.as_deref(), Some(r#"[{"name":"salt","quantity":"1"}]"#));
    assert_eq!(resp.model, "gemini-2.5-flash-001");
    assert_eq!(resp.finish_reason, "STOP");
    assert_eq!(resp.input_tokens, 12);
    assert_eq!(resp.output_tokens, 8);
}

#[test]
fn parse_blocked_prompt_has_no_text() {
    let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let resp = parse_response(&body, "gemini-2.5-flash").unwrap();
    assert!(resp.text.is_none());
    assert_eq!(resp.finish_reason, "SAFETY");
    assert_eq!(resp.model, "gemini-2.5-flash");
}

#[test]
fn parse_whitespace_only_text_is_none() {
    let body = json!({ "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }] }).to_string();
    assert!(parse_response(&body, "m").unwrap().text.is_none());
}

#[test]
fn parse_non_object_errors() {
    assert!(matches!(parse_response("[]", "m"), Err(LlmError::ApiParse(_))));
    assert!(matches!(parse_response("nope", "m"), Err(LlmError::ApiParse(_))));
}
