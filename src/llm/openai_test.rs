use super::*;

fn array_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"],
            "additionalProperties": false
        }
    })
}

// ===== request building =====

#[test]
fn build_request_wraps_array_schema() {
    let schema = array_schema();
    let request = StructuredRequest {
        instructions: "extract",
        input: "2 eggs",
        schema_name: "ingredients",
        schema: &schema,
        max_tokens: 256,
    };
    let body = serde_json::to_value(build_request("gpt-4o", &request)).unwrap();

    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["max_tokens"], 256);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "2 eggs");

    let format = &body["response_format"];
    assert_eq!(format["type"], "json_schema");
    assert_eq!(format["json_schema"]["strict"], true);
    let wrapped = &format["json_schema"]["schema"];
    assert_eq!(wrapped["type"], "object");
    assert_eq!(wrapped["required"], json!(["ingredients"]));
    assert_eq!(wrapped["properties"]["ingredients"], schema);
}

#[test]
fn build_request_keeps_object_schema() {
    let schema = json!({ "type": "object", "properties": {}, "additionalProperties": false });
    let request =
        StructuredRequest { instructions: "", input: "hi", schema_name: "thing", schema: &schema, max_tokens: 16 };
    let body = serde_json::to_value(build_request("m", &request)).unwrap();
    assert_eq!(body["response_format"]["json_schema"]["schema"], schema);
    // Blank instructions produce no system message.
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

// ===== response parsing =====

#[test]
fn parse_text_response() {
    let body = json!({
        "model": "gpt-4o-2024-08-06",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"ingredients\":[]}" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_response(&body).unwrap();
    assert_eq!(resp.text.as_deref(), Some("{\"ingredients\":[]}"));
    assert_eq!(resp.model, "gpt-4o-2024-08-06");
    assert_eq!(resp.finish_reason, "stop");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn parse_refusal_has_no_text() {
    let body = json!({
        "model": "gpt-4o",
        "choices": [{
            "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." },
            "finish_reason": "stop"
        }]
    })
    .to_string();
    assert!(parse_response(&body).unwrap().text.is_none());
}

#[test]
fn parse_missing_choices() {
    let body = json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_response(&body), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json"), Err(LlmError::ApiParse(_))));
}
