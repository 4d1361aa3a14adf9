//! Shared fixtures for integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use std::time::Duration;
use tokenwatch_core::config::{DispatchMode, ModelConfig, TelemetryConfig};
use tokenwatch_core::llm::Provider;
use wiremock::MockServer;

pub const INGEST_TOKEN: &str = "a590aec22adeab9bb9fcf8ff81ccf790";
pub const PROJECT_ID: &str = "my-app";

pub fn telemetry_config(server: &MockServer, dispatch: DispatchMode) -> TelemetryConfig {
    TelemetryConfig {
        endpoint_url: Some(format!("{}/ingest", server.uri())),
        api_key: Some(INGEST_TOKEN.to_string()),
        project_id: Some(PROJECT_ID.to_string()),
        dispatch,
        ..Default::default()
    }
}

pub fn model_config(server: &MockServer, provider: Provider) -> ModelConfig {
    ModelConfig {
        provider,
        api_key: Some("sk-test-model-key".to_string()),
        base_url: Some(server.uri()),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn anthropic_response(text: &str, input_tokens: u64, output_tokens: u64) -> Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-sonnet-20240229",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": input_tokens, "output_tokens": output_tokens}
    })
}

pub fn openai_response(text: &str, prompt_tokens: u64, completion_tokens: u64) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4-turbo-2024-04-09",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

pub fn ingest_ack(tokens: u64) -> Value {
    json!({
        "success": true,
        "id": "5f0c6a2e-8f1a-4c4e-9a53-1b2f0c9d7e11",
        "tokens": tokens,
        "cost_usd": 0.0
    })
}

/// Bodies of every request the server received on `path`
pub async fn bodies_for(server: &MockServer, path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == path)
        .map(|request| request.body_json::<Value>().expect("JSON request body"))
        .collect()
}
