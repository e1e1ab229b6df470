#![allow(dead_code)]

use std::time::Duration;

use cherry_pick_pro::backend::BackendClient;
use cherry_pick_pro::core::ai::providers::GeminiProvider;
use cherry_pick_pro::core::ai::ProviderConfig;
use cherry_pick_pro::matching::RemoteClassifier;
use serde_json::{json, Value};

pub const GEMINI_PATH: &str = "/models/test-model:generateContent";

pub fn backend(uri: &str) -> BackendClient {
    BackendClient::new(
        format!("{}/api", uri),
        Duration::from_millis(300),
        Duration::from_millis(300),
    )
}

pub fn gemini_classifier(uri: &str) -> RemoteClassifier {
    let config = ProviderConfig {
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
        api_url: uri.to_string(),
        timeout_secs: 2,
        response_schema: None,
    };
    RemoteClassifier::new(Box::new(GeminiProvider::new()), config)
}

/// Gemini generateContent 应答，`text` 为模型输出
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}
