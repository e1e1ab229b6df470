use crate::core::ai::http::shared_client;
use crate::core::ai::provider::{AIProvider, ProviderConfig};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama 请求结构
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

/// Ollama 选项
#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
        }
    }
}

/// Ollama 响应结构
#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// 本地 Ollama 提供商，不需要 API key
pub struct OllamaProvider {
    client: &'static Client,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: shared_client(),
        }
    }
}

#[async_trait]
impl AIProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, config: &ProviderConfig) -> Result<String> {
        let request = OllamaRequest {
            model: &config.model,
            prompt,
            stream: false,
            format: config.response_schema.as_ref().map(|_| "json"),
            options: OllamaOptions::default(),
        };

        let response = self
            .client
            .post(&config.api_url)
            .json(&request)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama request failed: {} - {}", status, text);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<OllamaResponse>(&body)
            .map(|r| r.response)
            .unwrap_or_default())
    }
}
