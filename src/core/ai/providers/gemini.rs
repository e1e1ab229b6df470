use crate::core::ai::http::shared_client;
use crate::core::ai::provider::{AIProvider, ProviderConfig};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Google Generative AI 请求
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

/// Gemini 内容
#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

/// Gemini 部分
#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

/// Gemini 生成配置
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

/// Gemini 响应
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

/// 从 Gemini 响应体中提取第一段文本
fn extract_gemini_content(body: &str) -> Option<String> {
    serde_json::from_str::<GeminiResponse>(body)
        .ok()
        .and_then(|r| r.candidates.into_iter().next())
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
}

/// Gemini (Google) AI 提供商
///
/// model 嵌入 URL 路径：`{base_url}/models/{model}:generateContent?key={api_key}`。
/// 配置了 `response_schema` 时要求 JSON 输出。
pub struct GeminiProvider {
    client: &'static reqwest::Client,
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self {
            client: shared_client(),
        }
    }

    fn build_url(&self, config: &ProviderConfig) -> Result<String> {
        let api_key = config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key is required"))?;

        Ok(format!(
            "{}/models/{}:generateContent?key={}",
            config.api_url.trim_end_matches('/'),
            config.model,
            api_key
        ))
    }

    fn build_request<'a>(&self, prompt: &'a str, config: &'a ProviderConfig) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.1,
                response_mime_type: config
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: config.response_schema.as_ref(),
            },
        }
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, config: &ProviderConfig) -> Result<String> {
        let url = self.build_url(config)?;
        let request = self.build_request(prompt, config);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini request failed: {} - {}", status, text);
        }

        let body = response.text().await?;
        Ok(extract_gemini_content(&body).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            model: "gemini-2.0-flash".to_string(),
            api_key: api_key.map(String::from),
            api_url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            timeout_secs: 30,
            response_schema: None,
        }
    }

    #[test]
    fn test_build_url() {
        let provider = GeminiProvider::new();
        let url = provider.build_url(&test_config(Some("test-key"))).unwrap();
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=test-key"
        );
    }

    #[test]
    fn test_build_url_no_api_key() {
        let provider = GeminiProvider::new();
        assert!(provider.build_url(&test_config(None)).is_err());
    }

    #[test]
    fn test_request_without_schema_omits_mime_type() {
        let provider = GeminiProvider::new();
        let config = test_config(Some("k"));
        let json = serde_json::to_value(provider.build_request("hi", &config)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_request_with_schema() {
        let provider = GeminiProvider::new();
        let config = test_config(Some("k")).with_response_schema(json!({"type": "OBJECT"}));
        let json = serde_json::to_value(provider.build_request("hi", &config)).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_gemini_content() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"duplicateIds\":[]}"}]}}]}"#;
        assert_eq!(
            extract_gemini_content(body),
            Some(r#"{"duplicateIds":[]}"#.to_string())
        );
        assert_eq!(extract_gemini_content("invalid"), None);
        assert_eq!(extract_gemini_content(r#"{"candidates": []}"#), None);
    }
}
