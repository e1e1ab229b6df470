use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// AI 提供商配置
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
    /// 要求模型按此 JSON Schema 输出结构化结果
    pub response_schema: Option<Value>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: String::from("gemini-3-flash-preview"),
            api_key: None,
            api_url: String::from("https://generativelanguage.googleapis.com/v1beta"),
            timeout_secs: 30,
            response_schema: None,
        }
    }
}

impl ProviderConfig {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            model: config.classifier_model.clone(),
            api_key: config.classifier_api_key.clone(),
            api_url: config.classifier_url.clone(),
            timeout_secs: config.classifier_timeout_secs,
            response_schema: None,
        }
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// AI 提供商接口
///
/// 传输层失败（连接、超时、非 2xx）返回 `Err`；服务正常应答但内容无法解析时
/// 返回空字符串，由调用方决定如何解释。
#[async_trait]
pub trait AIProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 生成响应（非流式）
    async fn generate(&self, prompt: &str, config: &ProviderConfig) -> Result<String>;
}

/// AI 提供商工厂
pub struct ProviderFactory;

impl ProviderFactory {
    /// 根据名称创建提供商
    pub fn create(name: &str) -> Result<Box<dyn AIProvider>> {
        use crate::core::ai::providers::{GeminiProvider, OllamaProvider};

        match name.to_lowercase().as_str() {
            "gemini" => Ok(Box::new(GeminiProvider::new())),
            "ollama" => Ok(Box::new(OllamaProvider::new())),
            _ => anyhow::bail!("Unknown AI provider: {}", name),
        }
    }

    /// 获取所有支持的提供商列表
    pub fn list_providers() -> Vec<&'static str> {
        vec!["gemini", "ollama"]
    }

    /// 提供商默认的 (URL, 模型)
    pub fn defaults(name: &str) -> Option<(&'static str, &'static str)> {
        match name {
            "gemini" => Some((
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-3-flash-preview",
            )),
            "ollama" => Some(("http://localhost:11434/api/generate", "qwen2.5-coder:7b")),
            _ => None,
        }
    }

    pub fn requires_api_key(name: &str) -> bool {
        matches!(name, "gemini")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_config_default() {
        let config = ProviderConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.response_schema.is_none());
    }

    #[test]
    fn test_with_response_schema() {
        let config = ProviderConfig::default().with_response_schema(json!({"type": "OBJECT"}));
        assert_eq!(config.response_schema, Some(json!({"type": "OBJECT"})));
    }

    #[test]
    fn test_provider_factory_create() {
        assert_eq!(ProviderFactory::create("gemini").unwrap().name(), "gemini");
        assert_eq!(ProviderFactory::create("Ollama").unwrap().name(), "ollama");
        assert!(ProviderFactory::create("unknown").is_err());
    }

    #[test]
    fn test_provider_defaults() {
        assert!(ProviderFactory::defaults("gemini").is_some());
        assert!(ProviderFactory::defaults("ollama").is_some());
        assert!(ProviderFactory::defaults("claude").is_none());
        assert!(ProviderFactory::requires_api_key("gemini"));
        assert!(!ProviderFactory::requires_api_key("ollama"));
    }
}
