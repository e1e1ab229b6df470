use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::config::Config;
use crate::core::ai::{AIProvider, PromptBuilder, ProviderConfig, ProviderFactory};
use crate::infrastructure::error::{PickError, PickResult};
use crate::models::Repository;

// 模型有时会把 JSON 包在 ``` 代码块里
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[a-zA-Z]+)?\s*(.*?)\s*```").unwrap());

/// 发送给分类器的 source 提交摘要
#[derive(Debug, Serialize)]
struct SourceSummary<'a> {
    id: &'a str,
    hash: &'a str,
    message: &'a str,
    author: &'a str,
}

/// 发送给分类器的 target 提交摘要
#[derive(Debug, Serialize)]
struct TargetSummary<'a> {
    hash: &'a str,
    message: &'a str,
}

/// 要求分类器返回的结构
pub fn duplicate_ids_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "duplicateIds": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["duplicateIds"]
    })
}

/// 宽松解析分类器输出；无法使用的内容视为“没有重复”
pub fn parse_duplicate_ids(text: &str) -> HashSet<String> {
    let text = text.trim();
    let body = CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            if !body.is_empty() {
                tracing::warn!(error = %e, "classifier returned unparsable content");
            }
            return HashSet::new();
        }
    };

    let ids = match &value {
        Value::Object(map) => map.get("duplicateIds").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    };

    ids.map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// 远程分类器适配器：把提交摘要交给外部模型判断重复
///
/// 每次分析只调用一次，不重试。
pub struct RemoteClassifier {
    provider: Box<dyn AIProvider>,
    config: ProviderConfig,
    prompts: PromptBuilder,
}

impl RemoteClassifier {
    pub fn new(provider: Box<dyn AIProvider>, config: ProviderConfig) -> Self {
        Self {
            provider,
            config: config.with_response_schema(duplicate_ids_schema()),
            prompts: PromptBuilder::new(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = ProviderFactory::create(&config.classifier_provider)?;
        Ok(Self::new(provider, ProviderConfig::from_config(config)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn build_prompt(&self, source: &Repository, target: &Repository) -> PickResult<String> {
        let source_summary: Vec<SourceSummary<'_>> = source
            .commits
            .iter()
            .map(|c| SourceSummary {
                id: &c.id,
                hash: &c.hash,
                message: &c.message,
                author: &c.author,
            })
            .collect();
        let target_summary: Vec<TargetSummary<'_>> = target
            .commits
            .iter()
            .map(|c| TargetSummary {
                hash: &c.hash,
                message: &c.message,
            })
            .collect();

        self.prompts
            .build_duplicate_prompt(
                &serde_json::to_string(&source_summary)?,
                &serde_json::to_string(&target_summary)?,
            )
            .map_err(PickError::from)
    }

    /// 传输层失败返回错误，由调用方降级到启发式匹配
    pub async fn classify(
        &self,
        source: &Repository,
        target: &Repository,
    ) -> PickResult<HashSet<String>> {
        let prompt = self.build_prompt(source, target)?;

        let text = self
            .provider
            .generate(&prompt, &self.config)
            .await
            .map_err(|e| PickError::classifier(self.provider.name(), e.to_string()))?;

        let mut ids = parse_duplicate_ids(&text);
        let before = ids.len();
        ids.retain(|id| source.find_commit(id).is_some());
        if ids.len() != before {
            tracing::debug!(dropped = before - ids.len(), "classifier returned unknown commit ids");
        }

        tracing::info!(
            provider = self.provider.name(),
            duplicates = ids.len(),
            "classifier scan finished"
        );
        Ok(ids)
    }
}
