use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

const DUPLICATE_SCAN_TEMPLATE: &str = r#"Identify which commits in the SOURCE list have effectively already been applied to the TARGET list.
A commit counts as applied when the target contains the same change, even if its message carries a "(cherry picked from commit ...)" suffix or references the source hash.

SOURCE: {{source}}
TARGET: {{target}}

Return JSON with a 'duplicateIds' array containing the ids of SOURCE commits that are already present in TARGET."#;

/// 提示词模板
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template_str = template.into();
        let variables = Self::extract_variables(&template_str);

        Self {
            name: name.into(),
            template: template_str,
            variables,
        }
    }

    fn extract_variables(template: &str) -> Vec<String> {
        VARIABLE_RE
            .captures_iter(template)
            .map(|cap| cap[1].to_string())
            .collect()
    }

    /// 渲染模板，缺少变量时报错
    ///
    /// 单次扫描模板，代入的值不会再被当作占位符展开。
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String> {
        if let Some(missing) = self.variables.iter().find(|var| !values.contains_key(*var)) {
            anyhow::bail!("Missing variable: {}", missing);
        }

        let rendered = VARIABLE_RE.replace_all(&self.template, |caps: &regex::Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

/// 提示词构建器
pub struct PromptBuilder {
    templates: HashMap<String, PromptTemplate>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            "duplicate_scan".to_string(),
            PromptTemplate::new("duplicate_scan", DUPLICATE_SCAN_TEMPLATE),
        );
        Self { templates }
    }

    /// 构建重复提交识别提示词，参数为已序列化的提交摘要
    pub fn build_duplicate_prompt(&self, source: &str, target: &str) -> Result<String> {
        let template = self
            .templates
            .get("duplicate_scan")
            .ok_or_else(|| anyhow::anyhow!("Duplicate scan template not found"))?;

        let mut values = HashMap::new();
        values.insert("source".to_string(), source.to_string());
        values.insert("target".to_string(), target.to_string());

        template.render(&values)
    }

    /// 覆盖或新增模板
    pub fn add_template(&mut self, template: PromptTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get_template(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }
}
