use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::ai::ProviderFactory;

const CONFIG_DIR: &str = ".cherry-pick-pro";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub classifier_provider: String,
    pub classifier_model: String,
    pub classifier_url: String,
    pub classifier_api_key: Option<String>,
    pub classifier_timeout_secs: u64,
    pub pacing_ms: u64,
    pub demo_fallback: bool,
    pub debug: bool,
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
    backend_timeout_ms: Option<u64>,
    health_timeout_ms: Option<u64>,
    pacing_ms: Option<u64>,
    demo_fallback: Option<bool>,
    debug: Option<bool>,
    classifier: Option<FileClassifierConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FileClassifierConfig {
    provider: Option<String>,
    model: Option<String>,
    url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: "http://localhost:8080/api".to_string(),
            backend_timeout_ms: 1500,
            health_timeout_ms: 1000,
            classifier_provider: "gemini".to_string(),
            classifier_model: "gemini-3-flash-preview".to_string(),
            classifier_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            classifier_api_key: None,
            classifier_timeout_secs: 30,
            pacing_ms: 400,
            demo_fallback: true,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::load(None)
    }

    /// 按 默认值 → 配置文件 → .env → 环境变量 的顺序加载
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config = Config::default();

        let path = config_path.map(Path::to_path_buf);
        // 测试中不读取用户目录下的文件
        #[cfg(not(test))]
        let path = path.or_else(default_config_path);

        if let Some(path) = path {
            if let Err(e) = config.load_from_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
            }
        }

        #[cfg(not(test))]
        config.load_from_env_file();
        config.load_from_env();
        config
    }

    /// 读取 TOML 配置文件；文件不存在不算错误
    pub fn load_from_file(&mut self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content)?;

        if let Some(url) = file.backend_url {
            self.backend_url = url;
        }
        if let Some(ms) = file.backend_timeout_ms {
            self.backend_timeout_ms = ms;
        }
        if let Some(ms) = file.health_timeout_ms {
            self.health_timeout_ms = ms;
        }
        if let Some(ms) = file.pacing_ms {
            self.pacing_ms = ms;
        }
        if let Some(flag) = file.demo_fallback {
            self.demo_fallback = flag;
        }
        if let Some(flag) = file.debug {
            self.debug = flag;
        }
        if let Some(classifier) = file.classifier {
            if let Some(provider) = classifier.provider {
                self.apply_provider_defaults(&provider);
            }
            if let Some(model) = classifier.model {
                self.classifier_model = model;
            }
            if let Some(url) = classifier.url {
                self.classifier_url = url;
            }
            if classifier.api_key.is_some() {
                self.classifier_api_key = classifier.api_key;
            }
            if let Some(secs) = classifier.timeout_secs {
                self.classifier_timeout_secs = secs;
            }
        }
        Ok(())
    }

    pub fn load_from_env_file(&mut self) {
        // 先加载用户目录，再加载当前目录；dotenvy 不覆盖已存在的变量
        if let Some(dir) = config_dir() {
            let user_env_path = dir.join(".env");
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(url) = env::var("CHERRY_PICK_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(ms) = env_u64("CHERRY_PICK_BACKEND_TIMEOUT_MS") {
            self.backend_timeout_ms = ms;
        }
        if let Some(ms) = env_u64("CHERRY_PICK_HEALTH_TIMEOUT_MS") {
            self.health_timeout_ms = ms;
        }
        if let Ok(provider) = env::var("CHERRY_PICK_CLASSIFIER_PROVIDER") {
            self.apply_provider_defaults(&provider);
        }
        if let Ok(model) = env::var("CHERRY_PICK_CLASSIFIER_MODEL") {
            self.classifier_model = model;
        }
        if let Ok(url) = env::var("CHERRY_PICK_CLASSIFIER_URL") {
            self.classifier_url = url;
        }
        if let Ok(api_key) = env::var("CHERRY_PICK_CLASSIFIER_API_KEY").or_else(|_| env::var("API_KEY")) {
            if !api_key.trim().is_empty() {
                self.classifier_api_key = Some(api_key);
            }
        }
        if let Some(secs) = env_u64("CHERRY_PICK_CLASSIFIER_TIMEOUT_SECS") {
            self.classifier_timeout_secs = secs;
        }
        if let Some(ms) = env_u64("CHERRY_PICK_PACING_MS") {
            self.pacing_ms = ms;
        }
        if let Some(flag) = env_bool("CHERRY_PICK_DEMO_FALLBACK") {
            self.demo_fallback = flag;
        }
        if let Some(flag) = env_bool("CHERRY_PICK_DEBUG") {
            self.debug = flag;
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if let Some(url) = &args.backend_url {
            self.backend_url = url.clone();
        }
        if let Some(provider) = &args.classifier {
            self.apply_provider_defaults(provider);
        }
        if let Some(ms) = args.pacing_ms {
            self.pacing_ms = ms;
        }
        if args.no_demo {
            self.demo_fallback = false;
        }
        if args.debug {
            self.debug = true;
        }
    }

    /// 切换提供商时，若 URL / 模型仍是旧提供商的默认值则一并替换
    fn apply_provider_defaults(&mut self, provider: &str) {
        let provider = provider.to_lowercase();
        if provider == self.classifier_provider {
            return;
        }
        if let Some((old_url, old_model)) = ProviderFactory::defaults(&self.classifier_provider) {
            if let Some((url, model)) = ProviderFactory::defaults(&provider) {
                if self.classifier_url == old_url {
                    self.classifier_url = url.to_string();
                }
                if self.classifier_model == old_model {
                    self.classifier_model = model.to_string();
                }
            }
        }
        self.classifier_provider = provider;
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend_url.trim().is_empty() {
            anyhow::bail!("Backend URL must not be empty. Set CHERRY_PICK_BACKEND_URL or --backend-url");
        }
        if self.backend_timeout_ms == 0 || self.health_timeout_ms == 0 {
            anyhow::bail!("Backend timeouts must be greater than zero");
        }
        if self.classifier_timeout_secs == 0 {
            anyhow::bail!("Classifier timeout must be greater than zero");
        }
        if !ProviderFactory::list_providers().contains(&self.classifier_provider.as_str()) {
            anyhow::bail!("Unsupported classifier provider: {}", self.classifier_provider);
        }
        Ok(())
    }

    /// 分类器是否可用：需要 API key 的提供商缺 key 时跳过这一层
    pub fn classifier_enabled(&self) -> bool {
        !ProviderFactory::requires_api_key(&self.classifier_provider)
            || self.classifier_api_key.is_some()
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn config_dir() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(CONFIG_DIR))
}

fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
