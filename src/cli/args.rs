use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "cherry-pick-pro",
    version,
    about = "跨仓库 cherry-pick 助手 - 检测已移植的提交并批量执行 cherry-pick",
    long_about = "cherry-pick-pro 读取 source / target 两个仓库的提交列表，通过后端、远程分类器或本地启发式规则识别已经移植过的提交，并对选中的提交批量执行 cherry-pick。后端不可达时自动降级为本地模拟。"
)]
pub struct Args {
    /// 扫描 target 中已存在的提交
    #[arg(short = 's', long, default_value_t = false)]
    pub scan: bool,

    /// 要 cherry-pick 的提交 id，逗号分隔（如 --pick c1,c3）
    #[arg(short = 'p', long, value_name = "IDS", value_delimiter = ',', conflicts_with = "pick_all")]
    pub pick: Vec<String>,

    /// 选中所有可用的提交
    #[arg(short = 'a', long = "pick-all", default_value_t = false)]
    pub pick_all: bool,

    /// 只检查后端健康状态
    #[arg(long, default_value_t = false)]
    pub health: bool,

    /// 不连接后端，直接使用演示仓库
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// 后端不可达时不使用演示仓库
    #[arg(long = "no-demo", default_value_t = false, conflicts_with = "demo")]
    pub no_demo: bool,

    /// 以 JSON 输出最终的仓库快照
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// 配置文件路径（默认 ~/.cherry-pick-pro/config.toml）
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 后端地址
    #[arg(long = "backend-url", value_name = "URL")]
    pub backend_url: Option<String>,

    /// 分类器提供商（gemini 或 ollama）
    #[arg(long, value_name = "PROVIDER")]
    pub classifier: Option<String>,

    /// 本地模拟时每个提交的间隔（毫秒）
    #[arg(long = "pacing-ms", value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// 日志级别（trace, debug, info, warn, error）
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// 调试模式
    #[arg(short = 'd', long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    /// 去掉空白与空项后的待选 id
    pub fn pick_ids(&self) -> Vec<String> {
        self.pick
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn wants_execution(&self) -> bool {
        self.pick_all || !self.pick_ids().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["cherry-pick-pro"]);
        assert!(!args.scan);
        assert!(args.pick.is_empty());
        assert_eq!(args.log_level, "info");
        assert!(!args.wants_execution());
    }

    #[test]
    fn test_pick_list() {
        let args = Args::parse_from(["cherry-pick-pro", "--pick", "c1, c3,"]);
        assert_eq!(args.pick_ids(), vec!["c1".to_string(), "c3".to_string()]);
        assert!(args.wants_execution());
    }

    #[test]
    fn test_pick_conflicts_with_pick_all() {
        let result = Args::try_parse_from(["cherry-pick-pro", "--pick", "c1", "--pick-all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "cherry-pick-pro",
            "--backend-url",
            "http://backend:9000/api",
            "--classifier",
            "ollama",
            "--pacing-ms",
            "0",
            "--json",
        ]);
        assert_eq!(args.backend_url.as_deref(), Some("http://backend:9000/api"));
        assert_eq!(args.classifier.as_deref(), Some("ollama"));
        assert_eq!(args.pacing_ms, Some(0));
        assert!(args.json);
    }
}
