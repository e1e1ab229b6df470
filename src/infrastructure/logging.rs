use std::io;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::infrastructure::error::PickError;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    pub include_file_location: bool,
    pub include_thread_names: bool,
    pub include_span_events: bool,
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            include_file_location: false,
            include_thread_names: false,
            include_span_events: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// debug 模式下输出更多细节
    pub fn for_level(level: Level, debug: bool) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { level },
            include_file_location: debug,
            ..Self::default()
        }
    }
}

/// 日志格式
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

/// 日志输出目标
///
/// 执行日志（给操作者看的行）与这里的诊断输出分开，默认走 stderr。
#[derive(Debug, Clone)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File(String),
}

/// 设置日志系统
///
/// 重复初始化时返回错误而不是 panic。
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = if let Some(filter) = &config.filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(""))
            .add_directive(format!("cherry_pick_pro={}", config.level).parse()?)
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match &config.output {
        LogOutput::Stdout => registry.with(create_fmt_layer(&config, io::stdout)).try_init()?,
        LogOutput::Stderr => registry.with(create_fmt_layer(&config, io::stderr)).try_init()?,
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(create_fmt_layer(&config, Mutex::new(file)))
                .try_init()?
        }
    }

    Ok(())
}

fn create_fmt_layer<S, W>(config: &LoggingConfig, make_writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let mut layer = fmt::layer()
        .with_writer(make_writer)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(config.include_thread_names)
        .with_thread_names(config.include_thread_names);

    if config.include_file_location {
        layer = layer.with_file(true).with_line_number(true);
    }

    if config.include_span_events {
        layer = layer.with_span_events(FmtSpan::FULL);
    }

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// 分析 / 执行批次跟踪
pub struct OperationTracker {
    operation: String,
    operation_id: String,
    start_time: Instant,
}

impl OperationTracker {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        let operation_id = uuid::Uuid::new_v4().to_string();

        tracing::info!(
            operation = %operation,
            operation_id = %operation_id,
            "operation started"
        );

        Self {
            operation,
            operation_id,
            start_time: Instant::now(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// 记录某一级降级策略的失败
    pub fn log_fallback(&self, tier: &str, error: &PickError) {
        tracing::warn!(
            operation = %self.operation,
            operation_id = %self.operation_id,
            tier,
            category = ?error.category(),
            recoverable = error.is_recoverable(),
            error = %error,
            "tier failed, falling back"
        );
    }

    pub fn complete(self, success: bool, items: usize) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;

        if success {
            tracing::info!(
                operation = %self.operation,
                operation_id = %self.operation_id,
                duration_ms,
                items,
                "operation finished"
            );
        } else {
            tracing::error!(
                operation = %self.operation,
                operation_id = %self.operation_id,
                duration_ms,
                items,
                "operation failed"
            );
        }
    }
}
