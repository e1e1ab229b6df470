use async_trait::async_trait;

use crate::infrastructure::error::{PickError, PickResult};

/// 降级链中的一级策略
#[async_trait]
pub trait Strategy<I, O>: Send + Sync
where
    I: Sync,
    O: Send,
{
    /// 策略名称，用于日志
    fn name(&self) -> &str;

    async fn attempt(&self, input: &I) -> PickResult<O>;
}

/// 降级链的执行结果
#[derive(Debug)]
pub struct Outcome<O> {
    pub value: O,
    /// 产出结果的策略名称
    pub tier: String,
    /// 之前失败的策略及其错误，按尝试顺序
    pub failures: Vec<(String, PickError)>,
}

impl<O> Outcome<O> {
    pub fn fell_back(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// 按顺序尝试各级策略，第一个成功即返回
pub struct FallbackChain<I, O> {
    tiers: Vec<Box<dyn Strategy<I, O>>>,
}

impl<I, O> Default for FallbackChain<I, O>
where
    I: Sync,
    O: Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> FallbackChain<I, O>
where
    I: Sync,
    O: Send,
{
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    pub fn with_tier(mut self, tier: impl Strategy<I, O> + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// 全部失败时返回最后一级的错误；不可恢复的错误立即中止，不再尝试后续策略
    pub async fn run(&self, input: &I) -> Result<Outcome<O>, PickError> {
        let mut failures: Vec<(String, PickError)> = Vec::new();

        for tier in &self.tiers {
            match tier.attempt(input).await {
                Ok(value) => {
                    tracing::debug!(tier = tier.name(), fallbacks = failures.len(), "tier succeeded");
                    return Ok(Outcome {
                        value,
                        tier: tier.name().to_string(),
                        failures,
                    });
                }
                Err(e) if !e.is_recoverable() => {
                    tracing::error!(
                        tier = tier.name(),
                        category = ?e.category(),
                        error = %e,
                        "tier failed with unrecoverable error, aborting chain"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        tier = tier.name(),
                        category = ?e.category(),
                        error = %e,
                        "tier failed, trying next"
                    );
                    failures.push((tier.name().to_string(), e));
                }
            }
        }

        match failures.pop() {
            Some((_, last)) => Err(last),
            None => Err(PickError::Internal {
                message: "no strategies configured".to_string(),
            }),
        }
    }
}
