use async_trait::async_trait;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::core::fallback::{FallbackChain, Strategy};
use crate::infrastructure::error::PickResult;
use crate::infrastructure::logging::OperationTracker;
use crate::models::{Commit, CommitStatus, ExecutionLog, Repository};

pub const COMPLETION_LINE: &str = "Clean: all operations finished.";

/// 一个批次的输入快照
#[derive(Debug, Clone)]
pub struct ExecutionInput {
    /// 按登记顺序
    pub selected: Vec<String>,
    pub source: Repository,
    pub target: Repository,
}

/// 单级策略的产出
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub logs: Vec<String>,
    pub source: Repository,
    pub target: Repository,
}

/// 批次结果：新的仓库快照与完整日志
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub success: bool,
    pub log: ExecutionLog,
    pub source: Repository,
    pub target: Repository,
    pub tier: String,
}

/// 为写入 target 的副本派生新 id
pub fn derive_target_id(source_id: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", source_id, &suffix[..8])
}

/// 把已应用的提交同步到两侧快照：source 中标记 picked，target 头部插入副本
fn record_pick(source: &mut Repository, target: &mut Repository, commit_id: &str) -> Option<Commit> {
    let commit = source.commits.iter_mut().find(|c| c.id == commit_id)?;
    commit.status = Some(CommitStatus::Picked);

    let mut copy = commit.clone();
    copy.id = derive_target_id(&commit.id);
    target.commits.insert(0, copy.clone());
    Some(copy)
}

fn apply_locally(input: &ExecutionInput) -> (Repository, Repository) {
    let mut source = input.source.clone();
    let mut target = input.target.clone();
    for id in &input.selected {
        let selectable = source.find_commit(id).map(Commit::is_selectable).unwrap_or(false);
        if selectable {
            record_pick(&mut source, &mut target, id);
        }
    }
    (source, target)
}

struct RemoteCherryPick {
    client: BackendClient,
}

#[async_trait]
impl Strategy<ExecutionInput, ExecutionOutcome> for RemoteCherryPick {
    fn name(&self) -> &str {
        "backend"
    }

    async fn attempt(&self, input: &ExecutionInput) -> PickResult<ExecutionOutcome> {
        let response = self
            .client
            .cherry_pick(&input.selected, &input.target.id)
            .await?;

        if !response.success {
            return Ok(ExecutionOutcome {
                success: false,
                logs: response.logs,
                source: input.source.clone(),
                target: input.target.clone(),
            });
        }

        // 后端为准；刷新失败时按本地规则同步快照
        let (source, target) = match self.client.get_repositories().await {
            Ok(pair) if pair.source.id == input.source.id && pair.target.id == input.target.id => {
                (pair.source, pair.target)
            }
            Ok(_) => {
                tracing::warn!("backend returned different repositories, applying batch locally");
                apply_locally(input)
            }
            Err(e) => {
                tracing::debug!(error = %e, "refresh after remote cherry-pick failed");
                apply_locally(input)
            }
        };

        Ok(ExecutionOutcome {
            success: true,
            logs: response.logs,
            source,
            target,
        })
    }
}

/// 本地模拟执行，逐个提交推进并写日志
///
/// 作为最后一级总会产出结果；遇到未知提交时写一条 `CRITICAL:` 日志并中止批次，
/// 已完成的提交保留新状态。
struct LocalSimulator {
    pacing: Duration,
}

impl LocalSimulator {
    const NAME: &'static str = "local-simulator";

    async fn simulate(&self, input: &ExecutionInput) -> ExecutionOutcome {
        let mut source = input.source.clone();
        let mut target = input.target.clone();
        let mut logs = Vec::with_capacity(input.selected.len() * 2);

        for id in &input.selected {
            let Some(commit) = source.find_commit(id).cloned() else {
                // 不回滚已完成的提交
                logs.push(format!(
                    "CRITICAL: commit {id} is not in {}; batch halted.",
                    source.name
                ));
                tracing::error!(commit = %id, "local simulation halted on unknown commit");
                return ExecutionOutcome {
                    success: false,
                    logs,
                    source,
                    target,
                };
            };

            if !commit.is_selectable() {
                logs.push(format!(
                    "Skipping {} {}: already {}",
                    commit.short_hash(),
                    commit.message,
                    commit.effective_status()
                ));
                continue;
            }

            logs.push(format!("Cherry-picking {} {}", commit.short_hash(), commit.message));
            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            logs.push(format!("Successfully picked {} (simulated)", commit.short_hash()));
            record_pick(&mut source, &mut target, id);
        }

        ExecutionOutcome {
            success: true,
            logs,
            source,
            target,
        }
    }
}

/// 执行协调器：后端 cherry-pick → 本地模拟
pub struct ExecutionOrchestrator {
    remote: FallbackChain<ExecutionInput, ExecutionOutcome>,
    simulator: LocalSimulator,
}

impl ExecutionOrchestrator {
    pub fn new(backend: Option<BackendClient>, pacing: Duration) -> Self {
        let mut remote: FallbackChain<ExecutionInput, ExecutionOutcome> = FallbackChain::new();
        if let Some(client) = backend {
            remote = remote.with_tier(RemoteCherryPick { client });
        }
        Self {
            remote,
            simulator: LocalSimulator { pacing },
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Some(BackendClient::from_config(config)), config.pacing())
    }

    pub fn tier_names(&self) -> Vec<&str> {
        let mut names = self.remote.tier_names();
        names.push(LocalSimulator::NAME);
        names
    }

    /// 空选择是调用方错误，直接返回 `None`
    pub async fn execute(
        &self,
        selected: &[String],
        source: &Repository,
        target: &Repository,
    ) -> Option<ExecutionReport> {
        if selected.is_empty() {
            return None;
        }

        let tracker = OperationTracker::new("cherry-pick");
        let mut log = ExecutionLog::new();
        log.push(format!(
            "Requesting cherry-pick of {} commit(s) into {} ({})...",
            selected.len(),
            target.name,
            target.branch
        ));

        let input = ExecutionInput {
            selected: selected.to_vec(),
            source: source.clone(),
            target: target.clone(),
        };

        let (outcome, tier) = if self.remote.is_empty() {
            (self.simulator.simulate(&input).await, LocalSimulator::NAME.to_string())
        } else {
            match self.remote.run(&input).await {
                Ok(outcome) => {
                    for (tier, error) in &outcome.failures {
                        tracker.log_fallback(tier, error);
                    }
                    (outcome.value, outcome.tier)
                }
                Err(e) => {
                    let tier = self.remote.tier_names().last().copied().unwrap_or("remote");
                    tracker.log_fallback(tier, &e);
                    (self.simulator.simulate(&input).await, LocalSimulator::NAME.to_string())
                }
            }
        };

        log.extend(outcome.logs);
        if outcome.success {
            log.push(COMPLETION_LINE);
        }
        let report = ExecutionReport {
            success: outcome.success,
            log,
            source: outcome.source,
            target: outcome.target,
            tier,
        };

        tracker.complete(report.success, selected.len());
        Some(report)
    }
}
