use async_trait::async_trait;
use std::collections::HashSet;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::core::fallback::{FallbackChain, Strategy};
use crate::infrastructure::error::PickResult;
use crate::infrastructure::logging::OperationTracker;
use crate::matching::{HeuristicMatcher, RemoteClassifier};
use crate::models::{Commit, CommitStatus, Repository};

/// 一次分析的输入快照
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub source: Repository,
    pub target: Repository,
}

/// 各级策略的产出
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisVerdict {
    /// 后端给出的完整 source 列表，原样采用
    Replacement(Vec<Commit>),
    /// 匹配器判定的重复 id，投影到原 source 列表
    Duplicates(HashSet<String>),
}

/// 分析结果
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// 完整替换 source 仓库的提交列表
    pub commits: Vec<Commit>,
    /// 产出结果的策略
    pub tier: String,
    /// 结果中状态为 picked 的提交数
    pub picked: usize,
    pub fell_back: bool,
}

/// 把重复 id 投影到提交列表：命中的强制为 picked，其余原样保留
pub fn project_duplicates(commits: &[Commit], duplicates: &HashSet<String>) -> Vec<Commit> {
    commits
        .iter()
        .map(|c| {
            if duplicates.contains(&c.id) {
                c.with_status(CommitStatus::Picked)
            } else {
                c.clone()
            }
        })
        .collect()
}

struct BackendAnalysis {
    client: BackendClient,
}

#[async_trait]
impl Strategy<AnalysisInput, AnalysisVerdict> for BackendAnalysis {
    fn name(&self) -> &str {
        "backend"
    }

    async fn attempt(&self, input: &AnalysisInput) -> PickResult<AnalysisVerdict> {
        let commits = self.client.analyze(&input.source, &input.target).await?;
        Ok(AnalysisVerdict::Replacement(commits))
    }
}

struct ClassifierAnalysis {
    classifier: RemoteClassifier,
    name: String,
}

#[async_trait]
impl Strategy<AnalysisInput, AnalysisVerdict> for ClassifierAnalysis {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, input: &AnalysisInput) -> PickResult<AnalysisVerdict> {
        let ids = self.classifier.classify(&input.source, &input.target).await?;
        Ok(AnalysisVerdict::Duplicates(ids))
    }
}

struct HeuristicAnalysis {
    matcher: HeuristicMatcher,
}

#[async_trait]
impl Strategy<AnalysisInput, AnalysisVerdict> for HeuristicAnalysis {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn attempt(&self, input: &AnalysisInput) -> PickResult<AnalysisVerdict> {
        Ok(AnalysisVerdict::Duplicates(
            self.matcher.find_duplicates(&input.source, &input.target),
        ))
    }
}

/// 分析协调器：后端 → 远程分类器 → 本地启发式
pub struct AnalysisCoordinator {
    chain: FallbackChain<AnalysisInput, AnalysisVerdict>,
    matcher: HeuristicMatcher,
}

impl AnalysisCoordinator {
    /// 任一远端层可以省略；启发式层总是最后一级
    pub fn new(
        backend: Option<BackendClient>,
        classifier: Option<RemoteClassifier>,
        matcher: HeuristicMatcher,
    ) -> Self {
        let mut chain: FallbackChain<AnalysisInput, AnalysisVerdict> = FallbackChain::new();
        if let Some(client) = backend {
            chain = chain.with_tier(BackendAnalysis { client });
        }
        if let Some(classifier) = classifier {
            let name = format!("classifier:{}", classifier.provider_name());
            chain = chain.with_tier(ClassifierAnalysis { classifier, name });
        }
        let chain = chain.with_tier(HeuristicAnalysis {
            matcher: matcher.clone(),
        });

        Self { chain, matcher }
    }

    pub fn from_config(config: &Config) -> Self {
        let classifier = if config.classifier_enabled() {
            match RemoteClassifier::from_config(config) {
                Ok(classifier) => Some(classifier),
                Err(e) => {
                    tracing::warn!(error = %e, "classifier unavailable, using local heuristics");
                    None
                }
            }
        } else {
            tracing::info!("No classifier API key found. Using local heuristic analysis.");
            None
        };

        Self::new(
            Some(BackendClient::from_config(config)),
            classifier,
            HeuristicMatcher::new(),
        )
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.chain.tier_names()
    }

    /// 返回 source 的完整替换列表，从不向调用方报错
    pub async fn analyze(&self, source: &Repository, target: &Repository) -> AnalysisReport {
        let tracker = OperationTracker::new("analyze");
        let input = AnalysisInput {
            source: source.clone(),
            target: target.clone(),
        };

        let (verdict, tier, fell_back) = match self.chain.run(&input).await {
            Ok(outcome) => {
                for (tier, error) in &outcome.failures {
                    tracker.log_fallback(tier, error);
                }
                let fell_back = outcome.fell_back();
                (outcome.value, outcome.tier, fell_back)
            }
            Err(e) => {
                tracker.log_fallback("chain", &e);
                (
                    AnalysisVerdict::Duplicates(self.matcher.find_duplicates(source, target)),
                    "heuristic".to_string(),
                    true,
                )
            }
        };

        let commits = match verdict {
            AnalysisVerdict::Replacement(commits) => commits,
            AnalysisVerdict::Duplicates(ids) => project_duplicates(&source.commits, &ids),
        };
        let picked = commits
            .iter()
            .filter(|c| c.effective_status() == CommitStatus::Picked)
            .count();

        tracker.complete(true, commits.len());
        AnalysisReport {
            commits,
            tier,
            picked,
            fell_back,
        }
    }
}
