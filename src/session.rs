use crate::backend::{demo_repositories, BackendClient, RepositoryPair};
use crate::config::Config;
use crate::infrastructure::error::PickResult;
use crate::models::{ExecutionLog, Repository, Selection};
use crate::orchestration::{AnalysisCoordinator, AnalysisReport, ExecutionOrchestrator, ExecutionReport};

/// 会话上下文
///
/// 持有当前的仓库快照、选择集与执行日志。分析与执行返回新的快照，
/// 由会话整体替换，`&mut self` 保证同一时刻只有一个批次在修改仓库。
pub struct Session {
    backend: BackendClient,
    coordinator: AnalysisCoordinator,
    orchestrator: ExecutionOrchestrator,
    demo_fallback: bool,
    source: Option<Repository>,
    target: Option<Repository>,
    selection: Selection,
    log: ExecutionLog,
    backend_online: bool,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            BackendClient::from_config(config),
            AnalysisCoordinator::from_config(config),
            ExecutionOrchestrator::from_config(config),
            config.demo_fallback,
        )
    }

    pub fn with_parts(
        backend: BackendClient,
        coordinator: AnalysisCoordinator,
        orchestrator: ExecutionOrchestrator,
        demo_fallback: bool,
    ) -> Self {
        Self {
            backend,
            coordinator,
            orchestrator,
            demo_fallback,
            source: None,
            target: None,
            selection: Selection::new(),
            log: ExecutionLog::new(),
            backend_online: false,
        }
    }

    /// 探测后端，只用于展示
    pub async fn refresh_health(&mut self) -> bool {
        self.backend_online = self.backend.check_health().await;
        self.backend_online
    }

    /// 拉取仓库；后端不可达且允许演示数据时载入内置演示仓库
    pub async fn load(&mut self) -> PickResult<()> {
        self.refresh_health().await;

        match self.backend.get_repositories().await {
            Ok(pair) => {
                tracing::info!(
                    source = %pair.source.name,
                    target = %pair.target.name,
                    "repositories loaded from backend"
                );
                self.set_repositories(pair);
                Ok(())
            }
            Err(e) if self.demo_fallback => {
                tracing::warn!(error = %e, "Backend unavailable, loading demo repositories");
                self.set_repositories(demo_repositories());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 替换两侧仓库，清空选择与日志
    pub fn set_repositories(&mut self, pair: RepositoryPair) {
        self.source = Some(pair.source);
        self.target = Some(pair.target);
        self.selection.clear();
        self.log.reset();
    }

    pub fn source(&self) -> Option<&Repository> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&Repository> {
        self.target.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn backend_online(&self) -> bool {
        self.backend_online
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match &self.source {
            Some(source) => self.selection.toggle(id, source),
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        if let Some(source) = &self.source {
            self.selection.select_all(source);
        }
    }

    /// 未载入仓库时不做任何事
    pub async fn analyze(&mut self) -> Option<AnalysisReport> {
        let (source, target) = match (&self.source, &self.target) {
            (Some(source), Some(target)) => (source, target),
            _ => return None,
        };

        let report = self.coordinator.analyze(source, target).await;
        let updated = source.with_commits(report.commits.clone());

        self.selection.retain_selectable(&updated);
        self.log.push(format!(
            "Analysis ({}) finished: {} of {} commit(s) already in {}.",
            report.tier,
            report.picked,
            updated.commits.len(),
            target.name
        ));
        self.source = Some(updated);
        Some(report)
    }

    /// 执行当前选择；选择为空或未载入仓库时不做任何事
    pub async fn execute(&mut self) -> Option<ExecutionReport> {
        let (source, target) = match (&self.source, &self.target) {
            (Some(source), Some(target)) => (source, target),
            _ => return None,
        };

        let report = self
            .orchestrator
            .execute(self.selection.ids(), source, target)
            .await?;

        self.log = report.log.clone();
        self.source = Some(report.source.clone());
        self.target = Some(report.target.clone());
        if report.success {
            self.selection.clear();
        } else {
            self.selection.retain_selectable(&report.source);
        }
        Some(report)
    }
}
