use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::core::ai::http::shared_client;
use crate::infrastructure::error::{PickError, PickResult};
use crate::models::{Commit, Repository};

/// `/repos` 返回的仓库对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryPair {
    pub source: Repository,
    pub target: Repository,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    source: &'a Repository,
    target: &'a Repository,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CherryPickRequest<'a> {
    commit_ids: &'a [String],
    target_repository_id: &'a str,
}

/// `/cherry-pick` 的应答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CherryPickResponse {
    pub success: bool,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// 远端后端客户端
///
/// 所有调用使用短超时且不重试，失败交给调用方降级。
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: &'static Client,
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, health_timeout: Duration) -> Self {
        Self {
            client: shared_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            health_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.backend_url.clone(),
            config.backend_timeout(),
            config.health_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, error: reqwest::Error, operation: &str, timeout: Duration) -> PickError {
        if error.is_timeout() {
            PickError::timeout(operation, timeout.as_millis() as u64)
        } else {
            PickError::from(error)
        }
    }

    async fn read_json<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        url: String,
        operation: &str,
    ) -> PickResult<R> {
        let status = response.status();
        if !status.is_success() {
            return Err(PickError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }
        response
            .json::<R>()
            .await
            .map_err(|e| self.send_error(e, operation, self.timeout))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> PickResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let operation = format!("POST {path}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e, &operation, self.timeout))?;

        self.read_json(response, url, &operation).await
    }

    /// 获取 source / target 仓库
    pub async fn get_repositories(&self) -> PickResult<RepositoryPair> {
        let url = self.endpoint("/repos");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e, "GET /repos", self.timeout))?;

        self.read_json(response, url, "GET /repos").await
    }

    /// 后端分析：返回的提交列表直接替换 source 列表
    pub async fn analyze(&self, source: &Repository, target: &Repository) -> PickResult<Vec<Commit>> {
        self.post_json("/analyze", &AnalyzeRequest { source, target }).await
    }

    pub async fn cherry_pick(
        &self,
        commit_ids: &[String],
        target_repository_id: &str,
    ) -> PickResult<CherryPickResponse> {
        self.post_json(
            "/cherry-pick",
            &CherryPickRequest {
                commit_ids,
                target_repository_id,
            },
        )
        .await
    }

    /// 健康检查，只用于展示
    pub async fn check_health(&self) -> bool {
        match self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }
}
