use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 展示用的短哈希长度
pub const SHORT_HASH_LEN: usize = 7;

/// 提交状态
///
/// 缺省（`None`）等价于 `Ready`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStatus {
    Ready,
    Pending,
    Picked,
    Conflict,
}

impl CommitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStatus::Ready => "ready",
            CommitStatus::Pending => "pending",
            CommitStatus::Picked => "picked",
            CommitStatus::Conflict => "conflict",
        }
    }

    /// 是否允许被选中进行新的 cherry-pick
    pub fn is_selectable(&self) -> bool {
        match self {
            CommitStatus::Ready | CommitStatus::Pending => true,
            CommitStatus::Picked | CommitStatus::Conflict => false,
        }
    }
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次版本控制变更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub hash: String,
    pub author: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: DateTime<Utc>,
    pub message: String,
    #[serde(default)]
    pub files_changed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CommitStatus>,
    #[serde(rename = "sourceRepo", alias = "originRepository", default)]
    pub origin_repository: String,
}

impl Commit {
    /// 实际生效的状态，缺省视为 ready
    pub fn effective_status(&self) -> CommitStatus {
        self.status.unwrap_or(CommitStatus::Ready)
    }

    pub fn is_selectable(&self) -> bool {
        self.effective_status().is_selectable()
    }

    /// 7 位短哈希，仅用于展示
    pub fn short_hash(&self) -> &str {
        abbreviate(&self.hash)
    }

    /// 返回状态被强制改写后的副本
    pub fn with_status(&self, status: CommitStatus) -> Self {
        Self {
            status: Some(status),
            ..self.clone()
        }
    }

    /// 排序去重后的变更文件，按集合比较时使用
    pub fn sorted_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.files_changed.iter().map(String::as_str).collect();
        files.sort_unstable();
        files.dedup();
        files
    }
}

/// 解析 ISO-8601 时间戳
///
/// 带时区偏移的按 RFC 3339 解析；不带偏移的（如 `2024-05-01T10:00:00`）视为 UTC。
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
}

/// 截取哈希前缀；不足 7 位时原样返回
pub fn abbreviate(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}

/// 具名、可寻址的提交历史。`commits` 按最新在前排列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub branch: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl Repository {
    pub fn find_commit(&self, id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == id)
    }

    /// 以新的提交列表替换，返回新的快照
    pub fn with_commits(&self, commits: Vec<Commit>) -> Self {
        Self {
            commits,
            ..self.clone()
        }
    }

    /// 当前可选的提交 id，按列表顺序
    pub fn selectable_ids(&self) -> Vec<String> {
        self.commits
            .iter()
            .filter(|c| c.is_selectable())
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.commits
            .iter()
            .filter(|c| c.effective_status() != CommitStatus::Picked)
            .count()
    }
}

/// 仓库角色：匹配与执行始终从 source 流向 target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepoRole {
    Source,
    Target,
}

impl fmt::Display for RepoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoRole::Source => f.write_str("Source Repository"),
            RepoRole::Target => f.write_str("Target Repository"),
        }
    }
}
