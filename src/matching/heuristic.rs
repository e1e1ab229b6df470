//! 本地启发式重复提交识别，无 I/O，结果确定。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::{abbreviate, Commit, Repository};

// cherry-pick -x 追加的来源标注，从标注处截断到末尾
static CHERRY_PICK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\(cherry picked from\b.*$").unwrap());

/// 启发式规则的可调开关
///
/// 作者 + 文件集合相同即判重是一条有误报风险的经验规则
/// （同一作者对同一文件的两次无关小修复也会命中），因此可以关闭。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicPolicy {
    /// 启用规则 B：作者与变更文件集合完全一致
    pub match_on_metadata: bool,
    /// 规则 B 中忽略没有变更文件的提交
    pub skip_empty_file_sets: bool,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            match_on_metadata: true,
            skip_empty_file_sets: false,
        }
    }
}

/// 去掉 `(cherry picked from commit ...)` 标注并去除首尾空白
pub fn strip_cherry_pick_marker(message: &str) -> String {
    CHERRY_PICK_MARKER.replace(message, "").trim().to_string()
}

struct TargetIndex<'a> {
    /// 去掉标注后的小写消息
    normalized: HashSet<String>,
    /// 原始消息的小写形式，用于查找哈希前缀
    lowered: Vec<String>,
    metadata: Vec<(&'a str, Vec<&'a str>)>,
}

impl<'a> TargetIndex<'a> {
    fn build(target: &'a Repository) -> Self {
        let mut normalized = HashSet::with_capacity(target.commits.len());
        let mut lowered = Vec::with_capacity(target.commits.len());
        let mut metadata = Vec::with_capacity(target.commits.len());

        for commit in &target.commits {
            normalized.insert(strip_cherry_pick_marker(&commit.message).to_lowercase());
            lowered.push(commit.message.to_lowercase());
            metadata.push((commit.author.as_str(), commit.sorted_files()));
        }

        Self {
            normalized,
            lowered,
            metadata,
        }
    }
}

/// 启发式匹配器
#[derive(Debug, Clone, Default)]
pub struct HeuristicMatcher {
    policy: HeuristicPolicy,
}

impl HeuristicMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: HeuristicPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> HeuristicPolicy {
        self.policy
    }

    /// 返回被判定为已存在于 target 的 source 提交 id
    pub fn find_duplicates(&self, source: &Repository, target: &Repository) -> HashSet<String> {
        let mut duplicates = HashSet::new();
        if target.commits.is_empty() {
            return duplicates;
        }

        let index = TargetIndex::build(target);
        for commit in &source.commits {
            if self.matches_message(commit, &index) || self.matches_metadata(commit, &index) {
                duplicates.insert(commit.id.clone());
            }
        }

        tracing::debug!(
            source = source.commits.len(),
            target = target.commits.len(),
            duplicates = duplicates.len(),
            "heuristic scan finished"
        );
        duplicates
    }

    /// 规则 A：消息一致（忽略大小写）或 target 消息包含短哈希
    fn matches_message(&self, commit: &Commit, index: &TargetIndex<'_>) -> bool {
        let message = commit.message.trim().to_lowercase();
        if index.normalized.contains(&message) {
            return true;
        }

        let short = abbreviate(commit.hash.trim()).to_lowercase();
        !short.is_empty() && index.lowered.iter().any(|m| m.contains(&short))
    }

    /// 规则 B：作者完全一致且变更文件集合一致（均区分大小写）
    fn matches_metadata(&self, commit: &Commit, index: &TargetIndex<'_>) -> bool {
        if !self.policy.match_on_metadata {
            return false;
        }
        let files = commit.sorted_files();
        if self.policy.skip_empty_file_sets && files.is_empty() {
            return false;
        }
        index
            .metadata
            .iter()
            .any(|(author, target_files)| *author == commit.author && *target_files == files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn commit(id: &str, hash: &str, author: &str, message: &str, files: &[&str]) -> Commit {
        Commit {
            id: id.to_string(),
            hash: hash.to_string(),
            author: author.to_string(),
            date: Utc::now(),
            message: message.to_string(),
            files_changed: files.iter().map(|f| f.to_string()).collect(),
            status: None,
            origin_repository: "SourceApp".to_string(),
        }
    }

    fn repo(id: &str, commits: Vec<Commit>) -> Repository {
        Repository {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("git@example.com:{id}.git"),
            branch: "main".to_string(),
            commits,
        }
    }

    #[test]
    fn test_strip_cherry_pick_marker() {
        assert_eq!(
            strip_cherry_pick_marker("fix: race (cherry picked from commit b5c8e1a)"),
            "fix: race"
        );
        assert_eq!(
            strip_cherry_pick_marker("fix: race\n\n(Cherry Picked From commit b5c8e1a0)\n"),
            "fix: race"
        );
        assert_eq!(strip_cherry_pick_marker("  plain message  "), "plain message");
    }

    #[test]
    fn test_cherry_picked_message_is_duplicate() {
        let source = repo(
            "src",
            vec![commit(
                "c2",
                "b5c8e1a0d7391827364b91827364b91827364b02",
                "John Smith",
                "fix: resolve race condition in authentication flow",
                &["src/services/auth.ts"],
            )],
        );
        let target = repo(
            "tgt",
            vec![commit(
                "t1",
                "ffffffffffffffffffffffffffffffffffffffff",
                "Someone Else",
                "fix: resolve race condition in authentication flow (cherry picked from commit b5c8e1a)",
                &["other.ts"],
            )],
        );

        let dups = HeuristicMatcher::new().find_duplicates(&source, &target);
        assert!(dups.contains("c2"));
    }

    #[test]
    fn test_message_match_is_case_insensitive() {
        let source = repo("src", vec![commit("c1", "aaaaaaa111", "A", "  Feat: Add Search  ", &["a"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb222", "B", "feat: add search", &["b"])]);
        let dups = HeuristicMatcher::new().find_duplicates(&source, &target);
        assert_eq!(dups.len(), 1);
    }

    #[test]
    fn test_hash_prefix_anywhere_in_target_message() {
        let source = repo("src", vec![commit("c1", "1234567890abcdef", "A", "original", &["a"])]);
        let target = repo(
            "tgt",
            vec![commit("t1", "fff", "B", "backport 1234567 onto release", &["b"])],
        );
        let dups = HeuristicMatcher::new().find_duplicates(&source, &target);
        assert!(dups.contains("c1"));
    }

    #[test]
    fn test_metadata_match_ignores_file_order() {
        let source = repo(
            "src",
            vec![commit("c1", "aaaaaaa", "Jane Doe", "one message", &["b.rs", "a.rs"])],
        );
        let target = repo(
            "tgt",
            vec![commit("t1", "bbbbbbb", "Jane Doe", "unrelated message", &["a.rs", "b.rs"])],
        );
        let dups = HeuristicMatcher::new().find_duplicates(&source, &target);
        assert!(dups.contains("c1"));
    }

    #[test]
    fn test_metadata_author_is_case_sensitive() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "jane doe", "x", &["a.rs"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Jane Doe", "y", &["a.rs"])]);
        assert!(HeuristicMatcher::new().find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_metadata_paths_are_case_sensitive() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "Jane", "x", &["README.md"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Jane", "y", &["readme.md"])]);
        assert!(HeuristicMatcher::new().find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_metadata_rule_can_be_disabled() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "Jane", "x", &["a.rs"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Jane", "y", &["a.rs"])]);
        let matcher = HeuristicMatcher::with_policy(HeuristicPolicy {
            match_on_metadata: false,
            ..HeuristicPolicy::default()
        });
        assert!(matcher.find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_skip_empty_file_sets() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "Jane", "x", &[])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Jane", "y", &[])]);
        assert!(HeuristicMatcher::new()
            .find_duplicates(&source, &target)
            .contains("c1"));

        let strict = HeuristicMatcher::with_policy(HeuristicPolicy {
            skip_empty_file_sets: true,
            ..HeuristicPolicy::default()
        });
        assert!(strict.find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_empty_target_yields_empty_set() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "Jane", "x", &["a.rs"])]);
        let target = repo("tgt", vec![]);
        assert!(HeuristicMatcher::new().find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_unrelated_commit_not_matched() {
        let source = repo("src", vec![commit("c1", "aaaaaaa", "Jane", "feat: new thing", &["a.rs"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Bob", "fix: old thing", &["b.rs"])]);
        assert!(HeuristicMatcher::new().find_duplicates(&source, &target).is_empty());
    }

    #[test]
    fn test_empty_hash_does_not_match_everything() {
        let source = repo("src", vec![commit("c1", "", "Jane", "feat: new thing", &["a.rs"])]);
        let target = repo("tgt", vec![commit("t1", "bbbbbbb", "Bob", "fix: old thing", &["b.rs"])]);
        assert!(HeuristicMatcher::new().find_duplicates(&source, &target).is_empty());
    }
}
