use serde::Serialize;

use crate::models::{CommitStatus, ExecutionLog, RepoRole, Repository, Selection};

fn status_marker(status: CommitStatus) -> &'static str {
    match status {
        CommitStatus::Ready => "  ",
        CommitStatus::Pending => "⏳",
        CommitStatus::Picked => "✅",
        CommitStatus::Conflict => "⚠️",
    }
}

/// 仓库提交列表的文本视图：7 位哈希、状态、消息
pub fn render_repository(repo: &Repository, role: RepoRole, selection: Option<&Selection>) -> String {
    let mut output = format!(
        "📦 {} [{}] {} ({}) - {} available / {} total\n",
        role,
        repo.branch,
        repo.name,
        repo.url,
        repo.available_count(),
        repo.commits.len()
    );

    if repo.commits.is_empty() {
        output.push_str("   (no commits)\n");
        return output;
    }

    for commit in &repo.commits {
        let checked = match selection {
            Some(selection) if selection.contains(&commit.id) => "[x]",
            Some(_) if commit.is_selectable() => "[ ]",
            Some(_) => "   ",
            None => "",
        };
        let status = commit.effective_status();
        output.push_str(&format!(
            "   {}{} {} {:<8} {} ({}, {})\n",
            checked,
            status_marker(status),
            commit.short_hash(),
            status.as_str(),
            commit.message,
            commit.author,
            commit.date.format("%Y-%m-%d %H:%M")
        ));
    }
    output
}

pub fn render_log(log: &ExecutionLog) -> String {
    log.lines()
        .iter()
        .map(|line| format!("   > {}\n", line))
        .collect()
}

/// `--json` 输出的最终快照
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    pub backend_online: bool,
    pub source: Option<&'a Repository>,
    pub target: Option<&'a Repository>,
    pub selected: &'a [String],
    pub log: &'a ExecutionLog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Commit;
    use chrono::Utc;

    fn repo() -> Repository {
        Repository {
            id: "repo-src".to_string(),
            name: "core".to_string(),
            url: "git@example.com:core.git".to_string(),
            branch: "main".to_string(),
            commits: vec![
                Commit {
                    id: "c1".to_string(),
                    hash: "a3d9f2b1e8402938".to_string(),
                    author: "Jane Doe".to_string(),
                    date: Utc::now(),
                    message: "feat: search".to_string(),
                    files_changed: vec![],
                    status: None,
                    origin_repository: "SourceApp".to_string(),
                },
                Commit {
                    id: "c2".to_string(),
                    hash: "b5c8e1a0d7391827".to_string(),
                    author: "John Smith".to_string(),
                    date: Utc::now(),
                    message: "fix: race".to_string(),
                    files_changed: vec![],
                    status: Some(CommitStatus::Picked),
                    origin_repository: "SourceApp".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_render_repository_marks_selection() {
        let repo = repo();
        let mut selection = Selection::new();
        selection.toggle("c1", &repo);

        let text = render_repository(&repo, RepoRole::Source, Some(&selection));
        assert!(text.contains("1 available / 2 total"));
        assert!(text.contains("[x]   a3d9f2b ready"));
        assert!(text.contains("b5c8e1a picked"));
        assert!(!text.contains("a3d9f2b1e"));
    }

    #[test]
    fn test_render_log_keeps_order() {
        let mut log = ExecutionLog::new();
        log.extend(["one", "two"]);
        assert_eq!(render_log(&log), "   > one\n   > two\n");
    }
}
