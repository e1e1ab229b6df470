use chrono::{Duration, Utc};

use super::client::RepositoryPair;
use crate::models::{Commit, CommitStatus, Repository};

fn demo_commit(
    id: &str,
    hash: &str,
    author: &str,
    age: Duration,
    message: &str,
    files: &[&str],
    status: CommitStatus,
    origin: &str,
) -> Commit {
    Commit {
        id: id.to_string(),
        hash: hash.to_string(),
        author: author.to_string(),
        date: Utc::now() - age,
        message: message.to_string(),
        files_changed: files.iter().map(|f| f.to_string()).collect(),
        status: Some(status),
        origin_repository: origin.to_string(),
    }
}

/// 后端不可达时使用的演示仓库对
///
/// source 中 `c2` 已被 cherry-pick 到 target。
pub fn demo_repositories() -> RepositoryPair {
    let source_commits = vec![
        demo_commit(
            "c1",
            "a3d9f2b1e8402938475c02938475c02938475c01",
            "Jane Doe",
            Duration::hours(2),
            "feat: add advanced search filtering to the dashboard",
            &["src/components/Search.tsx", "src/hooks/useSearch.ts"],
            CommitStatus::Ready,
            "SourceApp",
        ),
        demo_commit(
            "c2",
            "b5c8e1a0d7391827364b91827364b91827364b02",
            "John Smith",
            Duration::hours(5),
            "fix: resolve race condition in authentication flow",
            &["src/services/auth.ts"],
            CommitStatus::Ready,
            "SourceApp",
        ),
        demo_commit(
            "c3",
            "f9e0d1c2b3a45678901234567890123456789003",
            "Jane Doe",
            Duration::days(1),
            "docs: update deployment instructions for AWS",
            &["README.md", "DEPLOY.md"],
            CommitStatus::Ready,
            "SourceApp",
        ),
        demo_commit(
            "c4",
            "d8c7b6a501234567890123456789012345678904",
            "Alice Wong",
            Duration::days(2),
            "refactor: cleanup redundant styles in common components",
            &["src/styles/base.css", "src/components/Button.tsx"],
            CommitStatus::Ready,
            "SourceApp",
        ),
        demo_commit(
            "c5",
            "e7f6a5b4c3d2e1f098765432109876543210905a",
            "Bob Vance",
            Duration::days(3),
            "chore: bump dependencies for security patches",
            &["package.json", "package-lock.json"],
            CommitStatus::Ready,
            "SourceApp",
        ),
        demo_commit(
            "c6",
            "0123456789abcdef0123456789abcdef01234567",
            "John Smith",
            Duration::days(4),
            "feat: implement real-time notifications via websockets",
            &["src/services/socket.ts", "src/App.tsx"],
            CommitStatus::Ready,
            "SourceApp",
        ),
    ];

    let target_commits = vec![demo_commit(
        "t1",
        "9e1d2c3b4a5f6e7d8c9b0a1f2e3d4c5b6a7f8e9d",
        "John Smith",
        Duration::hours(1),
        "fix: resolve race condition in authentication flow (cherry picked from commit b5c8e1a)",
        &["src/services/auth.ts"],
        CommitStatus::Picked,
        "TargetApp",
    )];

    RepositoryPair {
        source: Repository {
            id: "repo-src".to_string(),
            name: "core-platform-services".to_string(),
            url: "git@github.com:org/core-services.git".to_string(),
            branch: "main".to_string(),
            commits: source_commits,
        },
        target: Repository {
            id: "repo-tgt".to_string(),
            name: "customer-facing-app".to_string(),
            url: "git@github.com:org/client-app.git".to_string(),
            branch: "release/v2.1".to_string(),
            commits: target_commits,
        },
    }
}
