use cherry_pick_pro::backend::demo_repositories;
use cherry_pick_pro::config::Config;
use cherry_pick_pro::models::CommitStatus;
use cherry_pick_pro::orchestration::COMPLETION_LINE;
use cherry_pick_pro::Session;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(uri: &str) -> Config {
    Config {
        backend_url: format!("{}/api", uri),
        backend_timeout_ms: 300,
        health_timeout_ms: 300,
        classifier_api_key: None,
        pacing_ms: 0,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_load_from_backend() {
    let server = MockServer::start().await;
    let mut pair = demo_repositories();
    pair.source.name = "from-backend".to_string();

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&pair))
        .mount(&server)
        .await;

    let mut session = Session::new(&config_for(&server.uri()));
    tokio_test::assert_ok!(session.load().await);

    assert!(session.backend_online());
    assert_eq!(session.source().unwrap().name, "from-backend");
    assert!(session.selection().is_empty());
}

#[tokio::test]
async fn test_offline_workflow_on_demo_data() {
    let server = MockServer::start().await;
    for endpoint in ["/api/health", "/api/repos", "/api/analyze", "/api/cherry-pick"] {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
    }

    let mut session = Session::new(&config_for(&server.uri()));
    session.load().await.unwrap();
    assert!(!session.backend_online());

    let report = session.analyze().await.unwrap();
    assert_eq!(report.tier, "heuristic");
    assert_eq!(
        session.source().unwrap().find_commit("c2").unwrap().status,
        Some(CommitStatus::Picked)
    );

    // c2 已被移植，全选只包含剩余五个
    session.select_all();
    assert_eq!(session.selection().len(), 5);
    assert!(!session.selection().contains("c2"));

    let report = session.execute().await.unwrap();
    assert!(report.success);
    assert!(session.selection().is_empty());
    assert_eq!(session.log().len(), 2 + 2 * 5);
    assert_eq!(session.log().last(), Some(COMPLETION_LINE));
    assert_eq!(session.source().unwrap().available_count(), 0);
    assert_eq!(session.target().unwrap().commits.len(), 6);

    // 再次分析不改变任何状态
    let before = session.source().cloned();
    session.analyze().await.unwrap();
    assert_eq!(session.source().cloned(), before);
}

#[tokio::test]
async fn test_select_all_twice_clears() {
    let server = MockServer::start().await;
    let mut session = Session::new(&config_for(&server.uri()));
    session.set_repositories(demo_repositories());

    session.select_all();
    assert_eq!(session.selection().len(), 6);
    session.select_all();
    assert!(session.selection().is_empty());
}

#[tokio::test]
async fn test_failed_remote_batch_keeps_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cherry-pick"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "logs": ["merge conflict"]
        })))
        .mount(&server)
        .await;

    let mut session = Session::new(&config_for(&server.uri()));
    session.set_repositories(demo_repositories());
    session.toggle("c1");

    let report = session.execute().await.unwrap();
    assert!(!report.success);
    assert_eq!(session.selection().ids(), &["c1".to_string()]);
    assert_eq!(session.log().last(), Some("merge conflict"));
    assert_eq!(
        session.source().unwrap().find_commit("c1").unwrap().effective_status(),
        CommitStatus::Ready
    );
}

#[tokio::test]
async fn test_load_accepts_offset_less_dates() {
    let server = MockServer::start().await;
    let body = json!({
        "source": {
            "id": "svc-core",
            "name": "core-services",
            "url": "git@example.com:core.git",
            "branch": "main",
            "commits": [{
                "id": "a1",
                "hash": "0f1e2d3c4b5a69788796a5b4c3d2e1f0",
                "author": "Jane Doe",
                "date": "2024-05-01T10:00:00",
                "message": "feat: audit trail",
                "filesChanged": ["src/audit.rs"],
                "status": "ready",
                "sourceRepo": "core-services"
            }]
        },
        "target": {
            "id": "svc-app",
            "name": "client-app",
            "url": "git@example.com:app.git",
            "branch": "release/v3",
            "commits": [{
                "id": "b1",
                "hash": "9a8b7c6d5e4f",
                "author": "John Smith",
                "date": "2024-04-30T08:15:30.250",
                "message": "chore: bump deps",
                "status": "picked",
                "sourceRepo": "client-app"
            }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/api/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::new(&config_for(&server.uri()));
    tokio_test::assert_ok!(session.load().await);

    // 必须是后端数据，而不是演示仓库
    let source = session.source().unwrap();
    assert_eq!(source.id, "svc-core");
    assert_eq!(source.commits[0].date.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    assert_eq!(session.target().unwrap().id, "svc-app");
}
