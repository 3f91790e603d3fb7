mod support;

use cv_desk::config::{ApiConfig, Config};
use cv_desk::models::TokenPair;
use cv_desk::resources::{Resources, SkillPayload};
use cv_desk::{ApiClient, LogSessionExpiryHandler, MemoryTokenStore, TokenStore};
use std::sync::Arc;
use support::{MockResponse, MockServer};

fn resources_for(base_url: &str, store: Arc<MemoryTokenStore>) -> Resources {
    let config = Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let api = ApiClient::new(&config, store, Arc::new(LogSessionExpiryHandler)).unwrap();
    Resources::new(&api)
}

#[tokio::test]
async fn cv_list_sends_bearer_token() {
    let server = MockServer::start(|req| match req.path.as_str() {
        "/cvs/" => MockResponse::json(
            200,
            r#"[{
                "id": 3,
                "title": "Backend Engineer",
                "template": "modern",
                "full_name": "Alice Doe",
                "email": "a@x.com",
                "ai_rating": 87,
                "is_active": true
            }]"#,
        ),
        _ => MockResponse::json(404, r#"{"detail": "Not found"}"#),
    })
    .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set_tokens(TokenPair::new("A1", "R1"));
    let resources = resources_for(&server.base_url, store);

    let cvs = resources.cvs.list().await.unwrap();
    assert_eq!(cvs.len(), 1);
    assert_eq!(cvs[0].payload.title, "Backend Engineer");
    assert_eq!(cvs[0].ai_rating, Some(87));

    let requests = server.requests();
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.authorization.as_deref(), Some("Bearer A1"));
}

#[tokio::test]
async fn cv_analyze_posts_to_action_endpoint() {
    let server = MockServer::start(|req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/cvs/3/analyze/") => MockResponse::json(
            200,
            r#"{"message": "Analysis complete", "analysis": {"score": 87}}"#,
        ),
        _ => MockResponse::json(404, r#"{"detail": "Not found"}"#),
    })
    .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set_tokens(TokenPair::new("A1", "R1"));
    let resources = resources_for(&server.base_url, store);

    let result = resources.cvs.analyze(3).await.unwrap();
    assert_eq!(result.message, "Analysis complete");
    assert_eq!(result.analysis["score"], 87);
}

#[tokio::test]
async fn section_list_filters_by_cv_id() {
    let server = MockServer::start(|req| {
        if req.method == "GET" && req.path == "/cvs/skills/?cv_id=3" {
            MockResponse::json(
                200,
                r#"[{"id": 11, "cv": 3, "name": "Rust", "category": "Technical", "level": "advanced", "order": 0}]"#,
            )
        } else {
            MockResponse::json(404, r#"{"detail": "Not found"}"#)
        }
    })
    .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set_tokens(TokenPair::new("A1", "R1"));
    let resources = resources_for(&server.base_url, store);

    let skills = resources.skills.list(3).await.unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0].payload.name, "Rust");
}

#[tokio::test]
async fn section_create_and_delete() {
    let server = MockServer::start(|req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/cvs/skills/") => MockResponse::json(
            201,
            r#"{"id": 12, "cv": 3, "name": "Tokio", "category": "", "level": "intermediate", "order": 1}"#,
        ),
        ("DELETE", "/cvs/skills/12/") => MockResponse::json(204, ""),
        _ => MockResponse::json(404, r#"{"detail": "Not found"}"#),
    })
    .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set_tokens(TokenPair::new("A1", "R1"));
    let resources = resources_for(&server.base_url, store);

    let created = resources
        .skills
        .create(&SkillPayload {
            cv: 3,
            name: "Tokio".to_string(),
            category: String::new(),
            level: "intermediate".to_string(),
            order: 1,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 12);

    resources.skills.delete(12).await.unwrap();
    assert_eq!(server.count("/cvs/skills/12/"), 1);
}
