//! End-to-end router tests: confab CRUD with a scripted repository host.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use confab::api::AppState;
use confab::errors::MirrorError;
use confab::github::client::{FileUpsert, NewPull, PullBase, PullInfo, RepoHost, RepoInfo};
use confab::mirror::orchestrator::ConfabMirror;
use confab::server::build_router;
use confab::settings::Settings;
use confab::store::db::{ConfabDb, DbHandle};

/// Scripted host: every mirror succeeds, PR URLs are numbered in the order
/// they are opened, and file writes are recorded for inspection.
#[derive(Default)]
struct ScriptedHost {
    fail_everything: bool,
    pulls_opened: Mutex<u64>,
    puts: Mutex<Vec<String>>,
}

impl ScriptedHost {
    fn failing() -> Self {
        Self {
            fail_everything: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RepoHost for ScriptedHost {
    async fn get_repo(
        &self,
        owner: &str,
        repo: &str,
        _token: Option<&str>,
    ) -> Result<RepoInfo, MirrorError> {
        if self.fail_everything {
            return Err(MirrorError::RemoteNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                status: 404,
            });
        }
        Ok(RepoInfo {
            default_branch: "main".to_string(),
        })
    }

    async fn get_branch_sha(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
        _token: Option<&str>,
    ) -> Result<String, MirrorError> {
        Ok("deadbeef".to_string())
    }

    async fn create_branch(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
        _sha: &str,
        _token: Option<&str>,
    ) -> Result<(), MirrorError> {
        Ok(())
    }

    async fn get_content_sha(
        &self,
        _owner: &str,
        _repo: &str,
        _path: &str,
        _token: Option<&str>,
    ) -> Result<Option<String>, MirrorError> {
        Ok(None)
    }

    async fn put_content(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        _upsert: FileUpsert,
        _token: Option<&str>,
    ) -> Result<(), MirrorError> {
        self.puts.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn get_pull(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        _token: Option<&str>,
    ) -> Result<PullInfo, MirrorError> {
        Ok(PullInfo {
            html_url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
            base: PullBase {
                branch: "main".to_string(),
            },
        })
    }

    async fn create_pull(
        &self,
        owner: &str,
        repo: &str,
        _pull: NewPull,
        _token: Option<&str>,
    ) -> Result<PullInfo, MirrorError> {
        let mut opened = self.pulls_opened.lock().unwrap();
        *opened += 1;
        Ok(PullInfo {
            html_url: format!("https://github.com/{owner}/{repo}/pull/{}", *opened),
            base: PullBase {
                branch: "main".to_string(),
            },
        })
    }
}

fn test_app(host: Arc<ScriptedHost>) -> Router {
    let state = Arc::new(AppState {
        db: DbHandle::new(ConfabDb::new_in_memory().unwrap()),
        mirror: ConfabMirror::new(host),
        settings: Settings {
            mirror_owner: "acme".to_string(),
            mirror_repo: "widgets".to_string(),
            github_token: Some("tok".to_string()),
        },
    });
    build_router(state)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn create_persists_record_and_mirror_url() {
    let host = Arc::new(ScriptedHost::default());
    let app = test_app(host.clone());

    let (status, confab) = send_json(
        &app,
        "POST",
        "/api/confabs",
        serde_json::json!({"name": "Bot A", "description": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(confab["name"], "Bot A");
    assert_eq!(confab["github_url"], "https://github.com/acme/widgets/pull/1");

    let puts = host.puts.lock().unwrap().clone();
    assert_eq!(
        puts,
        vec![
            "confabs/bot-a/Confab.toml",
            "confabs/bot-a/PURPOSE.md",
            "confabs/bot-a/GUARDRAILS.md",
            "confabs/bot-a/TESTS.md",
        ]
    );
}

#[tokio::test]
async fn create_survives_mirror_failure() {
    let app = test_app(Arc::new(ScriptedHost::failing()));

    let (status, confab) = send_json(
        &app,
        "POST",
        "/api/confabs",
        serde_json::json!({"name": "Bot A", "description": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(confab["github_url"].is_null());

    // The record is durable despite the failed mirror.
    let (status, list) = get_json(&app, "/api/confabs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_bumps_version_and_keeps_original_pull_url() {
    let host = Arc::new(ScriptedHost::default());
    let app = test_app(host.clone());

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/confabs",
        serde_json::json!({"name": "Bot A", "description": "demo"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/confabs/{id}"),
        serde_json::json!({"name": "Bot A", "description": "now with billing"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"], "1.1.0");
    assert_eq!(updated["description"], "now with billing");
    // A second PR was opened, but the stored reference stays on the first
    // one so later updates keep resolving the same base branch.
    assert_eq!(updated["github_url"], "https://github.com/acme/widgets/pull/1");
    assert_eq!(*host.pulls_opened.lock().unwrap(), 2);
}

#[tokio::test]
async fn fetch_update_delete_round_trip() {
    let app = test_app(Arc::new(ScriptedHost::default()));

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/confabs",
        serde_json::json!({"name": "Bot A", "description": "demo"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = get_json(&app, &format!("/api/confabs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/confabs/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, _) = get_json(&app, &format!("/api/confabs/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configuration_round_trips_through_the_api() {
    let app = test_app(Arc::new(ScriptedHost::default()));

    let config = serde_json::json!({"model": "gpt-4", "temperature": 0.7});
    let (_, created) = send_json(
        &app,
        "POST",
        "/api/confabs",
        serde_json::json!({"name": "Bot A", "description": "demo", "configuration": config}),
    )
    .await;
    assert_eq!(created["configuration"]["model"], "gpt-4");
}
