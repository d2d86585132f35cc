//! HTTP surface for confab CRUD.
//!
//! The mirror is invoked best-effort from the create and update handlers:
//! a mirror failure is logged and swallowed, the local record wins. On
//! creation the resulting pull-request URL is persisted as `github_url`;
//! on update the prior URL is kept so later updates keep resolving the
//! same base branch.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::mirror::render::ConfabDraft;
use crate::mirror::orchestrator::ConfabMirror;
use crate::settings::Settings;
use crate::store::db::DbHandle;
use crate::store::models::bump_version;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub mirror: ConfabMirror,
    pub settings: Settings,
}

pub type SharedState = Arc<AppState>;

// ── Request payload ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ConfabPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub guardrails: Option<String>,
    #[serde(default)]
    pub tests: Option<String>,
    #[serde(default)]
    pub configuration: Option<serde_json::Value>,
}

impl ConfabPayload {
    fn draft(&self) -> ConfabDraft {
        ConfabDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            purpose: self.purpose.clone(),
            guardrails: self.guardrails.clone(),
            tests: self.tests.clone(),
            configuration: match &self.configuration {
                Some(serde_json::Value::Object(map)) => map.clone(),
                _ => serde_json::Map::new(),
            },
        }
    }
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::Internal(err.to_string())
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/confabs", get(list_confabs).post(create_confab))
        .route(
            "/api/confabs/{id}",
            get(get_confab).put(update_confab).delete(delete_confab),
        )
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_confabs(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let confabs = state
        .db
        .call(|db| db.list_confabs())
        .await
        .map_err(internal)?;
    Ok(Json(confabs))
}

async fn get_confab(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let confab = state
        .db
        .call(move |db| db.get_confab(id))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound(format!("Confab {id} not found")))?;
    Ok(Json(confab))
}

async fn create_confab(
    State(state): State<SharedState>,
    Json(payload): Json<ConfabPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Confab name must not be empty".into()));
    }

    let name = payload.name.clone();
    let description = payload.description.clone();
    let configuration = payload.configuration.clone();
    let confab = state
        .db
        .call(move |db| db.create_confab(&name, &description, configuration.as_ref()))
        .await
        .map_err(internal)?;

    let confab = match state
        .mirror
        .create_mirror(
            &payload.draft(),
            &state.settings.mirror_owner,
            &state.settings.mirror_repo,
            state.settings.github_token.as_deref(),
        )
        .await
    {
        Ok(url) => {
            let id = confab.id;
            state
                .db
                .call(move |db| db.set_github_url(id, &url))
                .await
                .map_err(internal)?
        }
        Err(err) => {
            tracing::warn!(
                confab = %confab.name,
                stage = ?err.stage(),
                error = %err,
                "mirror creation failed; keeping record without github_url"
            );
            confab
        }
    };

    Ok((StatusCode::CREATED, Json(confab)))
}

async fn update_confab(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(payload): Json<ConfabPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Confab name must not be empty".into()));
    }

    let existing = state
        .db
        .call(move |db| db.get_confab(id))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound(format!("Confab {id} not found")))?;

    let version = bump_version(&existing.version);
    let name = payload.name.clone();
    let description = payload.description.clone();
    let configuration = payload.configuration.clone();
    let confab = state
        .db
        .call(move |db| {
            db.update_confab(id, &name, &description, configuration.as_ref(), &version)
        })
        .await
        .map_err(internal)?;

    if let Some(pull_url) = &confab.github_url {
        match state.settings.github_token.as_deref() {
            Some(token) => {
                match state
                    .mirror
                    .update_mirror(&payload.draft(), pull_url, token)
                    .await
                {
                    Ok(new_url) => {
                        tracing::info!(confab = %confab.name, pull = %new_url, "mirror update opened");
                    }
                    Err(err) => {
                        tracing::warn!(
                            confab = %confab.name,
                            stage = ?err.stage(),
                            error = %err,
                            "mirror update failed; prior github_url retained"
                        );
                    }
                }
            }
            None => {
                tracing::warn!(confab = %confab.name, "no GitHub token configured; skipping mirror update");
            }
        }
    }

    Ok(Json(confab))
}

async fn delete_confab(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .call(move |db| db.delete_confab(id))
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Confab {id} not found")));
    }
    Ok(Json(serde_json::json!({
        "message": "Confab deleted successfully"
    })))
}
