use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use gitlane_core::{
    BranchMap, Commit, CommitId, ErrorKind, FileMap, GraphLayout, LayoutConfig, MergeOutcome,
    Registry, Repository, RepositoryId, RepositorySummary,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::debug;

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<Registry>>,
    pub layout: LayoutConfig,
    revision: Arc<AtomicU64>,
}

impl AppState {
    /// Wrap `registry` and count every registry or repository change.
    pub fn new(registry: Registry, layout: LayoutConfig) -> Self {
        let revision = Arc::new(AtomicU64::new(0));

        registry.subscribe(bump(&revision));
        for (_, repo) in registry.iter() {
            repo.subscribe(bump(&revision));
        }

        Self {
            registry: Arc::new(Mutex::new(registry)),
            layout,
            revision,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Registry>, ApiError> {
        self.registry.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registry lock poisoned".to_string(),
            )
        })
    }
}

fn bump(revision: &Arc<AtomicU64>) -> impl Fn() + Send + Sync + 'static {
    let revision = Arc::clone(revision);
    move || {
        revision.fetch_add(1, Ordering::SeqCst);
    }
}

fn core_error(err: gitlane_core::Error) -> ApiError {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::InvariantViolation => StatusCode::CONFLICT,
        ErrorKind::Malformed => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}

fn no_active_repository() -> ApiError {
    (StatusCode::NOT_FOUND, "No active repository".to_string())
}

fn parse_repository_id(id: &str) -> Result<RepositoryId, ApiError> {
    RepositoryId::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid UUID".to_string()))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/revision", get(get_revision))
        .route("/repositories", get(list_repositories))
        .route("/repositories", post(create_repository))
        .route("/repositories/:id/activate", post(activate_repository))
        .route("/repositories/:id", delete(delete_repository))
        .route("/repo", get(get_active_repository))
        .route("/repo/history", get(get_history))
        .route("/repo/commits", get(get_commits))
        .route("/repo/commits", post(create_commit))
        .route("/repo/commits/:id", get(get_commit))
        .route("/repo/branches", get(get_branches))
        .route("/repo/branches", post(create_branch))
        .route("/repo/checkout", post(checkout))
        .route("/repo/merge", post(merge))
        .route("/repo/layout", get(get_layout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn get_revision(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({"revision": state.revision()}))
}

// Registry

async fn list_repositories(State(state): State<AppState>) -> ApiResult<Vec<RepositorySummary>> {
    let registry = state.lock()?;
    Ok(Json(registry.list()))
}

#[derive(Deserialize)]
struct CreateRepositoryRequest {
    name: String,
}

async fn create_repository(
    State(state): State<AppState>,
    Json(req): Json<CreateRepositoryRequest>,
) -> Result<(StatusCode, Json<RepositorySummary>), ApiError> {
    let mut registry = state.lock()?;
    let id = registry.create_repository(req.name);

    let repo = registry.get(&id).map_err(core_error)?;
    repo.subscribe(bump(&state.revision));

    let summary = registry.summary(&id).map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn activate_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RepositorySummary> {
    let id = parse_repository_id(&id)?;
    let mut registry = state.lock()?;

    registry.switch_to(&id).map_err(core_error)?;
    registry.summary(&id).map(Json).map_err(core_error)
}

async fn delete_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<RepositorySummary>> {
    let id = parse_repository_id(&id)?;
    let mut registry = state.lock()?;

    let removed = registry.delete_repository(&id).map_err(core_error)?;
    debug!("Repository {} removed over API", removed.name());
    Ok(Json(registry.list()))
}

// Active repository

#[derive(Serialize)]
struct RepositoryView {
    id: RepositoryId,
    name: String,
    head: String,
    head_tip: Option<CommitId>,
    branches: BranchMap,
}

fn view(id: RepositoryId, repo: &Repository) -> RepositoryView {
    RepositoryView {
        id,
        name: repo.name().to_string(),
        head: repo.head().to_string(),
        head_tip: repo.head_tip().cloned(),
        branches: repo.branches().clone(),
    }
}

/// Run `f` against the active repository while holding the registry lock.
fn with_active<T>(
    state: &AppState,
    f: impl FnOnce(RepositoryId, &mut Repository) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut registry = state.lock()?;
    let id = registry.active_id().ok_or_else(no_active_repository)?;
    let repo = registry.get_mut(&id).map_err(core_error)?;
    f(id, repo)
}

async fn get_active_repository(State(state): State<AppState>) -> ApiResult<RepositoryView> {
    with_active(&state, |id, repo| Ok(Json(view(id, repo))))
}

async fn get_history(State(state): State<AppState>) -> ApiResult<Vec<Commit>> {
    with_active(&state, |_, repo| {
        Ok(Json(repo.history().into_iter().cloned().collect()))
    })
}

async fn get_commits(State(state): State<AppState>) -> ApiResult<Vec<Commit>> {
    with_active(&state, |_, repo| {
        Ok(Json(repo.all_commits().into_iter().cloned().collect()))
    })
}

async fn get_commit(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Commit> {
    let commit_id = CommitId::from(id.as_str());
    with_active(&state, |_, repo| {
        repo.commit_by_id(&commit_id)
            .cloned()
            .map(Json)
            .map_err(core_error)
    })
}

#[derive(Deserialize)]
struct CreateCommitRequest {
    message: String,
    #[serde(default)]
    files: FileMap,
}

async fn create_commit(
    State(state): State<AppState>,
    Json(req): Json<CreateCommitRequest>,
) -> Result<(StatusCode, Json<Commit>), ApiError> {
    with_active(&state, |_, repo| {
        let id = repo.commit(req.message, req.files);
        let commit = repo.commit_by_id(&id).cloned().map_err(core_error)?;
        Ok((StatusCode::CREATED, Json(commit)))
    })
}

async fn get_branches(State(state): State<AppState>) -> ApiResult<BranchMap> {
    with_active(&state, |_, repo| Ok(Json(repo.branches().clone())))
}

#[derive(Deserialize)]
struct BranchRequest {
    name: String,
}

async fn create_branch(
    State(state): State<AppState>,
    Json(req): Json<BranchRequest>,
) -> Result<(StatusCode, Json<BranchMap>), ApiError> {
    with_active(&state, |_, repo| {
        repo.branch(req.name).map_err(core_error)?;
        Ok((StatusCode::CREATED, Json(repo.branches().clone())))
    })
}

async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<BranchRequest>,
) -> ApiResult<RepositoryView> {
    with_active(&state, |id, repo| {
        repo.checkout(&req.name).map_err(core_error)?;
        Ok(Json(view(id, repo)))
    })
}

#[derive(Serialize)]
struct MergeResponse {
    merged: bool,
    commit: Option<Commit>,
}

async fn merge(
    State(state): State<AppState>,
    Json(req): Json<BranchRequest>,
) -> ApiResult<MergeResponse> {
    with_active(&state, |_, repo| {
        let response = match repo.merge(&req.name).map_err(core_error)? {
            MergeOutcome::Merged(id) => MergeResponse {
                merged: true,
                commit: Some(repo.commit_by_id(&id).cloned().map_err(core_error)?),
            },
            MergeOutcome::UpToDate => MergeResponse {
                merged: false,
                commit: None,
            },
        };
        Ok(Json(response))
    })
}

async fn get_layout(State(state): State<AppState>) -> ApiResult<GraphLayout> {
    let layout = state.layout;
    with_active(&state, |_, repo| Ok(Json(repo.layout(&layout))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Registry::with_initial("demo"), LayoutConfig::default())
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = create_router(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        send(state, "GET", uri, None).await
    }

    async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        send(state, "POST", uri, Some(body)).await
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state();
        let (status, body) = get(&state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_merge_flow_over_api() {
        let state = test_state();

        let first = json!({"message": "A", "files": {"a.txt": "1"}});
        let (status, _) = post(&state, "/repo/commits", first).await;
        assert_eq!(status, StatusCode::CREATED);

        post(&state, "/repo/branches", json!({"name": "feature"})).await;
        post(&state, "/repo/checkout", json!({"name": "feature"})).await;
        post(&state, "/repo/commits", json!({"message": "B"})).await;
        post(&state, "/repo/checkout", json!({"name": "main"})).await;
        post(&state, "/repo/commits", json!({"message": "C"})).await;

        let (status, body) = post(&state, "/repo/merge", json!({"name": "feature"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merged"], true);
        assert_eq!(body["commit"]["id"], "demo-c4");
        assert_eq!(body["commit"]["parents"], json!(["demo-c3", "demo-c2"]));

        let (status, layout) = get(&state, "/repo/layout").await;
        assert_eq!(status, StatusCode::OK);
        let merge_edges: Vec<_> = layout["edges"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["isMergeEdge"] == true)
            .collect();
        assert_eq!(merge_edges.len(), 1);
        assert_eq!(merge_edges[0]["parentId"], "demo-c2");
        assert_eq!(merge_edges[0]["childId"], "demo-c4");

        let (_, history) = get(&state, "/repo/history").await;
        assert_eq!(history.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let state = test_state();

        let (status, _) = post(&state, "/repo/checkout", json!({"name": "ghost"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post(&state, "/repo/branches", json!({"name": "main"})).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = post(&state, "/repo/merge", json!({"name": "main"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merged"], false);

        let (status, _) = send(&state, "DELETE", "/repositories/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_repository_lifecycle() {
        let state = test_state();
        let initial = state.lock().unwrap().active_id().unwrap();

        let (status, created) = post(&state, "/repositories", json!({"name": "second"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["active"], false);
        let second = created["id"].as_str().unwrap().to_string();

        let activate = format!("/repositories/{}/activate", second);
        let (status, activated) = post(&state, &activate, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(activated["active"], true);

        let (_, repo) = get(&state, "/repo").await;
        assert_eq!(repo["name"], "second");

        let uri = format!("/repositories/{}", second);
        let (status, remaining) = send(&state, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(remaining.as_array().unwrap().len(), 1);
        assert_eq!(remaining[0]["id"], initial.to_string());
        assert_eq!(remaining[0]["active"], true);

        let uri = format!("/repositories/{}", initial);
        let (status, _) = send(&state, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_revision_tracks_changes() {
        let state = test_state();
        assert_eq!(state.revision(), 0);

        post(&state, "/repo/commits", json!({"message": "A"})).await;
        assert_eq!(state.revision(), 1);

        let (_, created) = post(&state, "/repositories", json!({"name": "second"})).await;
        assert_eq!(state.revision(), 2);

        let second = created["id"].as_str().unwrap();
        let activate = format!("/repositories/{}/activate", second);
        post(&state, &activate, Value::Null).await;
        post(&state, "/repo/commits", json!({"message": "B"})).await;

        let (_, body) = get(&state, "/revision").await;
        assert_eq!(body["revision"], 4);
    }
}
