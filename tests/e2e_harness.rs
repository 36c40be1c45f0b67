#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Scripted in-process stand-in for the ClarityAI backend. Each run id maps
/// to a queue of snapshots; every `GET /analysis/{run_id}` pops the next one
/// and the final snapshot repeats forever.
#[derive(Default)]
pub struct BackendState {
    scripts: Mutex<HashMap<String, VecDeque<Value>>>,
    run_hits: Mutex<HashMap<String, usize>>,
    ideas: Mutex<Vec<String>>,
    feedback: Mutex<Vec<(String, Value)>>,
    pending_run_ids: Mutex<VecDeque<String>>,
    run_list: Mutex<Vec<Value>>,
}

type SharedState = Arc<BackendState>;

async fn start_run(State(state): State<SharedState>, Json(body): Json<Value>) -> Json<Value> {
    let idea = body
        .get("idea")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    state
        .ideas
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(idea);

    let run_id = state
        .pending_run_ids
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop_front()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    Json(json!({ "run_id": run_id }))
}

async fn get_run(
    State(state): State<SharedState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    {
        let mut hits = state.run_hits.lock().unwrap_or_else(|e| e.into_inner());
        *hits.entry(run_id.clone()).or_insert(0) += 1;
    }

    let mut scripts = state.scripts.lock().unwrap_or_else(|e| e.into_inner());
    match scripts.get_mut(&run_id) {
        Some(queue) => {
            let snapshot = if queue.len() > 1 {
                queue.pop_front().unwrap_or_else(|| json!({}))
            } else {
                queue.front().cloned().unwrap_or_else(|| json!({}))
            };
            (StatusCode::OK, Json(snapshot))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Run not found" })),
        ),
    }
}

async fn list_runs(State(state): State<SharedState>) -> Json<Value> {
    let runs = state.run_list.lock().unwrap_or_else(|e| e.into_inner());
    Json(Value::Array(runs.clone()))
}

async fn post_feedback(
    State(state): State<SharedState>,
    Path(run_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state
        .feedback
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push((run_id, body));
    Json(json!({ "status": "resumed" }))
}

pub struct MockBackend {
    pub port: u16,
    pub state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockBackend {
    pub async fn start() -> TestResult<Self> {
        let state: SharedState = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/analysis/run", post(start_run))
            .route("/analysis", get(list_runs))
            .route("/analysis/{run_id}", get(get_run))
            .route("/analysis/{run_id}/feedback", post(post_feedback))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            port,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Queue the run id returned by the next `POST /analysis/run`.
    pub fn expect_run_id(&self, run_id: &str) {
        self.state
            .pending_run_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(run_id.to_string());
    }

    /// Script the sequence of snapshots served for a run; the last repeats.
    pub fn script_run(&self, run_id: &str, snapshots: Vec<Value>) {
        self.state
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(run_id.to_string(), snapshots.into());
    }

    pub fn set_run_list(&self, runs: Vec<Value>) {
        *self.state.run_list.lock().unwrap_or_else(|e| e.into_inner()) = runs;
    }

    pub fn run_hits(&self, run_id: &str) -> usize {
        self.state
            .run_hits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(run_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn submitted_ideas(&self) -> Vec<String> {
        self.state
            .ideas
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn submitted_feedback(&self) -> Vec<(String, Value)> {
        self.state
            .feedback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Sandboxed environments may refuse to bind sockets; tests skip instead of
/// failing when that happens.
pub fn bind_refused(err: &(dyn std::error::Error + 'static)) -> bool {
    let text = err.to_string();
    text.contains("Operation not permitted") || text.contains("Permission denied")
}
