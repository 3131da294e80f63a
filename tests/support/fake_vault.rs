//! In-process stand-in for a Vault KV v2 mount, bound to an ephemeral port.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "integration-test-token";

pub const CAS_VIOLATION_BODY: &str =
    r#"{"errors":["check-and-set parameter did not match the current version"]}"#;

/// Scripted behaviour for the fake mount.
pub enum VaultBehavior {
    /// Honour `cas: 0` against an in-memory path set, as the real engine does.
    CreateOnly,
    /// Report a CAS violation for the first `n` writes, then accept.
    ConflictTimes(usize),
    /// Always answer with the given status and body.
    Reject(u16, &'static str),
}

struct FakeVaultState {
    behavior: VaultBehavior,
    hits: Arc<AtomicUsize>,
    written: Mutex<HashSet<String>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

pub struct FakeVault {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl FakeVault {
    pub async fn spawn(behavior: VaultBehavior) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake vault");
        let addr = listener.local_addr().expect("fake vault addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(None));
        let state = Arc::new(FakeVaultState {
            behavior,
            hits: hits.clone(),
            written: Mutex::new(HashSet::new()),
            last_body: last_body.clone(),
        });
        let app = Router::new()
            .route("/v1/secret/data/{*path}", post(handle_write))
            .with_state(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake vault server");
        });
        Self {
            base_url: format!("http://{addr}"),
            hits,
            last_body,
        }
    }

    pub fn write_attempts(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

async fn handle_write(
    State(state): State<Arc<FakeVaultState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let attempt = state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = Some(body.clone());

    if headers.get("X-Vault-Token").and_then(|v| v.to_str().ok()) != Some(TEST_TOKEN) {
        return (
            StatusCode::FORBIDDEN,
            r#"{"errors":["permission denied"]}"#.to_string(),
        );
    }
    let cas = body.pointer("/options/cas").and_then(Value::as_u64);
    assert_eq!(cas, Some(0), "every write must assert cas 0");

    match &state.behavior {
        VaultBehavior::Reject(status, body) => (
            StatusCode::from_u16(*status).expect("scripted status"),
            body.to_string(),
        ),
        VaultBehavior::ConflictTimes(n) if attempt < *n => {
            (StatusCode::BAD_REQUEST, CAS_VIOLATION_BODY.to_string())
        }
        VaultBehavior::ConflictTimes(_) => (StatusCode::OK, accepted_body()),
        VaultBehavior::CreateOnly => {
            if state.written.lock().unwrap().insert(path) {
                (StatusCode::OK, accepted_body())
            } else {
                (StatusCode::BAD_REQUEST, CAS_VIOLATION_BODY.to_string())
            }
        }
    }
}

fn accepted_body() -> String {
    json!({
        "data": {
            "created_time": "2026-01-01T00:00:00.000000000Z",
            "destroyed": false,
            "version": 1
        }
    })
    .to_string()
}
