//! In-process stand-in for an Elasticsearch node.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

#[derive(Clone, Default)]
pub struct FakeEs {
    bodies: Arc<Mutex<Vec<String>>>,
    fail_bulk: bool,
    rejected_per_bulk: usize,
}

#[derive(Clone)]
struct FakeState {
    fake: FakeEs,
    version: String,
}

impl FakeEs {
    pub const TOOK: u64 = 7;

    pub fn failing() -> Self {
        Self {
            fail_bulk: true,
            ..Self::default()
        }
    }

    /// Answers every bulk with the first `count` items carrying an error.
    pub fn rejecting(count: usize) -> Self {
        Self {
            rejected_per_bulk: count,
            ..Self::default()
        }
    }

    /// Binds an ephemeral port and returns the base url.
    pub async fn spawn(&self, version: &str) -> String {
        let state = FakeState {
            fake: self.clone(),
            version: version.to_string(),
        };
        let app = Router::new()
            .route("/", get(root))
            .route("/_bulk", post(bulk))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn docs_received(&self) -> usize {
        self.bodies().iter().map(|body| body.lines().count() / 2).sum()
    }
}

async fn root(State(state): State<FakeState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "fake-node",
        "cluster_name": "fake-cluster",
        "cluster_uuid": "fake-uuid",
        "version": {"number": state.version, "lucene_version": "9.10.0"},
        "tagline": "You Know, for Search"
    }))
}

async fn bulk(State(state): State<FakeState>, body: String) -> Response {
    if state.fake.fail_bulk {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let docs = body.lines().count() / 2;
    state.fake.bodies.lock().unwrap().push(body);
    let rejected = state.fake.rejected_per_bulk.min(docs);
    let items: Vec<serde_json::Value> = (0..docs)
        .map(|i| {
            if i < rejected {
                json!({"index": {"status": 400, "error": {"type": "mapper_parsing_exception", "reason": "rejected"}}})
            } else {
                json!({"index": {"status": 201}})
            }
        })
        .collect();
    Json(json!({"took": FakeEs::TOOK, "errors": rejected > 0, "items": items})).into_response()
}
