//! In-process stand-in for the notification server.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::Notify};

#[derive(Clone, Default)]
pub struct FakeServer {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub notifications: Arc<Mutex<Value>>,
    /// When set, `GET /notificaciones` waits for a permit before answering.
    pub gate: Option<Arc<Notify>>,
    pub fail_list: bool,
}

impl FakeServer {
    pub fn with_notifications(notifications: Value) -> Self {
        Self {
            notifications: Arc::new(Mutex::new(notifications)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    /// Starts serving on a random local port and returns the API base URL.
    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/api/notificaciones", get(list))
            .route("/api/notificaciones/:id", delete(remove))
            .route("/api/notificaciones/:id/leida", patch(mark_read))
            .route("/api/tokens/register", post(register))
            .with_state(self);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}/api")
    }

    /// Polls the call log until `expected` shows up or a few seconds pass.
    pub async fn wait_for_call(&self, expected: &str) -> bool {
        for _ in 0..100 {
            if self.calls().iter().any(|call| call == expected) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

async fn list(State(server): State<FakeServer>) -> Result<Json<Value>, StatusCode> {
    server.record("GET /notificaciones".into());
    if let Some(gate) = &server.gate {
        gate.notified().await;
    }
    if server.fail_list {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let body = server.notifications.lock().expect("notifications lock").clone();
    Ok(Json(body))
}

async fn mark_read(State(server): State<FakeServer>, Path(id): Path<String>) -> Json<Value> {
    server.record(format!("PATCH /notificaciones/{id}/leida"));
    Json(json!({ "ok": true }))
}

async fn remove(State(server): State<FakeServer>, Path(id): Path<String>) -> Json<Value> {
    server.record(format!("DELETE /notificaciones/{id}"));
    Json(json!({ "ok": true }))
}

async fn register(State(server): State<FakeServer>, Json(body): Json<Value>) -> StatusCode {
    let token = body["token"].as_str().unwrap_or_default().to_string();
    server.record(format!("POST /tokens/register {token}"));
    StatusCode::CREATED
}
