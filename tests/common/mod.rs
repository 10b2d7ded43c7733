#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use bigchat_gtk::api::models::{RemoteId, Role, User};
use bigchat_gtk::{ApiClient, AppConfig, SessionStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub session: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    json: bool,
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<Recorded>>,
    routes: Mutex<HashMap<String, Canned>>,
}

/// Throwaway HTTP backend on 127.0.0.1 that records every request and answers
/// with whatever was canned for `METHOD /path`.
pub struct MockBackend {
    pub base_url: String,
    shared: Arc<Shared>,
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).ok();
    shared.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        session,
        body,
    });

    let key = format!("{} {}", method, uri.path());
    let canned = shared.routes.lock().unwrap().get(&key).cloned();
    match canned {
        Some(c) if c.json => (c.status, [(header::CONTENT_TYPE, "application/json")], c.body).into_response(),
        Some(c) => (c.status, c.body).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no route for {key}")).into_response(),
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new().fallback(handle).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/api"),
            shared,
        }
    }

    pub fn json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.canned(method, path, status, body.to_string(), true);
    }

    pub fn text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.canned(method, path, status, body.to_string(), false);
    }

    fn canned(&self, method: &str, path: &str, status: u16, body: String, json: bool) {
        self.shared.routes.lock().unwrap().insert(
            format!("{method} /api{path}"),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body,
                json,
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        let full = format!("/api{path}");
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == full)
            .count()
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            api_url: self.base_url.clone(),
            reconcile_delay_ms: 0,
            request_timeout_secs: 5,
            ..AppConfig::default()
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::from_config(&self.config(), Arc::new(SessionStore::in_memory())).unwrap()
    }

    pub fn chat(&self, client: &ApiClient) -> bigchat_gtk::state::ChatController {
        bigchat_gtk::state::ChatController::new(client.clone(), Duration::from_millis(0))
    }
}

pub fn ana() -> User {
    User {
        id: RemoteId::new("u1"),
        name: "Ana".into(),
        email: "cliente@x.com".into(),
        role: Role::Cliente,
    }
}

pub fn logged_in(client: &ApiClient) {
    client.session().login(ana(), "s1");
}
