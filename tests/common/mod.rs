#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use mockapi::config::Config;
use mockapi::db::MemoryStore;
use mockapi::models::Endpoint;
use mockapi::state::SharedState;

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub state: SharedState,
    pub client: Client,
    pub team_id: Uuid,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the request logger to write everything queued so far.
    pub async fn flush_logs(&self) {
        self.state.request_logger.flush().await;
    }

    /// Create a collection for the test team, return the collection JSON.
    pub async fn create_collection(&self, name: &str) -> Value {
        let (body, status) = self
            .post_team(
                "/api/v1/collections",
                &json!({ "name": name, "description": "test collection" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create collection failed: {body}");
        body
    }

    /// Create an endpoint through the API, return the endpoint JSON.
    pub async fn create_endpoint(
        &self,
        collection_id: &str,
        method: &str,
        status_code: i32,
        response_body: &str,
    ) -> Value {
        let (body, status) = self
            .post_team(
                &format!("/api/v1/collections/{collection_id}/endpoints"),
                &json!({
                    "name": "Test endpoint",
                    "path": "/api/test",
                    "method": method,
                    "status_code": status_code,
                    "response_body": response_body,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create endpoint failed: {body}");
        body
    }

    /// Store an endpoint directly, bypassing API validation.
    pub fn seed_endpoint(
        &self,
        collection_id: Uuid,
        method: &str,
        status_code: i32,
        response_body: &str,
    ) -> Uuid {
        let now = Utc::now();
        let id = Uuid::now_v7();
        self.store.insert_endpoint(Endpoint {
            id,
            collection_id,
            name: "Seeded".to_string(),
            path: "/seeded".to_string(),
            method: method.to_string(),
            status_code,
            response_body: response_body.to_string(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Call a mock endpoint, return (status, headers, parsed body).
    pub async fn call_mock(&self, method: Method, id: &str) -> (StatusCode, HeaderMap, Value) {
        let resp = self
            .client
            .request(method, self.url(&format!("/mock/{id}")))
            .send()
            .await
            .expect("mock request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (status, headers, body)
    }

    /// GET scoped to the test team.
    pub async fn get_team(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .header("x-team-id", self.team_id.to_string())
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST with JSON body, scoped to the test team.
    pub async fn post_team(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("x-team-id", self.team_id.to_string())
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// PUT with JSON body, scoped to the test team.
    pub async fn put_team(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .header("x-team-id", self.team_id.to_string())
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// DELETE scoped to the test team.
    pub async fn delete_team(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .header("x-team-id", self.team_id.to_string())
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://mock.test".to_string(),
        max_body_size: 1_048_576,
        trusted_proxies: vec![],
        log_level: "warn".to_string(),
        lookup_timeout: Duration::from_millis(200),
        log_queue_capacity: 64,
    }
}

/// Spawn a test app on a random port with a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let (app, state) = mockapi::build_app(store.clone(), test_config());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        store,
        state,
        client: Client::new(),
        team_id: Uuid::now_v7(),
    }
}
