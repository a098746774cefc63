use std::net::IpAddr;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};

use crate::models::Endpoint;
use crate::state::AppState;

use super::logger::LogAttempt;
use super::{metadata, render};

/// What the mock consumer sent, beyond the method and endpoint id.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
    pub peer_addr: Option<IpAddr>,
}

/// A served mock response. Always carries `Access-Control-Allow-Origin: *`.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Set on 405 to the endpoint's configured method.
    pub allow: Option<String>,
}

impl MockResponse {
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
            allow: None,
        }
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "Endpoint not found")
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        if let Some(allow) = self.allow.and_then(|m| HeaderValue::from_str(&m).ok()) {
            headers.insert(header::ALLOW, allow);
        }
        response
    }
}

/// Resolve a request against the endpoint registered under `endpoint_id`.
///
/// Every outcome is handed to the request logger before returning; the log
/// write itself happens later on the logger's worker.
pub async fn dispatch(
    state: &AppState,
    endpoint_id: &str,
    method: &Method,
    request: &InboundRequest,
) -> MockResponse {
    let started = Instant::now();
    let timestamp = Utc::now();

    let endpoint = lookup(state, endpoint_id).await;
    let response = match endpoint {
        None => MockResponse::not_found(),
        Some(endpoint) => respond(&endpoint, method),
    };

    state.request_logger.log(LogAttempt {
        endpoint_id: endpoint_id.to_string(),
        timestamp,
        method: method.as_str().to_string(),
        status: response.status.as_u16(),
        latency_ms: started.elapsed().as_millis() as i64,
        client_ip: metadata::client_ip(
            &request.headers,
            request.peer_addr,
            &state.config.trusted_proxies,
        ),
        headers: metadata::header_snapshot(&request.headers),
        body: render::snapshot_body(&request.body),
    });

    response
}

/// Lookup bounded by the configured timeout. Errors and timeouts are treated
/// as a missing endpoint.
async fn lookup(state: &AppState, endpoint_id: &str) -> Option<Endpoint> {
    match tokio::time::timeout(
        state.config.lookup_timeout,
        state.store.get_endpoint(endpoint_id),
    )
    .await
    {
        Ok(Ok(endpoint)) => endpoint,
        Ok(Err(e)) => {
            tracing::warn!("Endpoint lookup for {endpoint_id} failed: {e}");
            None
        }
        Err(_) => {
            tracing::warn!(
                "Endpoint lookup for {endpoint_id} timed out after {}ms",
                state.config.lookup_timeout.as_millis()
            );
            None
        }
    }
}

fn respond(endpoint: &Endpoint, method: &Method) -> MockResponse {
    // Stored methods are normalized at registration, so this is an exact match.
    if endpoint.method != method.as_str() {
        return MockResponse {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: json!({ "error": format!("Method {} not allowed", method.as_str()) }),
            allow: Some(endpoint.method.clone()),
        };
    }

    // 1xx cannot be a final response; hyper would swap in its own bare 500.
    let status = u16::try_from(endpoint.status_code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|status| !status.is_informational());
    let Some(status) = status else {
        tracing::error!(
            "Endpoint {} has a status code HTTP cannot express: {}",
            endpoint.id,
            endpoint.status_code
        );
        return MockResponse::internal_error();
    };

    MockResponse {
        status,
        body: render::render(&endpoint.response_body),
        allow: None,
    }
}
