use std::any::Any;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::mock::{self, InboundRequest, MockResponse};
use crate::state::SharedState;

pub async fn handle(
    State(state): State<SharedState>,
    Path(endpoint_id): Path<String>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();

    let peer_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    // The body is only captured for the request log, so an unreadable or
    // oversized one must not change the response.
    let body = match axum::body::to_bytes(body, state.config.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Request body for mock {endpoint_id} not captured: {e}");
            Bytes::new()
        }
    };

    let inbound = InboundRequest {
        headers: parts.headers,
        body,
        peer_addr,
    };

    mock::dispatch(&state, &endpoint_id, &parts.method, &inbound)
        .await
        .into_response()
}

pub async fn preflight() -> Response {
    (
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                "GET, POST, PUT, DELETE, PATCH",
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization",
            ),
        ],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

/// Panics anywhere under `/mock` become a generic 500 with the usual CORS header.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Mock dispatch panicked: {detail}");

    MockResponse::internal_error().into_response()
}
