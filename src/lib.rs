pub mod config;
pub mod db;
pub mod error;
pub mod mock;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::RecordStore;
use crate::mock::RequestLogger;
use crate::state::{AppState, SharedState};

/// Build the router and the state behind it. Must be called inside a Tokio
/// runtime, since it starts the request-log writer.
pub fn build_app(store: Arc<dyn RecordStore>, config: Config) -> (Router, SharedState) {
    let (request_logger, _writer) = RequestLogger::spawn(store.clone(), config.log_queue_capacity);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        store,
        config,
        request_logger,
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::mock_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
