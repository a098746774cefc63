pub mod analytics;
pub mod collections;
pub mod endpoints;
pub mod logs;
pub mod mock;

use axum::Router;
use axum::routing::{any, get};
use tower_http::catch_panic::CatchPanicLayer;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Collections
        .route(
            "/api/v1/collections",
            get(collections::list).post(collections::create),
        )
        .route(
            "/api/v1/collections/{id}",
            get(collections::get)
                .put(collections::update)
                .delete(collections::delete),
        )
        // Endpoints
        .route(
            "/api/v1/collections/{id}/endpoints",
            get(endpoints::list_by_collection).post(endpoints::create),
        )
        .route(
            "/api/v1/endpoints/{id}",
            get(endpoints::get)
                .put(endpoints::update)
                .delete(endpoints::delete),
        )
        // Request logs
        .route("/api/v1/logs", get(logs::list))
        // Analytics
        .route("/api/v1/analytics", get(analytics::summary))
}

pub fn mock_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/mock/{id}",
            any(mock::handle).options(mock::preflight),
        )
        .layer(CatchPanicLayer::custom(mock::handle_panic))
}
