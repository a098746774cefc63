use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Endpoint, EndpointInput, HttpMethod};
use crate::session::TeamContext;
use crate::state::{AppState, SharedState};

#[derive(Deserialize)]
pub struct EndpointRequest {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub method: String,
    pub status_code: i32,
    pub response_body: String,
}

/// An endpoint as the dashboard sees it, with the URL it is served at.
#[derive(Serialize)]
pub struct EndpointResponse {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub mock_url: String,
}

impl EndpointResponse {
    fn new(state: &AppState, endpoint: Endpoint) -> Self {
        let mock_url = state.config.mock_url(&endpoint.id.to_string());
        Self { endpoint, mock_url }
    }
}

pub async fn list_by_collection(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<Vec<EndpointResponse>>, AppError> {
    // Verify collection belongs to team
    state
        .store
        .find_collection(collection_id, team.team_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;

    let endpoints = state.store.list_endpoints(collection_id).await?;
    Ok(Json(
        endpoints
            .into_iter()
            .map(|e| EndpointResponse::new(&state, e))
            .collect(),
    ))
}

pub async fn create(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(collection_id): Path<Uuid>,
    Json(req): Json<EndpointRequest>,
) -> Result<Json<EndpointResponse>, AppError> {
    state
        .store
        .find_collection(collection_id, team.team_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;

    let input = validate(req)?;
    let endpoint = state.store.create_endpoint(collection_id, &input).await?;

    // Best effort, not atomic with the insert above.
    if let Err(e) = state.store.adjust_endpoint_count(collection_id, 1).await {
        tracing::warn!("Failed to increment endpoint count for collection {collection_id}: {e}");
    }

    tracing::info!(
        "Endpoint {} ({} {}) created in collection {collection_id}",
        endpoint.id,
        endpoint.method,
        endpoint.path
    );
    Ok(Json(EndpointResponse::new(&state, endpoint)))
}

pub async fn get(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndpointResponse>, AppError> {
    let endpoint = state
        .store
        .find_endpoint_scoped(id, team.team_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Endpoint not found".to_string()))?;
    Ok(Json(EndpointResponse::new(&state, endpoint)))
}

pub async fn update(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EndpointRequest>,
) -> Result<Json<EndpointResponse>, AppError> {
    let input = validate(req)?;

    let endpoint = state
        .store
        .update_endpoint(id, team.team_id(), &input)
        .await?
        .ok_or_else(|| AppError::NotFound("Endpoint not found".to_string()))?;
    Ok(Json(EndpointResponse::new(&state, endpoint)))
}

pub async fn delete(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let endpoint = state
        .store
        .delete_endpoint(id, team.team_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Endpoint not found".to_string()))?;

    if let Err(e) = state
        .store
        .adjust_endpoint_count(endpoint.collection_id, -1)
        .await
    {
        tracing::warn!(
            "Failed to decrement endpoint count for collection {}: {e}",
            endpoint.collection_id
        );
    }

    tracing::info!("Endpoint {id} deleted");
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

fn validate(req: EndpointRequest) -> Result<EndpointInput, AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::BadRequest(
            "Name must be between 1 and 100 characters".to_string(),
        ));
    }

    let method = HttpMethod::parse(&req.method).ok_or_else(|| {
        let allowed: Vec<&str> = HttpMethod::ALL.iter().map(|m| m.as_str()).collect();
        AppError::BadRequest(format!("Method must be one of {}", allowed.join(", ")))
    })?;

    if !(100..=999).contains(&req.status_code) {
        return Err(AppError::BadRequest(
            "Status code must be between 100 and 999".to_string(),
        ));
    }

    if serde_json::from_str::<serde_json::Value>(&req.response_body).is_err() {
        return Err(AppError::BadRequest(
            "Invalid JSON response body".to_string(),
        ));
    }

    Ok(EndpointInput {
        name: name.to_string(),
        path: req.path.trim().to_string(),
        method,
        status_code: req.status_code,
        response_body: req.response_body,
    })
}
