use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Collection;
use crate::session::TeamContext;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CollectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn list(
    team: TeamContext,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Collection>>, AppError> {
    let collections = state.store.list_collections(team.team_id()).await?;
    Ok(Json(collections))
}

pub async fn create(
    team: TeamContext,
    State(state): State<SharedState>,
    Json(req): Json<CollectionRequest>,
) -> Result<Json<Collection>, AppError> {
    let name = validate_name(&req.name)?;

    let collection = state
        .store
        .create_collection(team.team_id(), name, req.description.trim())
        .await?;

    tracing::info!(
        "Collection {} created for team {}",
        collection.id,
        team.team_id()
    );
    Ok(Json(collection))
}

pub async fn get(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Collection>, AppError> {
    let collection = state
        .store
        .find_collection(id, team.team_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;
    Ok(Json(collection))
}

pub async fn update(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CollectionRequest>,
) -> Result<Json<Collection>, AppError> {
    let name = validate_name(&req.name)?;

    let collection = state
        .store
        .update_collection(id, team.team_id(), name, req.description.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;
    Ok(Json(collection))
}

pub async fn delete(
    team: TeamContext,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.store.delete_collection(id, team.team_id()).await? {
        return Err(AppError::NotFound("Collection not found".to_string()));
    }

    tracing::info!("Collection {id} deleted for team {}", team.team_id());
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::BadRequest(
            "Name must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(name)
}
