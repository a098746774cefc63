use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::LogQuery;
use crate::session::TeamContext;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub method: Option<String>,
    pub search: Option<String>,
    pub endpoint_id: Option<Uuid>,
}

pub async fn list(
    team: TeamContext,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(50).clamp(1, 100);

    let query = LogQuery {
        endpoint_id: params.endpoint_id,
        method: params
            .method
            .map(|m| m.trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty()),
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        limit,
        offset: (page - 1).saturating_mul(limit),
    };

    let result = state.store.list_request_logs(team.team_id(), &query).await?;

    Ok(Json(serde_json::json!({
        "logs": result.logs,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": result.total,
            "pages": (result.total as f64 / limit as f64).ceil() as i64,
        },
    })))
}
