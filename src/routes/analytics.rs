use axum::Json;
use axum::extract::State;

use crate::error::AppError;
use crate::models::RequestStats;
use crate::session::TeamContext;
use crate::state::SharedState;

pub async fn summary(
    team: TeamContext,
    State(state): State<SharedState>,
) -> Result<Json<RequestStats>, AppError> {
    let stats = state.store.request_stats(team.team_id()).await?;
    Ok(Json(stats))
}
