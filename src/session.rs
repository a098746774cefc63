use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;

pub const TEAM_HEADER: &str = "x-team-id";

/// The team a management request acts on.
///
/// Resolved per request from the `X-Team-Id` header and passed explicitly to
/// every scoped query. Verifying that the caller belongs to the team is the
/// job of the authenticating proxy in front of this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamContext {
    pub team_id: Uuid,
}

impl TeamContext {
    pub fn team_id(&self) -> Uuid {
        self.team_id
    }
}

impl FromRequestParts<SharedState> for TeamContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(TEAM_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing team context".to_string()))?;

        let team_id = header
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| AppError::Unauthorized("Invalid team context".to_string()))?;

        Ok(TeamContext { team_id })
    }
}
