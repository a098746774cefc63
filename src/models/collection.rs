use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub description: String,
    /// Denormalized; maintained after endpoint create/delete, never below zero.
    pub endpoint_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
