use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Endpoint, EndpointInput};

pub async fn list_by_collection(
    pool: &PgPool,
    collection_id: Uuid,
) -> Result<Vec<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "SELECT * FROM endpoints WHERE collection_id = $1 ORDER BY created_at DESC",
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    collection_id: Uuid,
    input: &EndpointInput,
) -> Result<Endpoint, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "INSERT INTO endpoints (collection_id, name, path, method, status_code, response_body)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(collection_id)
    .bind(&input.name)
    .bind(&input.path)
    .bind(input.method.as_str())
    .bind(input.status_code)
    .bind(&input.response_body)
    .fetch_one(pool)
    .await
}

/// Public lookup used by mock dispatch, no team check.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>("SELECT * FROM endpoints WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Management lookup, team-scoped via the collection.
pub async fn find_by_id_scoped(
    pool: &PgPool,
    id: Uuid,
    team_id: Uuid,
) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "SELECT e.* FROM endpoints e
         JOIN collections c ON e.collection_id = c.id
         WHERE e.id = $1 AND c.team_id = $2",
    )
    .bind(id)
    .bind(team_id)
    .fetch_optional(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    team_id: Uuid,
    input: &EndpointInput,
) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "UPDATE endpoints
         SET name = $3, path = $4, method = $5, status_code = $6, response_body = $7,
             updated_at = now()
         WHERE id = $1 AND collection_id IN (SELECT id FROM collections WHERE team_id = $2)
         RETURNING *",
    )
    .bind(id)
    .bind(team_id)
    .bind(&input.name)
    .bind(&input.path)
    .bind(input.method.as_str())
    .bind(input.status_code)
    .bind(&input.response_body)
    .fetch_optional(pool)
    .await
}

pub async fn delete(
    pool: &PgPool,
    id: Uuid,
    team_id: Uuid,
) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "DELETE FROM endpoints
         WHERE id = $1 AND collection_id IN (SELECT id FROM collections WHERE team_id = $2)
         RETURNING *",
    )
    .bind(id)
    .bind(team_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_for_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM endpoints e
         JOIN collections c ON e.collection_id = c.id
         WHERE c.team_id = $1",
    )
    .bind(team_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
