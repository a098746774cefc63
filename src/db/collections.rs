use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Collection;

pub async fn list(pool: &PgPool, team_id: Uuid) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE team_id = $1 ORDER BY created_at DESC",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    team_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Collection, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "INSERT INTO collections (team_id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(team_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    team_id: Uuid,
) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1 AND team_id = $2")
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    team_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "UPDATE collections SET name = $3, description = $4, updated_at = now()
         WHERE id = $1 AND team_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(team_id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
}

/// Single-row update, so concurrent adjustments never lose an increment.
pub async fn adjust_endpoint_count(
    pool: &PgPool,
    id: Uuid,
    delta: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE collections SET endpoint_count = GREATEST(endpoint_count + $2, 0)
         WHERE id = $1",
    )
    .bind(id)
    .bind(delta)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND team_id = $2")
        .bind(id)
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
