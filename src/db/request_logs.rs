use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{LogQuery, MinimalRequestLog, NewRequestLog, RequestLogView};

pub async fn create(pool: &PgPool, entry: &NewRequestLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO request_logs
            (id, endpoint_id, timestamp, method, response_status, response_time_ms,
             request_ip, request_headers, request_body)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(entry.id)
    .bind(&entry.endpoint_id)
    .bind(entry.timestamp)
    .bind(&entry.method)
    .bind(entry.response_status)
    .bind(entry.response_time_ms)
    .bind(&entry.request_ip)
    .bind(&entry.request_headers)
    .bind(entry.request_body.as_ref())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_minimal(pool: &PgPool, entry: &MinimalRequestLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO request_logs (id, endpoint_id, timestamp, response_status, response_time_ms)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(entry.id)
    .bind(&entry.endpoint_id)
    .bind(entry.timestamp)
    .bind(entry.response_status)
    .bind(entry.response_time_ms)
    .execute(pool)
    .await?;
    Ok(())
}

// Logs are only visible to a team while the endpoint they reference still exists.
const TEAM_SCOPE: &str = "FROM request_logs l
     JOIN endpoints e ON l.endpoint_id = e.id::text
     JOIN collections c ON e.collection_id = c.id
     WHERE c.team_id = $1
       AND ($2::uuid IS NULL OR e.id = $2)
       AND ($3::text IS NULL OR l.method = $3)
       AND ($4::text IS NULL OR e.path ILIKE $4 ESCAPE '\\' OR l.request_ip ILIKE $4 ESCAPE '\\')";

/// Substring pattern for `ILIKE ... ESCAPE '\'` that matches `search` literally.
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list(
    pool: &PgPool,
    team_id: Uuid,
    query: &LogQuery,
) -> Result<Vec<RequestLogView>, sqlx::Error> {
    let search_pattern = query.search.as_deref().map(like_pattern);

    sqlx::query_as::<_, RequestLogView>(&format!(
        "SELECT l.id, l.endpoint_id, e.path AS endpoint_path, l.timestamp, l.method,
                l.response_status, l.response_time_ms, l.request_ip
         {TEAM_SCOPE}
         ORDER BY l.timestamp DESC LIMIT $5 OFFSET $6"
    ))
    .bind(team_id)
    .bind(query.endpoint_id)
    .bind(query.method.as_deref())
    .bind(search_pattern)
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, team_id: Uuid, query: &LogQuery) -> Result<i64, sqlx::Error> {
    let search_pattern = query.search.as_deref().map(like_pattern);

    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) {TEAM_SCOPE}"))
        .bind(team_id)
        .bind(query.endpoint_id)
        .bind(query.method.as_deref())
        .bind(search_pattern)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// (total requests, average latency in ms, requests answered with status >= 400)
pub async fn stats(pool: &PgPool, team_id: Uuid) -> Result<(i64, i64, i64), sqlx::Error> {
    sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(ROUND(AVG(l.response_time_ms)), 0)::BIGINT,
                COUNT(*) FILTER (WHERE l.response_status >= 400)
         FROM request_logs l
         JOIN endpoints e ON l.endpoint_id = e.id::text
         JOIN collections c ON e.collection_id = c.id
         WHERE c.team_id = $1",
    )
    .bind(team_id)
    .fetch_one(pool)
    .await
}
