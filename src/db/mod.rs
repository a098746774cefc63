pub mod collections;
pub mod endpoints;
pub mod memory;
pub mod postgres;
pub mod request_logs;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Collection, Endpoint, EndpointInput, LogPage, LogQuery, MinimalRequestLog, NewRequestLog,
    RequestStats,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    /// The backend could not be reached or did not answer in time.
    Unavailable(String),
    /// The backend refused the write (constraint, schema mismatch).
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "database error: {err}"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Rejected(msg) => write!(f, "write rejected: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Typed query interface over everything the service persists.
///
/// Every call may fail independently. Lookups return `Ok(None)` for rows that
/// do not exist (or are not visible to the given team) rather than an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Dispatch path

    /// Public lookup used by mock dispatch. No team scope; ids that are not
    /// valid UUIDs simply do not exist.
    async fn get_endpoint(&self, id: &str) -> Result<Option<Endpoint>, StoreError>;
    async fn insert_request_log(&self, entry: &NewRequestLog) -> Result<(), StoreError>;
    async fn insert_request_log_minimal(&self, entry: &MinimalRequestLog)
    -> Result<(), StoreError>;
    /// Add `delta` to a collection's endpoint count, flooring the result at zero.
    async fn adjust_endpoint_count(&self, collection_id: Uuid, delta: i32)
    -> Result<(), StoreError>;

    // Collections

    async fn list_collections(&self, team_id: Uuid) -> Result<Vec<Collection>, StoreError>;
    async fn find_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Collection>, StoreError>;
    async fn create_collection(
        &self,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Collection, StoreError>;
    async fn update_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Collection>, StoreError>;
    /// Deletes the collection and every endpoint in it.
    async fn delete_collection(&self, id: Uuid, team_id: Uuid) -> Result<bool, StoreError>;

    // Endpoints

    async fn list_endpoints(&self, collection_id: Uuid) -> Result<Vec<Endpoint>, StoreError>;
    async fn find_endpoint_scoped(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Endpoint>, StoreError>;
    async fn create_endpoint(
        &self,
        collection_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Endpoint, StoreError>;
    async fn update_endpoint(
        &self,
        id: Uuid,
        team_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Option<Endpoint>, StoreError>;
    /// Returns the deleted row so callers can maintain its collection's count.
    async fn delete_endpoint(&self, id: Uuid, team_id: Uuid)
    -> Result<Option<Endpoint>, StoreError>;

    // Logs and analytics

    async fn list_request_logs(
        &self,
        team_id: Uuid,
        query: &LogQuery,
    ) -> Result<LogPage, StoreError>;
    async fn request_stats(&self, team_id: Uuid) -> Result<RequestStats, StoreError>;
}

/// Percentage of `errors` in `total`, rounded to two decimals.
pub(crate) fn error_rate(errors: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = errors as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
