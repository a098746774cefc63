use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RecordStore, StoreError, collections, endpoints, error_rate, request_logs};
use crate::models::{
    Collection, Endpoint, EndpointInput, LogPage, LogQuery, MinimalRequestLog, NewRequestLog,
    RequestStats,
};

/// Postgres-backed record store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get_endpoint(&self, id: &str) -> Result<Option<Endpoint>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        Ok(endpoints::find_by_id(&self.pool, id).await?)
    }

    async fn insert_request_log(&self, entry: &NewRequestLog) -> Result<(), StoreError> {
        Ok(request_logs::create(&self.pool, entry).await?)
    }

    async fn insert_request_log_minimal(
        &self,
        entry: &MinimalRequestLog,
    ) -> Result<(), StoreError> {
        Ok(request_logs::create_minimal(&self.pool, entry).await?)
    }

    async fn adjust_endpoint_count(
        &self,
        collection_id: Uuid,
        delta: i32,
    ) -> Result<(), StoreError> {
        Ok(collections::adjust_endpoint_count(&self.pool, collection_id, delta).await?)
    }

    async fn list_collections(&self, team_id: Uuid) -> Result<Vec<Collection>, StoreError> {
        Ok(collections::list(&self.pool, team_id).await?)
    }

    async fn find_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Collection>, StoreError> {
        Ok(collections::find_by_id(&self.pool, id, team_id).await?)
    }

    async fn create_collection(
        &self,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Collection, StoreError> {
        Ok(collections::create(&self.pool, team_id, name, description).await?)
    }

    async fn update_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Collection>, StoreError> {
        Ok(collections::update(&self.pool, id, team_id, name, description).await?)
    }

    async fn delete_collection(&self, id: Uuid, team_id: Uuid) -> Result<bool, StoreError> {
        Ok(collections::delete(&self.pool, id, team_id).await?)
    }

    async fn list_endpoints(&self, collection_id: Uuid) -> Result<Vec<Endpoint>, StoreError> {
        Ok(endpoints::list_by_collection(&self.pool, collection_id).await?)
    }

    async fn find_endpoint_scoped(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Endpoint>, StoreError> {
        Ok(endpoints::find_by_id_scoped(&self.pool, id, team_id).await?)
    }

    async fn create_endpoint(
        &self,
        collection_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Endpoint, StoreError> {
        Ok(endpoints::create(&self.pool, collection_id, input).await?)
    }

    async fn update_endpoint(
        &self,
        id: Uuid,
        team_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Option<Endpoint>, StoreError> {
        Ok(endpoints::update(&self.pool, id, team_id, input).await?)
    }

    async fn delete_endpoint(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Endpoint>, StoreError> {
        Ok(endpoints::delete(&self.pool, id, team_id).await?)
    }

    async fn list_request_logs(
        &self,
        team_id: Uuid,
        query: &LogQuery,
    ) -> Result<LogPage, StoreError> {
        let logs = request_logs::list(&self.pool, team_id, query).await?;
        let total = request_logs::count(&self.pool, team_id, query).await?;
        Ok(LogPage { logs, total })
    }

    async fn request_stats(&self, team_id: Uuid) -> Result<RequestStats, StoreError> {
        let (total_requests, avg_response_time_ms, errors) =
            request_logs::stats(&self.pool, team_id).await?;
        let active_endpoints = endpoints::count_for_team(&self.pool, team_id).await?;

        Ok(RequestStats {
            total_requests,
            avg_response_time_ms,
            error_rate: error_rate(errors, total_requests),
            active_endpoints,
        })
    }
}
