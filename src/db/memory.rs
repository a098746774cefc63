use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{RecordStore, StoreError, error_rate};
use crate::models::{
    Collection, Endpoint, EndpointInput, LogPage, LogQuery, MinimalRequestLog, NewRequestLog,
    RequestLog, RequestLogView, RequestStats,
};

/// In-process record store. Used when no database is configured and by the
/// test suite, which can make individual operations fail or stall on demand.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<Uuid, Collection>,
    endpoints: DashMap<Uuid, Endpoint>,
    request_logs: DashMap<Uuid, RequestLog>,
    faults: Faults,
}

#[derive(Default)]
struct Faults {
    lookups: AtomicBool,
    full_log_inserts: AtomicBool,
    minimal_log_inserts: AtomicBool,
    count_updates: AtomicBool,
    lookup_delay_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.faults.lookups.store(fail, Ordering::SeqCst);
    }

    pub fn fail_full_log_inserts(&self, fail: bool) {
        self.faults.full_log_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_minimal_log_inserts(&self, fail: bool) {
        self.faults.minimal_log_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_count_updates(&self, fail: bool) {
        self.faults.count_updates.store(fail, Ordering::SeqCst);
    }

    /// Stall every public endpoint lookup by `delay`.
    pub fn delay_lookups(&self, delay: Duration) {
        self.faults
            .lookup_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Store an endpoint as-is, bypassing API validation (e.g. a non-JSON body).
    pub fn insert_endpoint(&self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.id, endpoint);
    }

    /// Every stored log entry, oldest first.
    pub fn request_logs(&self) -> Vec<RequestLog> {
        let mut logs: Vec<RequestLog> = self
            .request_logs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by_key(|log| (log.timestamp, log.id));
        logs
    }

    fn team_owns_collection(&self, collection_id: Uuid, team_id: Uuid) -> bool {
        self.collections
            .get(&collection_id)
            .is_some_and(|c| c.team_id == team_id)
    }

    /// Endpoints visible to a team, by id.
    fn team_endpoints(&self, team_id: Uuid) -> Vec<Endpoint> {
        self.endpoints
            .iter()
            .filter(|e| self.team_owns_collection(e.collection_id, team_id))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_endpoint(&self, id: &str) -> Result<Option<Endpoint>, StoreError> {
        let delay = self.faults.lookup_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.faults.lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("lookup failure injected".to_string()));
        }

        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.endpoints.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_request_log(&self, entry: &NewRequestLog) -> Result<(), StoreError> {
        if self.faults.full_log_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(
                "full log insert failure injected".to_string(),
            ));
        }

        self.request_logs.insert(
            entry.id,
            RequestLog {
                id: entry.id,
                endpoint_id: entry.endpoint_id.clone(),
                timestamp: entry.timestamp,
                method: Some(entry.method.clone()),
                response_status: entry.response_status,
                response_time_ms: entry.response_time_ms,
                request_ip: Some(entry.request_ip.clone()),
                request_headers: Some(entry.request_headers.clone()),
                request_body: entry.request_body.clone(),
            },
        );
        Ok(())
    }

    async fn insert_request_log_minimal(
        &self,
        entry: &MinimalRequestLog,
    ) -> Result<(), StoreError> {
        if self.faults.minimal_log_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(
                "minimal log insert failure injected".to_string(),
            ));
        }

        self.request_logs.insert(
            entry.id,
            RequestLog {
                id: entry.id,
                endpoint_id: entry.endpoint_id.clone(),
                timestamp: entry.timestamp,
                method: None,
                response_status: entry.response_status,
                response_time_ms: entry.response_time_ms,
                request_ip: None,
                request_headers: None,
                request_body: None,
            },
        );
        Ok(())
    }

    async fn adjust_endpoint_count(
        &self,
        collection_id: Uuid,
        delta: i32,
    ) -> Result<(), StoreError> {
        if self.faults.count_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "count update failure injected".to_string(),
            ));
        }

        if let Some(mut collection) = self.collections.get_mut(&collection_id) {
            collection.endpoint_count = collection.endpoint_count.saturating_add(delta).max(0);
        }
        Ok(())
    }

    async fn list_collections(&self, team_id: Uuid) -> Result<Vec<Collection>, StoreError> {
        let mut collections: Vec<Collection> = self
            .collections
            .iter()
            .filter(|c| c.team_id == team_id)
            .map(|c| c.value().clone())
            .collect();
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(collections)
    }

    async fn find_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Collection>, StoreError> {
        Ok(self
            .collections
            .get(&id)
            .filter(|c| c.team_id == team_id)
            .map(|c| c.value().clone()))
    }

    async fn create_collection(
        &self,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Collection, StoreError> {
        let now = Utc::now();
        let collection = Collection {
            id: Uuid::now_v7(),
            team_id,
            name: name.to_string(),
            description: description.to_string(),
            endpoint_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.collections.insert(collection.id, collection.clone());
        Ok(collection)
    }

    async fn update_collection(
        &self,
        id: Uuid,
        team_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Collection>, StoreError> {
        let Some(mut collection) = self.collections.get_mut(&id) else {
            return Ok(None);
        };
        if collection.team_id != team_id {
            return Ok(None);
        }
        collection.name = name.to_string();
        collection.description = description.to_string();
        collection.updated_at = Utc::now();
        Ok(Some(collection.clone()))
    }

    async fn delete_collection(&self, id: Uuid, team_id: Uuid) -> Result<bool, StoreError> {
        let removed = self
            .collections
            .remove_if(&id, |_, c| c.team_id == team_id)
            .is_some();
        if removed {
            self.endpoints.retain(|_, e| e.collection_id != id);
        }
        Ok(removed)
    }

    async fn list_endpoints(&self, collection_id: Uuid) -> Result<Vec<Endpoint>, StoreError> {
        let mut endpoints: Vec<Endpoint> = self
            .endpoints
            .iter()
            .filter(|e| e.collection_id == collection_id)
            .map(|e| e.value().clone())
            .collect();
        endpoints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(endpoints)
    }

    async fn find_endpoint_scoped(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Endpoint>, StoreError> {
        let endpoint = self.endpoints.get(&id).map(|e| e.value().clone());
        Ok(endpoint.filter(|e| self.team_owns_collection(e.collection_id, team_id)))
    }

    async fn create_endpoint(
        &self,
        collection_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Endpoint, StoreError> {
        if !self.collections.contains_key(&collection_id) {
            return Err(StoreError::Rejected(format!(
                "collection {collection_id} does not exist"
            )));
        }

        let now = Utc::now();
        let endpoint = Endpoint {
            id: Uuid::now_v7(),
            collection_id,
            name: input.name.clone(),
            path: input.path.clone(),
            method: input.method.as_str().to_string(),
            status_code: input.status_code,
            response_body: input.response_body.clone(),
            created_at: now,
            updated_at: now,
        };
        self.endpoints.insert(endpoint.id, endpoint.clone());
        Ok(endpoint)
    }

    async fn update_endpoint(
        &self,
        id: Uuid,
        team_id: Uuid,
        input: &EndpointInput,
    ) -> Result<Option<Endpoint>, StoreError> {
        let Some(mut endpoint) = self.endpoints.get_mut(&id) else {
            return Ok(None);
        };
        if !self.team_owns_collection(endpoint.collection_id, team_id) {
            return Ok(None);
        }
        endpoint.name = input.name.clone();
        endpoint.path = input.path.clone();
        endpoint.method = input.method.as_str().to_string();
        endpoint.status_code = input.status_code;
        endpoint.response_body = input.response_body.clone();
        endpoint.updated_at = Utc::now();
        Ok(Some(endpoint.clone()))
    }

    async fn delete_endpoint(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Endpoint>, StoreError> {
        Ok(self
            .endpoints
            .remove_if(&id, |_, e| self.team_owns_collection(e.collection_id, team_id))
            .map(|(_, e)| e))
    }

    async fn list_request_logs(
        &self,
        team_id: Uuid,
        query: &LogQuery,
    ) -> Result<LogPage, StoreError> {
        let paths: std::collections::HashMap<String, String> = self
            .team_endpoints(team_id)
            .into_iter()
            .filter(|e| query.endpoint_id.is_none_or(|id| id == e.id))
            .map(|e| (e.id.to_string(), e.path))
            .collect();
        let search = query.search.as_ref().map(|s| s.to_lowercase());

        let mut matching: Vec<RequestLogView> = self
            .request_logs
            .iter()
            .filter_map(|log| {
                let path = paths.get(&log.endpoint_id)?;
                if let Some(method) = &query.method {
                    if log.method.as_deref() != Some(method.as_str()) {
                        return None;
                    }
                }
                if let Some(search) = &search {
                    let ip = log.request_ip.as_deref().unwrap_or("").to_lowercase();
                    if !path.to_lowercase().contains(search) && !ip.contains(search) {
                        return None;
                    }
                }
                Some(RequestLogView {
                    id: log.id,
                    endpoint_id: log.endpoint_id.clone(),
                    endpoint_path: Some(path.clone()),
                    timestamp: log.timestamp,
                    method: log.method.clone(),
                    response_status: log.response_status,
                    response_time_ms: log.response_time_ms,
                    request_ip: log.request_ip.clone(),
                })
            })
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let logs = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok(LogPage { logs, total })
    }

    async fn request_stats(&self, team_id: Uuid) -> Result<RequestStats, StoreError> {
        let endpoints = self.team_endpoints(team_id);
        let ids: std::collections::HashSet<String> =
            endpoints.iter().map(|e| e.id.to_string()).collect();

        let (mut total, mut latency_sum, mut errors) = (0i64, 0i64, 0i64);
        for log in self.request_logs.iter() {
            if !ids.contains(&log.endpoint_id) {
                continue;
            }
            total += 1;
            latency_sum += log.response_time_ms;
            if log.response_status >= 400 {
                errors += 1;
            }
        }

        let avg_response_time_ms = if total > 0 {
            (latency_sum as f64 / total as f64).round() as i64
        } else {
            0
        };

        Ok(RequestStats {
            total_requests: total,
            avg_response_time_ms,
            error_rate: error_rate(errors, total),
            active_endpoints: endpoints.len() as i64,
        })
    }
}
