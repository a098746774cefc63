use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RequestLog {
    pub id: Uuid,
    /// Opaque reference; not constrained, so entries outlive their endpoint.
    pub endpoint_id: String,
    pub timestamp: DateTime<Utc>,
    pub method: Option<String>,
    pub response_status: i32,
    pub response_time_ms: i64,
    pub request_ip: Option<String>,
    pub request_headers: Option<serde_json::Value>,
    pub request_body: Option<serde_json::Value>,
}

/// Full-fidelity log row.
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub id: Uuid,
    pub endpoint_id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub response_status: i32,
    pub response_time_ms: i64,
    pub request_ip: String,
    pub request_headers: serde_json::Value,
    pub request_body: Option<serde_json::Value>,
}

/// Mandatory fields only, written when the full row is rejected.
#[derive(Debug, Clone)]
pub struct MinimalRequestLog {
    pub id: Uuid,
    pub endpoint_id: String,
    pub timestamp: DateTime<Utc>,
    pub response_status: i32,
    pub response_time_ms: i64,
}

impl From<&NewRequestLog> for MinimalRequestLog {
    fn from(entry: &NewRequestLog) -> Self {
        MinimalRequestLog {
            id: entry.id,
            endpoint_id: entry.endpoint_id.clone(),
            timestamp: entry.timestamp,
            response_status: entry.response_status,
            response_time_ms: entry.response_time_ms,
        }
    }
}

/// A log row joined with the path of the endpoint it hit, if that endpoint still exists.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RequestLogView {
    pub id: Uuid,
    pub endpoint_id: String,
    pub endpoint_path: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub method: Option<String>,
    pub response_status: i32,
    pub response_time_ms: i64,
    pub request_ip: Option<String>,
}

pub struct LogQuery {
    pub endpoint_id: Option<Uuid>,
    /// Uppercased before it reaches the store.
    pub method: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogPage {
    pub logs: Vec<RequestLogView>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestStats {
    pub total_requests: i64,
    pub avg_response_time_ms: i64,
    pub error_rate: f64,
    pub active_endpoints: i64,
}
