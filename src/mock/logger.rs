use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::RecordStore;
use crate::models::{MinimalRequestLog, NewRequestLog};

/// One dispatch attempt, as observed by the dispatcher.
#[derive(Debug, Clone)]
pub struct LogAttempt {
    pub endpoint_id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub status: u16,
    pub latency_ms: i64,
    pub client_ip: String,
    pub headers: serde_json::Value,
    pub body: Option<serde_json::Value>,
}

/// What ended up in the store for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    Full,
    Reduced,
    Dropped,
}

enum Command {
    Record(LogAttempt),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background request-log writer.
///
/// `log` never blocks and never fails: attempts are queued for the worker and
/// dropped (with a warning) if the queue is full or the worker is gone.
#[derive(Clone)]
pub struct RequestLogger {
    tx: mpsc::Sender<Command>,
}

impl RequestLogger {
    /// Start the writer task. It exits once every handle has been dropped.
    pub fn spawn(store: Arc<dyn RecordStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(run(store, rx));
        (Self { tx }, handle)
    }

    pub fn log(&self, attempt: LogAttempt) {
        match self.tx.try_send(Command::Record(attempt)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(Command::Record(attempt))) => {
                tracing::warn!(
                    "Request log queue full, dropping entry for endpoint {}",
                    attempt.endpoint_id
                );
            }
            Err(_) => {
                tracing::warn!("Request logger is not running, dropping entry");
            }
        }
    }

    /// Wait until everything queued before this call has been written (or given up on).
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run(store: Arc<dyn RecordStore>, mut rx: mpsc::Receiver<Command>) {
    tracing::debug!("Request logger started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(attempt) => {
                record(store.as_ref(), attempt).await;
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Request logger stopped");
}

/// Write one attempt: full row first, then the mandatory fields only.
///
/// The id is generated here rather than by the store so both tiers describe
/// the same entry.
pub async fn record(store: &dyn RecordStore, attempt: LogAttempt) -> LogOutcome {
    let entry = NewRequestLog {
        id: Uuid::now_v7(),
        endpoint_id: attempt.endpoint_id,
        timestamp: attempt.timestamp,
        method: attempt.method,
        response_status: i32::from(attempt.status),
        response_time_ms: attempt.latency_ms,
        request_ip: attempt.client_ip,
        request_headers: attempt.headers,
        request_body: attempt.body,
    };

    let full_err = match store.insert_request_log(&entry).await {
        Ok(()) => return LogOutcome::Full,
        Err(e) => e,
    };
    tracing::warn!(
        "Full request log insert failed for endpoint {}: {full_err}; retrying with minimal fields",
        entry.endpoint_id
    );

    match store
        .insert_request_log_minimal(&MinimalRequestLog::from(&entry))
        .await
    {
        Ok(()) => LogOutcome::Reduced,
        Err(e) => {
            tracing::error!(
                "Failed to log request {} for endpoint {}: {e}",
                entry.id,
                entry.endpoint_id
            );
            LogOutcome::Dropped
        }
    }
}
