use serde_json::{Value, json};

/// Turn a stored response body into the JSON payload served for it.
///
/// Bodies are meant to be JSON but older rows and direct store writes are not
/// guaranteed to be, so anything unparseable is served as `{"message": <raw>}`.
pub fn render(stored: &str) -> Value {
    serde_json::from_str(stored).unwrap_or_else(|_| json!({ "message": stored }))
}

/// Same fallback for captured request bodies, keyed `raw`. Empty bodies are not captured.
pub fn snapshot_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(_) => Some(json!({ "raw": String::from_utf8_lossy(body) })),
    }
}
