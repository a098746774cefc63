use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
    pub lookup_timeout: Duration,
    pub log_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let host: IpAddr = env_or("MOCKAPI_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid MOCKAPI_HOST: {e}"))?;

        let port: u16 = env_or("MOCKAPI_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid MOCKAPI_PORT: {e}"))?;

        let base_url = env_or("MOCKAPI_BASE_URL", &format!("http://{host}:{port}"));

        let max_body_size: usize = env_or("MOCKAPI_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid MOCKAPI_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("MOCKAPI_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid MOCKAPI_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("MOCKAPI_LOG_LEVEL", "info");

        let lookup_timeout_ms: u64 = env_or("MOCKAPI_LOOKUP_TIMEOUT_MS", "250")
            .parse()
            .map_err(|e| format!("Invalid MOCKAPI_LOOKUP_TIMEOUT_MS: {e}"))?;

        let log_queue_capacity: usize = env_or("MOCKAPI_LOG_QUEUE_CAPACITY", "1024")
            .parse()
            .map_err(|e| format!("Invalid MOCKAPI_LOG_QUEUE_CAPACITY: {e}"))?;
        if log_queue_capacity == 0 {
            return Err("MOCKAPI_LOG_QUEUE_CAPACITY must be at least 1".to_string());
        }

        Ok(Config {
            database_url,
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_body_size,
            trusted_proxies,
            log_level,
            lookup_timeout: Duration::from_millis(lookup_timeout_ms),
            log_queue_capacity,
        })
    }

    /// Public address a mock endpoint is served at.
    pub fn mock_url(&self, endpoint_id: &str) -> String {
        format!("{}/mock/{endpoint_id}", self.base_url)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
