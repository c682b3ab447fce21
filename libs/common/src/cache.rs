//! Redis-backed key-value store
//!
//! Lets several processes share one persisted backend. Keys are prefixed with
//! a namespace, which plays the role of the browser origin.

use anyhow::Result;
use redis::{Client, Commands, Connection};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::info;

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix applied to every key
    pub namespace: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_NAMESPACE`: Key prefix (default: "ticketapp")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let namespace =
            std::env::var("REDIS_NAMESPACE").unwrap_or_else(|_| "ticketapp".to_string());

        Ok(RedisConfig { url, namespace })
    }
}

/// Run a blocking redis call
///
/// The store contract is synchronous, so commands go over a blocking
/// connection. On a multi-threaded tokio runtime the worker is handed over
/// with `block_in_place` so other tasks keep running during the round trip.
fn run_blocking<T>(call: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}

/// Key-value store on top of a single blocking Redis connection
pub struct RedisStore {
    connection: Mutex<Connection>,
    namespace: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to Redis
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        let connection = client.get_connection()?;
        info!("Redis store connected to {}", config.url);
        Ok(RedisStore {
            connection: Mutex::new(connection),
            namespace: config.namespace.clone(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Check if Redis is reachable
    pub fn health_check(&self) -> StoreResult<bool> {
        run_blocking(|| {
            let mut conn = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            let pong: String = redis::cmd("PING").query(&mut *conn)?;
            Ok(pong == "PONG")
        })
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        run_blocking(|| {
            let mut conn = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            let value: Option<String> = conn.get(self.namespaced(key))?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        run_blocking(|| {
            let mut conn = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            let _: () = conn.set(self.namespaced(key), value)?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        run_blocking(|| {
            let mut conn = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            let _: u64 = conn.del(self.namespaced(key))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_blocking_outside_runtime() {
        assert_eq!(run_blocking(|| 1 + 1), 2);
    }

    #[tokio::test]
    async fn test_run_blocking_on_current_thread_runtime() {
        assert_eq!(run_blocking(|| "pong"), "pong");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_blocking_on_multi_thread_runtime() {
        let handle = tokio::spawn(async { run_blocking(|| 21 * 2) });
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_redis_connection() -> Result<()> {
        let store = RedisStore::connect(&RedisConfig::from_env()?)?;
        assert!(store.health_check()?);
        Ok(())
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_set_get_remove() -> Result<()> {
        let store = RedisStore::connect(&RedisConfig::from_env()?)?;

        store.set("test_key", "test_value")?;
        assert_eq!(store.get("test_key")?, Some("test_value".to_string()));

        store.remove("test_key")?;
        assert_eq!(store.get("test_key")?, None);
        Ok(())
    }
}
