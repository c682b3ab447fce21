//! Application root
//!
//! Owns the backend services and the session context, and hands the context
//! to the route guard explicitly.

use anyhow::{Result, bail};
use auth::{AuthApi, SessionContext};
use common::{
    BackendContext,
    cache::{RedisConfig, RedisStore},
    clock::SystemClock,
    network::SimulatedNetwork,
    store::{FileStore, KeyValueStore, MemoryStore},
};
use std::sync::Arc;
use tickets::TicketApi;
use tracing::info;

use crate::{
    config::{Settings, StorageBackend},
    middleware::{Navigation, RouteGuard},
};

/// Application state shared across commands
#[derive(Debug, Clone)]
pub struct AppState {
    pub tickets: TicketApi,
    pub session: SessionContext,
    pub guard: RouteGuard,
}

impl AppState {
    /// Wire the services over an existing backend context
    pub fn new(ctx: BackendContext, settings: &Settings) -> Self {
        let auth = AuthApi::new(ctx.clone()).with_session_ttl(settings.session_ttl());
        let tickets = TicketApi::new(ctx).with_list_failure_rate(settings.list_failure_rate);
        let session = SessionContext::new(auth);
        let guard = RouteGuard::new(session.clone());

        Self {
            tickets,
            session,
            guard,
        }
    }

    /// Build the application from settings, opening the configured store
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = open_store(settings)?;
        let network = match settings.seed {
            Some(seed) => SimulatedNetwork::seeded(settings.latency(), seed),
            None => SimulatedNetwork::new(settings.latency()),
        };

        let ctx = BackendContext::new(store, network, Arc::new(SystemClock));
        Ok(Self::new(ctx, settings))
    }

    pub fn auth(&self) -> &AuthApi {
        self.session.api()
    }

    /// Run the route guard for `location`
    pub async fn navigate(&self, location: &str) -> Navigation {
        self.guard.check(location).await
    }
}

/// Open the store selected in the settings
pub fn open_store(settings: &Settings) -> Result<Arc<dyn KeyValueStore>> {
    info!("Using {:?} storage", settings.storage);

    let store: Arc<dyn KeyValueStore> = match settings.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::with_quota(settings.quota_bytes)),
        StorageBackend::File => Arc::new(FileStore::with_quota(
            &settings.storage_path,
            settings.quota_bytes,
        )),
        StorageBackend::Redis => {
            let store = RedisStore::connect(&redis_config(settings)?)?;
            if !store.health_check()? {
                bail!("Redis did not answer PING");
            }
            Arc::new(store)
        }
    };

    Ok(store)
}

/// Redis connection settings; unset values come from `REDIS_*` variables
pub fn redis_config(settings: &Settings) -> Result<RedisConfig> {
    let mut config = RedisConfig::from_env()?;
    if let Some(url) = &settings.redis_url {
        config.url = url.clone();
    }
    if let Some(namespace) = &settings.redis_namespace {
        config.namespace = namespace.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;

    #[test]
    #[serial]
    fn test_redis_config_prefers_settings() -> Result<()> {
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("REDIS_URL", "redis://from-env:6379");
            std::env::remove_var("REDIS_NAMESPACE");
        }

        let mut settings = Settings::load_from(Path::new("does-not-exist.toml"))?;
        let from_env = redis_config(&settings);

        settings.redis_url = Some("redis://cache:6380".to_string());
        settings.redis_namespace = Some("demo".to_string());
        let overridden = redis_config(&settings);

        // SAFETY: as above
        unsafe { std::env::remove_var("REDIS_URL") };

        let from_env = from_env?;
        assert_eq!(from_env.url, "redis://from-env:6379");
        assert_eq!(from_env.namespace, "ticketapp");

        let overridden = overridden?;
        assert_eq!(overridden.url, "redis://cache:6380");
        assert_eq!(overridden.namespace, "demo");
        Ok(())
    }
}
