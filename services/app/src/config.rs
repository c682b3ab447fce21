//! Application settings
//!
//! Settings are layered: built-in defaults, then an optional `ticketapp.toml`,
//! then `TICKETAPP_*` environment variables.

use anyhow::{Result, bail};
use common::store::DEFAULT_QUOTA_BYTES;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ticketapp.toml";

/// Where the mock backend keeps its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost when the process exits
    Memory,
    /// JSON file at `storage_path`
    File,
    /// Redis at `redis_url`
    Redis,
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Simulated round-trip latency in milliseconds
    pub latency_ms: u64,
    /// Probability that listing tickets fails transiently
    pub list_failure_rate: f64,
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
    pub storage: StorageBackend,
    pub storage_path: PathBuf,
    pub quota_bytes: usize,
    /// Seed for the simulated network; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides `REDIS_URL`
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Overrides `REDIS_NAMESPACE`
    #[serde(default)]
    pub redis_namespace: Option<String>,
}

impl Settings {
    /// Load settings from `ticketapp.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load settings using `file` as the optional settings file
    pub fn load_from(file: &Path) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("latency_ms", 350)?
            .set_default("list_failure_rate", 0.02)?
            .set_default("session_ttl_secs", 86_400)?
            .set_default("storage", "file")?
            .set_default("storage_path", ".ticketapp/storage.json")?
            .set_default("quota_bytes", DEFAULT_QUOTA_BYTES as i64)?
            .add_source(File::from(file).required(false))
            .add_source(Environment::with_prefix("TICKETAPP").try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.list_failure_rate) {
            bail!(
                "list_failure_rate must be between 0 and 1, got {}",
                self.list_failure_rate
            );
        }
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "TICKETAPP_LATENCY_MS",
        "TICKETAPP_STORAGE",
        "TICKETAPP_SEED",
        "TICKETAPP_LIST_FAILURE_RATE",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() -> Result<()> {
        clear_env();
        let settings = Settings::load_from(Path::new("does-not-exist.toml"))?;

        assert_eq!(settings.latency(), Duration::from_millis(350));
        assert_eq!(settings.list_failure_rate, 0.02);
        assert_eq!(settings.session_ttl(), Duration::from_secs(86_400));
        assert_eq!(settings.storage, StorageBackend::File);
        assert_eq!(settings.storage_path, PathBuf::from(".ticketapp/storage.json"));
        assert_eq!(settings.quota_bytes, DEFAULT_QUOTA_BYTES);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.redis_url, None);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_environment_overrides() -> Result<()> {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("TICKETAPP_LATENCY_MS", "0");
            std::env::set_var("TICKETAPP_STORAGE", "memory");
            std::env::set_var("TICKETAPP_SEED", "7");
        }

        let settings = Settings::load_from(Path::new("does-not-exist.toml"));
        clear_env();
        let settings = settings?;

        assert_eq!(settings.latency(), Duration::ZERO);
        assert_eq!(settings.storage, StorageBackend::Memory);
        assert_eq!(settings.seed, Some(7));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_settings_file_is_read() -> Result<()> {
        clear_env();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ticketapp.toml");
        std::fs::write(&path, "list_failure_rate = 0.5\nsession_ttl_secs = 60\n")?;

        let settings = Settings::load_from(&path)?;
        assert_eq!(settings.list_failure_rate, 0.5);
        assert_eq!(settings.session_ttl(), Duration::from_secs(60));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_rejects_out_of_range_failure_rate() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe { std::env::set_var("TICKETAPP_LIST_FAILURE_RATE", "1.5") };

        let result = Settings::load_from(Path::new("does-not-exist.toml"));
        clear_env();
        assert!(result.is_err());
    }
}
