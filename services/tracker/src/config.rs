//! Tracker configuration sourced from environment variables, with an optional
//! YAML override file named by `TRACKER_CONFIG`.
//!
//! Key material is kept as raw text here; it is normalized and parsed on first
//! use by the SSO endpoints, so a bad key never blocks startup.
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Clone)]
pub struct TrackerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub jwt_secret: String,
    pub sso_public_key: Option<String>,
    pub sso_private_key: Option<String>,
    pub dev_endpoints: bool,
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field("storage", &self.storage)
            .field("sso_public_key", &self.sso_public_key.is_some())
            .field("sso_private_key", &self.sso_private_key.is_some())
            .field("dev_endpoints", &self.dev_endpoints)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TrackerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    dev_endpoints: Option<bool>,
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = match std::env::var("TRACKER_BIND") {
            Ok(value) => value.parse().with_context(|| "parse TRACKER_BIND")?,
            Err(_) => {
                let port = match std::env::var("PORT") {
                    Ok(value) => value.parse::<u16>().with_context(|| "parse PORT")?,
                    Err(_) => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };
        let metrics_bind = std::env::var("TRACKER_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse TRACKER_METRICS_BIND")?;

        let database_url = non_empty_var("DATABASE_URL");
        let max_connections = match std::env::var("TRACKER_DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .with_context(|| "parse TRACKER_DB_MAX_CONNECTIONS")?,
            Err(_) => 10,
        };
        let postgres = database_url.map(|url| PostgresConfig {
            url,
            max_connections,
            acquire_timeout_ms: 5_000,
        });
        let storage = match std::env::var("TRACKER_STORAGE") {
            Ok(value) => parse_storage(&value)?,
            Err(_) if postgres.is_some() => StorageBackend::Postgres,
            Err(_) => StorageBackend::Memory,
        };

        let dev_endpoints = match std::env::var("TRACKER_DEV_ENDPOINTS") {
            Ok(value) => parse_bool(&value).with_context(|| "parse TRACKER_DEV_ENDPOINTS")?,
            Err(_) => true,
        };

        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            jwt_secret: non_empty_var("JWT_SECRET")
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            sso_public_key: non_empty_var(growth_sso::PUBLIC_KEY_VAR),
            sso_private_key: non_empty_var(growth_sso::PRIVATE_KEY_VAR),
            dev_endpoints,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("TRACKER_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read TRACKER_CONFIG: {path}"))?;
            let override_cfg: TrackerConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse tracker config yaml")?;
            config.apply(override_cfg)?;
        }
        Ok(config)
    }

    fn apply(&mut self, override_cfg: TrackerConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(url) = override_cfg.database_url {
            let max_connections = self
                .postgres
                .as_ref()
                .map(|pg| pg.max_connections)
                .unwrap_or(10);
            self.postgres = Some(PostgresConfig {
                url,
                max_connections,
                acquire_timeout_ms: 5_000,
            });
            self.storage = StorageBackend::Postgres;
        }
        if let Some(value) = override_cfg.db_max_connections
            && let Some(pg) = self.postgres.as_mut()
        {
            pg.max_connections = value;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = parse_storage(&value)?;
        }
        if let Some(value) = override_cfg.dev_endpoints {
            self.dev_endpoints = value;
        }
        Ok(())
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_storage(value: &str) -> Result<StorageBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "postgres" => Ok(StorageBackend::Postgres),
        other => bail!("unknown storage backend: {other}"),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other}"),
    }
}
