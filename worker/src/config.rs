use std::env;
use std::num::NonZeroU8;
use std::time::Duration;

use crate::Error;

/// Upstream JSON-RPC ledger node connection settings.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub host: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub timeout: Duration,
}

/// Document-store (history) connection settings.
#[derive(Clone, Debug)]
pub struct HistoryConfig {
    pub host: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub database: String,
}

/// Snapshot cache and state gate connection settings.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub host: String,
    pub pass: Option<String>,
}

/// Message bus connection settings.
#[derive(Clone, Debug)]
pub struct BusConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

/// Process-wide configuration, loaded once at startup from environment
/// variables. A value present but unparseable is a fatal configuration
/// error; an absent value falls back to its documented default.
#[derive(Clone, Debug)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub history: HistoryConfig,
    pub cache: CacheConfig,
    pub bus: BusConfig,
    pub num_threads: NonZeroU8,
    pub max_inflight: usize,
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, Error> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{key} is set but not parseable: {raw:?}"))),
    }
}

impl Config {
    /// Load configuration from the process environment, falling back
    /// to documented defaults for every variable that is unset.
    pub fn from_env() -> Result<Self, Error> {
        let upstream = UpstreamConfig {
            host: env_string("BTCD_JSONRPC_HOST", "127.0.0.1:8334"),
            user: env_opt_string("BTCD_JSONRPC_USER"),
            pass: env_opt_string("BTCD_JSONRPC_PASS"),
            timeout: Duration::from_secs(env_parsed("BTCD_JSONRPC_TIMEOUT_SEC", 30)?),
        };
        let history = HistoryConfig {
            host: env_string("MONGO_HOST", "127.0.0.1:27017"),
            user: env_opt_string("MONGO_USER"),
            pass: env_opt_string("MONGO_PASS"),
            database: env_string("MONGO_DATABASE", "btcd_indexer"),
        };
        let cache = CacheConfig {
            host: env_string("REDIS_HOST", "127.0.0.1:6379"),
            pass: env_opt_string("REDIS_PASS"),
        };
        let bus = BusConfig {
            host: env_string("RABBITMQ_HOST", "127.0.0.1:5672"),
            user: env_string("RABBITMQ_USER", "guest"),
            pass: env_string("RABBITMQ_PASS", "guest"),
        };
        let num_threads = env_parsed("WORKER_NUM_THREADS", 8u8)?;
        let num_threads = NonZeroU8::new(num_threads)
            .ok_or_else(|| Error::Config("WORKER_NUM_THREADS must be greater than zero".into()))?;
        let max_inflight = env_parsed("WORKER_MAX_INFLIGHT", 10_000usize)?;

        Ok(Self {
            upstream,
            history,
            cache,
            bus,
            num_threads,
            max_inflight,
        })
    }

    /// The AMQP connection URI built from [`BusConfig`].
    pub fn amqp_uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}/%2f",
            self.bus.user, self.bus.pass, self.bus.host
        )
    }

    /// The Mongo connection URI built from [`HistoryConfig`].
    pub fn mongo_uri(&self) -> String {
        match (&self.history.user, &self.history.pass) {
            (Some(user), Some(pass)) => format!("mongodb://{user}:{pass}@{}", self.history.host),
            _ => format!("mongodb://{}", self.history.host),
        }
    }

    /// The Redis connection URI built from [`CacheConfig`].
    pub fn redis_uri(&self) -> String {
        match &self.cache.pass {
            Some(pass) => format!("redis://:{pass}@{}", self.cache.host),
            None => format!("redis://{}", self.cache.host),
        }
    }

    /// The upstream node's base URL, derived from [`UpstreamConfig::host`].
    pub fn upstream_url(&self) -> String {
        format!("http://{}", self.upstream.host)
    }
}
