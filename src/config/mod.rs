use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{RecError, RecResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub recommendation: RecommendationConfig,
    pub training: TrainingConfig,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> RecResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RecError::Config(format!("invalid server address: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Size of the similar-user neighborhood.
    pub neighbors: usize,
    /// Used when a request carries no `n`.
    pub default_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Only interactions newer than this many days are read. `None` reads the whole log.
    pub window_days: Option<i64>,
    pub retrain_interval_secs: Option<u64>,
    pub retry_attempts: usize,
    pub retry_initial_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub num_users: usize,
    pub num_products: usize,
    pub num_interactions: usize,
    pub history_days: i64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                workers: num_cpus::get(),
            },
            postgres: PostgresConfig {
                url: "postgresql://localhost:5432/ecommerce_db".to_string(),
                max_connections: 10,
            },
            recommendation: RecommendationConfig {
                neighbors: 5,
                default_count: 5,
            },
            training: TrainingConfig {
                window_days: None,
                retrain_interval_secs: None,
                retry_attempts: 3,
                retry_initial_delay_ms: 500,
            },
            simulator: SimulatorConfig {
                num_users: 100,
                num_products: 50,
                num_interactions: 1000,
                history_days: 90,
                seed: None,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> RecResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SHOPREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &str) -> RecResult<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}
