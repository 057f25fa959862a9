use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub cart: CartConfig,
    pub proposals: ProposalConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Quantities the admin preview resolves at
    #[serde(default = "default_preview_quantities")]
    pub preview_quantities: Vec<i64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            preview_quantities: default_preview_quantities(),
        }
    }
}

fn default_currency() -> String {
    giftly_catalog::product::DEFAULT_CURRENCY.to_string()
}

fn default_preview_quantities() -> Vec<i64> {
    giftly_catalog::preview::DEFAULT_SAMPLE_QUANTITIES.to_vec()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CartConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProposalConfig {
    pub validity_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_window: i64,
    pub window_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `GIFTLY__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("GIFTLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Build from a TOML document, without touching the filesystem or environment
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
