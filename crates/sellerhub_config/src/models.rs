// --- File: crates/sellerhub_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite://data/sellerhub.db", or "secret_from_env" -> DATABASE_URL
}

/// What the sync engine does when an order it fetched is already stored.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderWritePolicy {
    /// Keep the stored snapshot untouched.
    #[default]
    Skip,
    /// Overwrite the stored row with the freshly fetched detail.
    Update,
}

// --- Shopee Partner API Config ---
// Partner secret keys are not configuration; they live in the partner table.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShopeeConfig {
    /// Scheme and host of the partner API, without the version prefix.
    pub api_base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Callback target handed to the consent page; the partner id is appended as a path segment.
    pub redirect_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,
    #[serde(default)]
    pub order_write_policy: OrderWritePolicy,
    /// IANA zone used to compute the default "today" order window.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_api_prefix() -> String {
    "/api/v2".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_token_lifetime_secs() -> i64 {
    4 * 60 * 60
}

fn default_refresh_margin_secs() -> i64 {
    120
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_page_size() -> u32 {
    20
}

impl ShopeeConfig {
    /// Builds a config pointing at `api_base_url` with every tunable at its default.
    pub fn with_base_url(api_base_url: impl Into<String>, redirect_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_prefix: default_api_prefix(),
            redirect_base_url: redirect_base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            token_lifetime_secs: default_token_lifetime_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            order_write_policy: OrderWritePolicy::default(),
            time_zone: default_time_zone(),
            default_page_size: default_page_size(),
        }
    }
}

// --- Main Application Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_shopee: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub shopee: Option<ShopeeConfig>,
}
