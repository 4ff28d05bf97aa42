//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CATALOG_URL` - HTTP URL of the catalog document. When unset,
//!   the catalog is read from `STOREFRONT_CATALOG_PATH`
//! - `STOREFRONT_CATALOG_PATH` - Local catalog file
//!   (default: crates/storefront/static/products.json)
//! - `STOREFRONT_CATALOG_CACHE_TTL_SECS` - Cache the catalog for this many
//!   seconds (default: 0, no caching)
//! - `STOREFRONT_DATA_DIR` - Directory for the cart snapshot (default: .data)
//! - `STOREFRONT_STATIC_DIR` - Directory served under `/static`
//!   (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_CATALOG_PATH: &str = "crates/storefront/static/products.json";
const DEFAULT_STATIC_DIR: &str = "crates/storefront/static";
const DEFAULT_DATA_DIR: &str = ".data";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the product catalog is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// Fetched with an HTTP GET.
    Url(String),
    /// Read from a local JSON file.
    File(PathBuf),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog document location
    pub catalog: CatalogLocation,
    /// How long a fetched catalog is reused; `None` disables caching
    pub catalog_cache_ttl: Option<Duration>,
    /// Directory holding the persisted cart snapshot
    pub data_dir: PathBuf,
    /// Directory of static assets (images, the catalog document)
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            catalog: CatalogLocation::File(PathBuf::from(DEFAULT_CATALOG_PATH)),
            catalog_cache_ttl: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            sentry_dsn: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("STOREFRONT_HOST", &get_or("STOREFRONT_HOST", "127.0.0.1"))?;
        let port = parse_var("STOREFRONT_PORT", &get_or("STOREFRONT_PORT", "3000"))?;

        let catalog = match lookup("STOREFRONT_CATALOG_URL").filter(|url| !url.is_empty()) {
            Some(url) => CatalogLocation::Url(validate_url("STOREFRONT_CATALOG_URL", url)?),
            None => CatalogLocation::File(PathBuf::from(get_or(
                "STOREFRONT_CATALOG_PATH",
                DEFAULT_CATALOG_PATH,
            ))),
        };

        let ttl_secs: u64 = parse_var(
            "STOREFRONT_CATALOG_CACHE_TTL_SECS",
            &get_or("STOREFRONT_CATALOG_CACHE_TTL_SECS", "0"),
        )?;
        let catalog_cache_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        Ok(Self {
            host,
            port,
            catalog,
            catalog_cache_ttl,
            data_dir: PathBuf::from(get_or("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR)),
            static_dir: PathBuf::from(get_or("STOREFRONT_STATIC_DIR", DEFAULT_STATIC_DIR)),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable in the error.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Require an http(s) scheme on catalog URLs.
fn validate_url(key: &str, url: String) -> Result<String, ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must start with http:// or https://".to_string(),
        ))
    }
}
