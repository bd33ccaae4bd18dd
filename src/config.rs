//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then environment variables, then
//! whatever the CLI overrides on the returned value.
//!
//! | variable | default |
//! |---|---|
//! | `STOREFRONT_API_BASE` | `http://localhost:3000/api/v1/` |
//! | `STOREFRONT_CACHE_DIR` | `~/.storefront` |
//! | `STOREFRONT_DEBOUNCE_MS` | `500` |
//! | `STOREFRONT_TIMEOUT_SECS` | `30` |
//! | `STOREFRONT_MAX_RETRIES` | `3` |

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::api::{HttpRepositoryConfig, RetryPolicy, DEFAULT_TIMEOUT_SECS};
use crate::sync::{ControllerConfig, DEFAULT_DEBOUNCE};

pub const API_BASE_ENV: &str = "STOREFRONT_API_BASE";
pub const CACHE_DIR_ENV: &str = "STOREFRONT_CACHE_DIR";
pub const DEBOUNCE_MS_ENV: &str = "STOREFRONT_DEBOUNCE_MS";
pub const TIMEOUT_SECS_ENV: &str = "STOREFRONT_TIMEOUT_SECS";
pub const MAX_RETRIES_ENV: &str = "STOREFRONT_MAX_RETRIES";

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/v1/";

/// Owner id used when none is given, matching the storefront's single user.
pub const DEFAULT_OWNER_ID: &str = "1";

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub api_base: Url,
    /// Root for on-disk state; carts live in `<cache_dir>/carts`.
    pub cache_dir: PathBuf,
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub max_retries: usize,
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = match get(API_BASE_ENV) {
            Some(raw) => parse_base_url(&raw).with_context(|| format!("Invalid {}", API_BASE_ENV))?,
            None => parse_base_url(DEFAULT_API_BASE)?,
        };

        let cache_dir = match get(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_cache_dir()?,
        };

        let debounce = match get(DEBOUNCE_MS_ENV) {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{} must be a number of milliseconds", DEBOUNCE_MS_ENV))?,
            ),
            None => DEFAULT_DEBOUNCE,
        };

        let request_timeout = match get(TIMEOUT_SECS_ENV) {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{} must be a number of seconds", TIMEOUT_SECS_ENV))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let max_retries = match get(MAX_RETRIES_ENV) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a non-negative integer", MAX_RETRIES_ENV))?,
            None => RetryPolicy::default().max_retries,
        };

        Ok(Self {
            api_base,
            cache_dir,
            debounce,
            request_timeout,
            max_retries,
        })
    }

    pub fn carts_dir(&self) -> PathBuf {
        self.cache_dir.join("carts")
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            debounce: self.debounce,
        }
    }

    pub fn http_repository_config(&self) -> HttpRepositoryConfig {
        let mut config = HttpRepositoryConfig::new(self.api_base.clone());
        config.timeout = self.request_timeout;
        config.retry.max_retries = self.max_retries;
        config
    }
}

/// Parse an API root and make sure it ends in `/` so relative joins keep
/// the last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("Invalid base URL: {}", raw))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("Base URL cannot carry a path: {}", raw);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_cache_dir() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".storefront"))
}
