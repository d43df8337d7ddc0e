use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::lfa::paginate::PageLimits;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Load the demo fixtures into the in-memory stores at startup.
    pub seed_fixtures: bool,
    /// Latency the simulated delivery provider and renderer wait before answering.
    pub simulated_latency_ms: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            seed_fixtures: true,
            simulated_latency_ms: 250,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            seed_fixtures: parse_env("SEED_FIXTURES", defaults.seed_fixtures)?,
            simulated_latency_ms: parse_env("SIMULATED_LATENCY_MS", defaults.simulated_latency_ms)?,
            default_page_size: parse_env("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_env("MAX_PAGE_SIZE", defaults.max_page_size)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            bail!("DEFAULT_PAGE_SIZE and MAX_PAGE_SIZE must be greater than zero");
        }
        if self.default_page_size > self.max_page_size {
            bail!(
                "DEFAULT_PAGE_SIZE ({}) cannot exceed MAX_PAGE_SIZE ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        }
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
