use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use vidrelay_core::ClientConfig;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin relay links are built against instead of the request headers
    pub public_base_url: Option<String>,
    pub upstream_connect_timeout_secs: u64,
    pub upstream_timeout_secs: Option<u64>,
    pub enforce_host_allowlist: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: None,
            upstream_connect_timeout_secs: 10,
            upstream_timeout_secs: None,
            enforce_host_allowlist: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("PORT must be a valid number")?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            upstream_connect_timeout_secs: env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.upstream_connect_timeout_secs.to_string())
                .parse()
                .context("UPSTREAM_CONNECT_TIMEOUT_SECS must be a valid number")?,
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .map(|v| v.trim().parse::<u64>())
                .transpose()
                .context("UPSTREAM_TIMEOUT_SECS must be a valid number")?,
            enforce_host_allowlist: parse_flag(env::var("ENFORCE_HOST_ALLOWLIST").ok().as_deref())
                .context("ENFORCE_HOST_ALLOWLIST must be true or false")?,
        })
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the outbound HTTP client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout_secs: self.upstream_connect_timeout_secs,
            timeout_secs: self.upstream_timeout_secs,
            ..ClientConfig::default()
        }
    }
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            other => anyhow::bail!("unrecognized flag value: {}", other),
        },
    }
}
