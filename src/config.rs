use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when rendering short links, e.g. "http://localhost:8080".
    /// Never has a trailing slash.
    pub base_url: String,

    /// Where the registry snapshot is read at startup and written at shutdown
    pub snapshot_path: PathBuf,

    /// Upper bound on waiting for in-flight requests once shutdown starts
    pub shutdown_drain: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let shutdown_drain_secs = var("SHUTDOWN_DRAIN_SECS")
            .unwrap_or_else(|| "5".into())
            .parse::<u64>()
            .unwrap_or(5);

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            snapshot_path: var("SNAPSHOT_PATH")
                .unwrap_or_else(|| "urls.bin".into())
                .into(),
            shutdown_drain: Duration::from_secs(shutdown_drain_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full public URL for a short key.
    pub fn short_url(&self, key: &str) -> String {
        format!("{}/short/{}", self.base_url, key)
    }
}
