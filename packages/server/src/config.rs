use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Probability a demo submission succeeds, clamped to [0, 1] downstream.
    pub submit_success_rate: f64,
    /// Candidates fabricated per demo discovery call when the request does
    /// not override the count.
    pub demo_discovery_count: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            submit_success_rate: env::var("SUBMIT_SUCCESS_RATE")
                .unwrap_or_else(|_| "0.8".to_string())
                .parse()
                .context("SUBMIT_SUCCESS_RATE must be a valid number")?,
            demo_discovery_count: env::var("DEMO_DISCOVERY_COUNT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DEMO_DISCOVERY_COUNT must be a valid number")?,
        })
    }
}
