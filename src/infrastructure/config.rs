//! Application configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::services::DismissedPolicy;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Record store settings
    pub store: StoreConfig,
    /// Relationship analysis settings
    pub analysis: AnalysisConfig,
    /// HTTP server port
    pub server_port: u16,
}

/// Record store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    pub backend: String,
    /// Path to the SQLite database file
    pub sqlite_path: String,
}

/// Relationship analysis configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Quiet period after a world or relationship-count change before re-analysis
    pub debounce: Duration,
    /// Whether dismissed recommendations may come back on the next run
    pub dismissed_policy: DismissedPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            dismissed_policy: DismissedPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store: StoreConfig {
                backend: env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
                sqlite_path: env::var("SQLITE_PATH")
                    .unwrap_or_else(|_| "./data/loreweaver.db".to_string()),
            },
            analysis: AnalysisConfig {
                debounce: Duration::from_millis(
                    env::var("ANALYSIS_DEBOUNCE_MS")
                        .unwrap_or_else(|_| "1000".to_string())
                        .parse()
                        .context("ANALYSIS_DEBOUNCE_MS must be a number of milliseconds")?,
                ),
                dismissed_policy: env::var("DISMISSED_POLICY")
                    .unwrap_or_else(|_| "resurface".to_string())
                    .parse()
                    .context("DISMISSED_POLICY must be 'resurface' or 'suppress'")?,
            },
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}
