use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serialized similarity table and item catalog
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Raw (user, item, behaviour, hours) event log
    #[serde(default = "default_raw_log_path")]
    pub raw_log_path: PathBuf,

    /// Number of recommendations returned when the request does not ask for a count
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("data/recommender.bin")
}

fn default_raw_log_path() -> PathBuf {
    PathBuf::from("data/steam-200k.csv")
}

fn default_recommendations() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
