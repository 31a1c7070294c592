use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub database_url: String,
    pub log_dir: PathBuf,
    /// Pause after each recorded finding.
    pub scan_step_delay: Duration,
    /// How often the results feed re-reads findings.
    pub feed_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env_or("HOST", "127.0.0.1");
        let port = env_or("PORT", "8000");
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let server_addr = SocketAddr::new(ip, port);

        Ok(Config {
            server_addr,
            database_url: env_or("DATABASE_URL", "sqlite://scan_results.db"),
            log_dir: PathBuf::from(env_or("LOG_DIR", ".")),
            scan_step_delay: millis("SCAN_STEP_DELAY_MS", 1000)?,
            feed_interval: millis("FEED_INTERVAL_MS", 1000)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: "sqlite://scan_results.db".to_string(),
            log_dir: PathBuf::from("."),
            scan_step_delay: Duration::from_secs(1),
            feed_interval: Duration::from_secs(1),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn millis(var: &str, default: u64) -> Result<Duration> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", var, e))),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}
